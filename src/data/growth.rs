use std::collections::BTreeMap;

use chrono::{Months, NaiveDate};

use super::model::{GrowthRecord, MonthlyTotal, RegistrationRecord};

/// Lag for year-over-year growth, in calendar months.
pub const YOY_MONTHS: u32 = 12;
/// Lag for quarter-over-quarter growth, in calendar months.
pub const QOQ_MONTHS: u32 = 3;

// ---------------------------------------------------------------------------
// Grouping step
// ---------------------------------------------------------------------------

/// Sum registrations over manufacturers, one output row per distinct
/// `(date, category)` pair, sorted by date ascending (ties by category).
///
/// This is the required precondition for [`compute_growth`].
pub fn group_by_date_category(rows: &[RegistrationRecord]) -> Vec<MonthlyTotal> {
    let mut totals: BTreeMap<(NaiveDate, &str), u64> = BTreeMap::new();
    for r in rows {
        *totals.entry((r.date, r.category.as_str())).or_default() += r.registrations;
    }
    totals
        .into_iter()
        .map(|((date, category), registrations)| MonthlyTotal {
            date,
            category: category.to_string(),
            registrations,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Growth calculator
// ---------------------------------------------------------------------------

/// Annotate each `(date, category)` total with the same category's total
/// exactly `lag_months` calendar months earlier and the percentage change.
///
/// The lag is calendar-based rather than a row-count shift: a gap in a
/// category's series yields `prev_registrations = None` for the months whose
/// comparison point is missing, instead of silently comparing against an
/// unrelated neighbour.  `growth_pct` is `None` whenever the previous value
/// is absent or zero.  No cross-category lag, no wraparound; the input is
/// not mutated.
pub fn compute_growth(rows: &[MonthlyTotal], lag_months: u32) -> Vec<GrowthRecord> {
    // (category, date) → registrations, for the lagged lookups.
    let by_key: BTreeMap<(&str, NaiveDate), u64> = rows
        .iter()
        .map(|r| ((r.category.as_str(), r.date), r.registrations))
        .collect();

    rows.iter()
        .map(|r| {
            let prev_registrations = r
                .date
                .checked_sub_months(Months::new(lag_months))
                .and_then(|prev_date| by_key.get(&(r.category.as_str(), prev_date)))
                .copied();

            let growth_pct = match prev_registrations {
                Some(prev) if prev > 0 => {
                    Some((r.registrations as f64 - prev as f64) / prev as f64 * 100.0)
                }
                _ => None,
            };

            GrowthRecord {
                date: r.date,
                category: r.category.clone(),
                registrations: r.registrations,
                prev_registrations,
                growth_pct,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(y: i32, m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, 1).unwrap()
    }

    fn rec(date: NaiveDate, cat: &str, man: &str, n: u64) -> RegistrationRecord {
        RegistrationRecord {
            date,
            category: cat.to_string(),
            manufacturer: man.to_string(),
            registrations: n,
        }
    }

    fn total(date: NaiveDate, cat: &str, n: u64) -> MonthlyTotal {
        MonthlyTotal {
            date,
            category: cat.to_string(),
            registrations: n,
        }
    }

    /// 24 consecutive months for one category, registrations = 100 + i
    /// (i = 1-based month index).
    fn linear_series() -> Vec<MonthlyTotal> {
        (0..24)
            .map(|i| {
                let date = d(2022, 1).checked_add_months(Months::new(i)).unwrap();
                total(date, "2W", 100 + i as u64 + 1)
            })
            .collect()
    }

    #[test]
    fn grouping_sums_over_manufacturers() {
        let rows = vec![
            rec(d(2023, 1), "CarX", "Honda", 10),
            rec(d(2023, 1), "CarX", "Toyota", 5),
        ];
        let grouped = group_by_date_category(&rows);
        assert_eq!(grouped, vec![total(d(2023, 1), "CarX", 15)]);
    }

    #[test]
    fn grouping_output_is_date_sorted() {
        let rows = vec![
            rec(d(2023, 3), "2W", "Hero", 1),
            rec(d(2023, 1), "4W", "Tata", 2),
            rec(d(2023, 1), "2W", "Hero", 3),
            rec(d(2023, 2), "2W", "Bajaj", 4),
        ];
        let grouped = group_by_date_category(&rows);
        assert!(grouped.windows(2).all(|w| w[0].date <= w[1].date));
        // same date: categories in lexical order
        assert_eq!(grouped[0].category, "2W");
        assert_eq!(grouped[1].category, "4W");
    }

    #[test]
    fn yoy_lag_picks_the_same_month_last_year() {
        let growth = compute_growth(&linear_series(), YOY_MONTHS);
        // month 13 compares against month 1
        let at_13 = &growth[12];
        assert_eq!(at_13.registrations, 113);
        assert_eq!(at_13.prev_registrations, Some(101));
        let pct = at_13.growth_pct.unwrap();
        assert!((pct - (113.0 - 101.0) / 101.0 * 100.0).abs() < 1e-9);
        assert!((pct - 11.88).abs() < 0.01);
    }

    #[test]
    fn growth_is_undefined_before_the_first_comparison_point() {
        let growth = compute_growth(&linear_series(), YOY_MONTHS);
        for row in &growth[..12] {
            assert_eq!(row.prev_registrations, None);
            assert_eq!(row.growth_pct, None);
        }
        assert!(growth[12..].iter().all(|r| r.growth_pct.is_some()));
    }

    #[test]
    fn qoq_lag_is_three_months() {
        let growth = compute_growth(&linear_series(), QOQ_MONTHS);
        let at_4 = &growth[3];
        assert_eq!(at_4.prev_registrations, Some(101));
        assert_eq!(at_4.registrations, 104);
    }

    #[test]
    fn zero_previous_value_gives_no_growth_pct() {
        let series = vec![
            total(d(2023, 1), "EV", 0),
            total(d(2023, 4), "EV", 50),
        ];
        let growth = compute_growth(&series, QOQ_MONTHS);
        assert_eq!(growth[1].prev_registrations, Some(0));
        assert_eq!(growth[1].growth_pct, None);
    }

    #[test]
    fn gap_in_the_series_gives_no_comparison() {
        // February is missing: May has no three-months-earlier point.
        let series = vec![
            total(d(2023, 1), "2W", 10),
            total(d(2023, 3), "2W", 12),
            total(d(2023, 5), "2W", 14),
            total(d(2023, 6), "2W", 16),
        ];
        let growth = compute_growth(&series, QOQ_MONTHS);
        let may = growth.iter().find(|r| r.date == d(2023, 5)).unwrap();
        assert_eq!(may.prev_registrations, None);
        let june = growth.iter().find(|r| r.date == d(2023, 6)).unwrap();
        assert_eq!(june.prev_registrations, Some(12));
    }

    #[test]
    fn no_cross_category_lag() {
        let series = vec![
            total(d(2023, 1), "2W", 100),
            total(d(2023, 4), "4W", 70),
        ];
        let growth = compute_growth(&series, QOQ_MONTHS);
        let fourw = growth.iter().find(|r| r.category == "4W").unwrap();
        assert_eq!(fourw.prev_registrations, None);
    }
}
