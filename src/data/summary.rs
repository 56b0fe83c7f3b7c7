use std::collections::BTreeMap;

use super::model::{GrowthRecord, RegistrationRecord};

// ---------------------------------------------------------------------------
// KPI metrics over the filtered table
// ---------------------------------------------------------------------------

/// Total registrations over the given rows.
pub fn total_registrations(rows: &[RegistrationRecord]) -> u64 {
    rows.iter().map(|r| r.registrations).sum()
}

/// Mean of the defined `growth_pct` entries, `None` when every entry is
/// undefined (rendered as "N/A", never 0 or NaN).
pub fn average_growth(rows: &[GrowthRecord]) -> Option<f64> {
    let defined: Vec<f64> = rows.iter().filter_map(|r| r.growth_pct).collect();
    if defined.is_empty() {
        return None;
    }
    Some(defined.iter().sum::<f64>() / defined.len() as f64)
}

/// The manufacturer with the largest summed registrations over the whole
/// filtered table, regardless of category, with its total.
///
/// Ties break to the lexicographically smallest name so the insight line is
/// deterministic.  `None` on an empty table.
pub fn top_manufacturer(rows: &[RegistrationRecord]) -> Option<(String, u64)> {
    let mut totals: BTreeMap<&str, u64> = BTreeMap::new();
    for r in rows {
        *totals.entry(r.manufacturer.as_str()).or_default() += r.registrations;
    }
    // BTreeMap iterates in lexical order; strict > keeps the first maximum.
    let mut best: Option<(&str, u64)> = None;
    for (name, total) in totals {
        match best {
            Some((_, t)) if total <= t => {}
            _ => best = Some((name, total)),
        }
    }
    best.map(|(name, total)| (name.to_string(), total))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn d(m: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, m, 1).unwrap()
    }

    fn rec(m: u32, man: &str, n: u64) -> RegistrationRecord {
        RegistrationRecord {
            date: d(m),
            category: "2W".to_string(),
            manufacturer: man.to_string(),
            registrations: n,
        }
    }

    fn growth(pct: Option<f64>) -> GrowthRecord {
        GrowthRecord {
            date: d(1),
            category: "2W".to_string(),
            registrations: 1,
            prev_registrations: pct.map(|_| 1),
            growth_pct: pct,
        }
    }

    #[test]
    fn total_sums_all_rows() {
        let rows = vec![rec(1, "Hero", 10), rec(2, "Tata", 5), rec(3, "Hero", 1)];
        assert_eq!(total_registrations(&rows), 16);
        assert_eq!(total_registrations(&[]), 0);
    }

    #[test]
    fn average_skips_undefined_entries() {
        let rows = vec![growth(None), growth(Some(10.0)), growth(Some(20.0))];
        assert_eq!(average_growth(&rows), Some(15.0));
    }

    #[test]
    fn average_of_all_undefined_is_none() {
        assert_eq!(average_growth(&[growth(None), growth(None)]), None);
        assert_eq!(average_growth(&[]), None);
    }

    #[test]
    fn top_manufacturer_sums_across_rows() {
        let rows = vec![rec(1, "Hero", 10), rec(2, "Tata", 8), rec(3, "Tata", 5)];
        assert_eq!(top_manufacturer(&rows), Some(("Tata".to_string(), 13)));
    }

    #[test]
    fn top_manufacturer_tie_breaks_lexically() {
        let rows = vec![rec(1, "Tata", 10), rec(2, "Hero", 10)];
        assert_eq!(top_manufacturer(&rows), Some(("Hero".to_string(), 10)));
    }

    #[test]
    fn top_manufacturer_of_empty_table_is_none() {
        assert_eq!(top_manufacturer(&[]), None);
    }
}
