use std::collections::BTreeSet;

use crate::color::CategoryColors;
use crate::data::filter::{FilterCriteria, filter};
use crate::data::growth::{QOQ_MONTHS, YOY_MONTHS, compute_growth, group_by_date_category};
use crate::data::model::{GrowthRecord, MonthlyTotal, RegistrationRecord, RegistrationTable};
use crate::data::summary::{average_growth, top_manufacturer, total_registrations};

// ---------------------------------------------------------------------------
// Derived dashboard view
// ---------------------------------------------------------------------------

/// Everything the central panel renders, recomputed from scratch on every
/// criteria change.  No incremental state is kept between interactions.
#[derive(Debug, Clone, Default)]
pub struct DashboardView {
    /// Rows passing the current criteria, date-sorted.
    pub filtered: Vec<RegistrationRecord>,
    /// Per-(date, category) totals feeding the trend chart.
    pub trend: Vec<MonthlyTotal>,
    /// Year-over-year growth table.
    pub yoy: Vec<GrowthRecord>,
    /// Quarter-over-quarter growth table.
    pub qoq: Vec<GrowthRecord>,
    /// KPI: total registrations in the selection.
    pub total: u64,
    /// KPI: mean YoY growth %, `None` when no entry is defined.
    pub avg_yoy: Option<f64>,
    /// KPI: mean QoQ growth %, `None` when no entry is defined.
    pub avg_qoq: Option<f64>,
    /// Insight: manufacturer with the most registrations, with its total.
    pub top_manufacturer: Option<(String, u64)>,
}

impl DashboardView {
    /// Run the full filter → group → growth → summary pipeline.
    pub fn compute(table: &RegistrationTable, criteria: &FilterCriteria) -> Self {
        let filtered = filter(table, criteria);
        let trend = group_by_date_category(&filtered);
        let yoy = compute_growth(&trend, YOY_MONTHS);
        let qoq = compute_growth(&trend, QOQ_MONTHS);

        DashboardView {
            total: total_registrations(&filtered),
            avg_yoy: average_growth(&yoy),
            avg_qoq: average_growth(&qoq),
            top_manufacturer: top_manufacturer(&filtered),
            filtered,
            trend,
            yoy,
            qoq,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    /// Loaded table (None until the user opens a file).  Immutable once set.
    pub table: Option<RegistrationTable>,

    /// Current fully-resolved filter selection.
    pub criteria: Option<FilterCriteria>,

    /// Cached pipeline output for the current criteria.
    pub view: DashboardView,

    /// Category → colour mapping shared by checkboxes and charts.
    pub colors: CategoryColors,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,

    /// Whether a file loading operation is in progress.
    pub loading: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            table: None,
            criteria: None,
            view: DashboardView::default(),
            colors: CategoryColors::default(),
            status_message: None,
            loading: false,
        }
    }
}

impl AppState {
    /// Ingest a newly loaded table: select everything, build colours,
    /// compute the initial view.
    pub fn set_table(&mut self, table: RegistrationTable) {
        let criteria = FilterCriteria::select_all(&table);
        self.view = DashboardView::compute(&table, &criteria);
        self.colors = CategoryColors::new(&table.categories);
        self.criteria = Some(criteria);
        self.table = Some(table);
        self.status_message = None;
        self.loading = false;
    }

    /// Recompute the cached view after a criteria change.
    pub fn recompute(&mut self) {
        if let (Some(table), Some(criteria)) = (&self.table, &self.criteria) {
            self.view = DashboardView::compute(table, criteria);
        }
    }

    /// Toggle a single category in the selection.
    pub fn toggle_category(&mut self, category: &str) {
        if let Some(criteria) = &mut self.criteria {
            toggle(&mut criteria.categories, category);
        }
        self.recompute();
    }

    /// Toggle a single manufacturer in the selection.
    pub fn toggle_manufacturer(&mut self, manufacturer: &str) {
        if let Some(criteria) = &mut self.criteria {
            toggle(&mut criteria.manufacturers, manufacturer);
        }
        self.recompute();
    }

    /// Select every observed category.
    pub fn select_all_categories(&mut self) {
        if let (Some(table), Some(criteria)) = (&self.table, &mut self.criteria) {
            criteria.categories = table.categories.clone();
        }
        self.recompute();
    }

    /// Deselect every category (the view becomes empty by policy).
    pub fn select_no_categories(&mut self) {
        if let Some(criteria) = &mut self.criteria {
            criteria.categories.clear();
        }
        self.recompute();
    }

    /// Select every observed manufacturer.
    pub fn select_all_manufacturers(&mut self) {
        if let (Some(table), Some(criteria)) = (&self.table, &mut self.criteria) {
            criteria.manufacturers = table.manufacturers.clone();
        }
        self.recompute();
    }

    /// Deselect every manufacturer.
    pub fn select_no_manufacturers(&mut self) {
        if let Some(criteria) = &mut self.criteria {
            criteria.manufacturers.clear();
        }
        self.recompute();
    }
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Months, NaiveDate};

    fn sample_table() -> RegistrationTable {
        let start = NaiveDate::from_ymd_opt(2022, 1, 1).unwrap();
        let mut rows = Vec::new();
        for cat in ["2W", "4W"] {
            for man in ["Hero", "Tata"] {
                for m in 0..15u32 {
                    rows.push(RegistrationRecord {
                        date: start.checked_add_months(Months::new(m)).unwrap(),
                        category: cat.to_string(),
                        manufacturer: man.to_string(),
                        registrations: 50 + m as u64,
                    });
                }
            }
        }
        RegistrationTable::from_records(rows)
    }

    #[test]
    fn set_table_selects_everything() {
        let mut state = AppState::default();
        state.set_table(sample_table());

        let criteria = state.criteria.as_ref().unwrap();
        assert_eq!(criteria.categories.len(), 2);
        assert_eq!(criteria.manufacturers.len(), 2);
        assert_eq!(state.view.filtered.len(), 2 * 2 * 15);
        assert!(state.view.avg_yoy.is_some());
    }

    #[test]
    fn toggling_a_category_recomputes_the_view() {
        let mut state = AppState::default();
        state.set_table(sample_table());

        state.toggle_category("4W");
        assert_eq!(state.view.filtered.len(), 2 * 15);
        assert!(state.view.filtered.iter().all(|r| r.category == "2W"));

        state.toggle_category("4W");
        assert_eq!(state.view.filtered.len(), 2 * 2 * 15);
    }

    #[test]
    fn deselecting_all_manufacturers_empties_the_view() {
        let mut state = AppState::default();
        state.set_table(sample_table());

        state.select_no_manufacturers();
        assert!(state.view.filtered.is_empty());
        assert_eq!(state.view.total, 0);
        assert_eq!(state.view.avg_yoy, None);
        assert_eq!(state.view.top_manufacturer, None);
    }
}
