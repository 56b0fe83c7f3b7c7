use std::collections::BTreeSet;

use chrono::NaiveDate;

use super::model::{RegistrationRecord, RegistrationTable};

// ---------------------------------------------------------------------------
// Filter criteria: the fully-resolved user selection
// ---------------------------------------------------------------------------

/// The user's current selection, rebuilt on every interaction.
///
/// Both value sets are explicit: an empty set means "nothing selected" and
/// yields an empty result, never "show all".  An inverted date range is not
/// rejected; every row fails the range predicate and the result is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    pub categories: BTreeSet<String>,
    pub manufacturers: BTreeSet<String>,
}

impl FilterCriteria {
    /// Initial selection: the table's full date range and every observed
    /// category and manufacturer.
    pub fn select_all(table: &RegistrationTable) -> Self {
        // The epoch fallback only shows up for an empty table, where the
        // pipeline yields "no data" regardless of the range.
        let fallback = NaiveDate::default();
        FilterCriteria {
            date_from: table.date_min.unwrap_or(fallback),
            date_to: table.date_max.unwrap_or(fallback),
            categories: table.categories.clone(),
            manufacturers: table.manufacturers.clone(),
        }
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Return the rows passing all three predicates (logical AND):
/// * `date_from ≤ date ≤ date_to`
/// * `category` is in the selected set
/// * `manufacturer` is in the selected set
///
/// Pure and deterministic.  `table.records` is date-sorted, so the result
/// stays date-sorted for the downstream time-series consumers.
pub fn filter(table: &RegistrationTable, criteria: &FilterCriteria) -> Vec<RegistrationRecord> {
    table
        .records
        .iter()
        .filter(|r| {
            criteria.date_from <= r.date
                && r.date <= criteria.date_to
                && criteria.categories.contains(&r.category)
                && criteria.manufacturers.contains(&r.manufacturer)
        })
        .cloned()
        .collect()
}
