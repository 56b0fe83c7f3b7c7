use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Schema errors
// ---------------------------------------------------------------------------

/// Structural problems in a source file that make the table unusable.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("missing required column '{0}'")]
    MissingColumn(&'static str),
    #[error("row {row}: '{value}' is not a valid date (expected YYYY-MM-DD or YYYY-MM)")]
    BadDate { row: usize, value: String },
    #[error("row {row}: '{value}' is not a non-negative registration count")]
    BadCount { row: usize, value: String },
}

// ---------------------------------------------------------------------------
// RegistrationRecord – one row of the raw table
// ---------------------------------------------------------------------------

/// A single registration count for one (date, category, manufacturer) cell.
/// Duplicate keys are legal in raw data; grouping always sums.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationRecord {
    pub date: NaiveDate,
    pub category: String,
    pub manufacturer: String,
    pub registrations: u64,
}

// ---------------------------------------------------------------------------
// RegistrationTable – the complete loaded dataset
// ---------------------------------------------------------------------------

/// The full parsed dataset with pre-computed value indices.
/// Built once per load and treated as immutable thereafter.
#[derive(Debug, Clone)]
pub struct RegistrationTable {
    /// All rows, sorted by date ascending (stable over input order).
    pub records: Vec<RegistrationRecord>,
    /// Sorted set of distinct categories observed in the data.
    pub categories: BTreeSet<String>,
    /// Sorted set of distinct manufacturers observed in the data.
    pub manufacturers: BTreeSet<String>,
    /// Earliest row date, `None` only for an empty table.
    pub date_min: Option<NaiveDate>,
    /// Latest row date, `None` only for an empty table.
    pub date_max: Option<NaiveDate>,
}

impl RegistrationTable {
    /// Build value indices from loaded rows and sort them by date.
    pub fn from_records(mut records: Vec<RegistrationRecord>) -> Self {
        records.sort_by_key(|r| r.date);

        let mut categories = BTreeSet::new();
        let mut manufacturers = BTreeSet::new();
        for rec in &records {
            categories.insert(rec.category.clone());
            manufacturers.insert(rec.manufacturer.clone());
        }

        let date_min = records.first().map(|r| r.date);
        let date_max = records.last().map(|r| r.date);

        RegistrationTable {
            records,
            categories,
            manufacturers,
            date_min,
            date_max,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ---------------------------------------------------------------------------
// MonthlyTotal – one row of the grouped (date, category) series
// ---------------------------------------------------------------------------

/// Registrations summed over manufacturers for one (date, category) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthlyTotal {
    pub date: NaiveDate,
    pub category: String,
    pub registrations: u64,
}

// ---------------------------------------------------------------------------
// GrowthRecord – one row of a growth table
// ---------------------------------------------------------------------------

/// A [`MonthlyTotal`] annotated with the lagged comparison value.
///
/// `growth_pct` is `None` when the comparison month is missing or its total
/// is zero: "not computable" is a distinct state, never 0.0 or infinity.
#[derive(Debug, Clone, PartialEq)]
pub struct GrowthRecord {
    pub date: NaiveDate,
    pub category: String,
    pub registrations: u64,
    pub prev_registrations: Option<u64>,
    pub growth_pct: Option<f64>,
}
