//! Data layer: core types, loading, filtering, and the growth pipeline.
//!
//! Architecture:
//! ```text
//!  .csv / .json / .parquet
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  loader   │  parse file → RegistrationTable (immutable, date-sorted)
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  filter   │  date range + category + manufacturer predicates
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  growth   │  group by (date, category), lagged percentage change
//!   └──────────┘
//!        │
//!        ▼
//!   ┌──────────┐
//!   │  summary  │  total, average growth, top manufacturer
//!   └──────────┘
//! ```
//!
//! Everything below the loader is pure: same inputs, same outputs, no
//! mutation of the loaded table.  The UI recomputes the whole pipeline from
//! scratch on each interaction.

pub mod filter;
pub mod growth;
pub mod loader;
pub mod model;
pub mod summary;
