//! Rendering layer: panels (filters, toolbar) and the dashboard charts.

pub mod charts;
pub mod panels;
