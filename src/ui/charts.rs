use std::collections::BTreeMap;

use chrono::NaiveDate;
use eframe::egui::{RichText, ScrollArea, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use crate::data::model::GrowthRecord;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Central panel: KPI strip, three charts, insight line
// ---------------------------------------------------------------------------

/// Render the dashboard in the central panel.
pub fn central_panel(ui: &mut Ui, state: &AppState) {
    if state.table.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a file to view registrations  (File → Open…)");
        });
        return;
    }

    ui.heading("Vehicle Registration Dashboard");
    ui.add_space(4.0);

    kpi_strip(ui, state);
    ui.separator();

    if state.view.filtered.is_empty() {
        ui.label("No data for the current selection.");
        return;
    }

    insight_line(ui, state);
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            trend_chart(ui, state);
            ui.add_space(8.0);
            growth_chart(ui, state, &state.view.yoy, "Year-over-Year Growth %", "yoy");
            ui.add_space(8.0);
            growth_chart(ui, state, &state.view.qoq, "Quarter-over-Quarter Growth %", "qoq");
        });
}

// ---------------------------------------------------------------------------
// KPI strip
// ---------------------------------------------------------------------------

fn kpi_strip(ui: &mut Ui, state: &AppState) {
    ui.columns(3, |cols: &mut [Ui]| {
        kpi(&mut cols[0], "Total Registrations", format_count(state.view.total));
        kpi(&mut cols[1], "Avg YoY Growth", format_pct(state.view.avg_yoy));
        kpi(&mut cols[2], "Avg QoQ Growth", format_pct(state.view.avg_qoq));
    });
}

fn kpi(ui: &mut Ui, label: &str, value: String) {
    ui.vertical(|ui: &mut Ui| {
        ui.label(RichText::new(label).small());
        ui.heading(value);
    });
}

/// Thousands-separated count, e.g. `1,234,567`.
fn format_count(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Percentage with the explicit "N/A" sentinel for undefined averages.
fn format_pct(pct: Option<f64>) -> String {
    match pct {
        Some(p) => format!("{p:.2}%"),
        None => "N/A".to_string(),
    }
}

// ---------------------------------------------------------------------------
// Insight line
// ---------------------------------------------------------------------------

fn insight_line(ui: &mut Ui, state: &AppState) {
    ui.strong("Insight");
    if let Some((name, total)) = &state.view.top_manufacturer {
        ui.label(format!(
            "The top-performing manufacturer in the selected range is {name} \
             with {} total registrations.",
            format_count(*total)
        ));
    }
}

// ---------------------------------------------------------------------------
// Date ↔ plot-coordinate mapping
// ---------------------------------------------------------------------------

/// Plot x-coordinates are days since the Unix epoch.
fn date_to_x(date: NaiveDate) -> f64 {
    (date - NaiveDate::default()).num_days() as f64
}

fn x_to_label(x: f64) -> String {
    NaiveDate::default()
        .checked_add_days(chrono::Days::new(x.max(0.0).round() as u64))
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

// ---------------------------------------------------------------------------
// Trend chart
// ---------------------------------------------------------------------------

/// Registrations over time, one line per category (monthly totals summed
/// over the selected manufacturers).
fn trend_chart(ui: &mut Ui, state: &AppState) {
    let mut series: BTreeMap<&str, Vec<[f64; 2]>> = BTreeMap::new();
    for row in &state.view.trend {
        series
            .entry(row.category.as_str())
            .or_default()
            .push([date_to_x(row.date), row.registrations as f64]);
    }

    ui.strong("Registration Trends Over Time");
    Plot::new("trend_chart")
        .legend(Legend::default())
        .height(260.0)
        .x_axis_formatter(|mark, _range| x_to_label(mark.value))
        .y_axis_label("Registrations")
        .show(ui, |plot_ui| {
            for (category, points) in series {
                let line = Line::new(PlotPoints::from(points))
                    .name(category)
                    .color(state.colors.color_for(category))
                    .width(1.5);
                plot_ui.line(line);
            }
        });
}

// ---------------------------------------------------------------------------
// Growth bar charts
// ---------------------------------------------------------------------------

/// Growth % per (date, category) as grouped bars.  Rows with undefined
/// growth are simply absent from the chart.
fn growth_chart(ui: &mut Ui, state: &AppState, rows: &[GrowthRecord], title: &str, id: &str) {
    let mut series: BTreeMap<&str, Vec<(f64, f64)>> = BTreeMap::new();
    for row in rows {
        if let Some(pct) = row.growth_pct {
            series
                .entry(row.category.as_str())
                .or_default()
                .push((date_to_x(row.date), pct));
        }
    }

    let n_series = series.len().max(1);
    // Bars for one month share ~26 of its ~30 days.
    let width = 26.0 / n_series as f64;

    ui.strong(title);
    Plot::new(format!("growth_chart_{id}"))
        .legend(Legend::default())
        .height(260.0)
        .x_axis_formatter(|mark, _range| x_to_label(mark.value))
        .y_axis_label("Growth %")
        .show(ui, |plot_ui| {
            for (idx, (category, points)) in series.into_iter().enumerate() {
                let offset = (idx as f64 - (n_series as f64 - 1.0) / 2.0) * width;
                let color = state.colors.color_for(category);
                let bars: Vec<Bar> = points
                    .into_iter()
                    .map(|(x, pct)| Bar::new(x + offset, pct).width(width).fill(color))
                    .collect();
                plot_ui.bar_chart(BarChart::new(bars).name(category).color(color));
            }
        });
}
