use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::DatePickerButton;

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let table = match &state.table {
        Some(t) => t,
        None => {
            ui.label("No dataset loaded.");
            return;
        }
    };

    // Clone what we need so we can mutate state inside the loop.
    let categories: Vec<String> = table.categories.iter().cloned().collect();
    let manufacturers: Vec<String> = table.manufacturers.iter().cloned().collect();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            date_range_section(ui, state);
            ui.separator();
            category_section(ui, state, &categories);
            ui.separator();
            manufacturer_section(ui, state, &manufacturers);
        });
}

/// Two inclusive date pickers, defaulting to the table's observed range.
fn date_range_section(ui: &mut Ui, state: &mut AppState) {
    let Some(criteria) = &mut state.criteria else {
        return;
    };

    ui.strong("Date range");
    let mut changed = false;

    ui.horizontal(|ui: &mut Ui| {
        ui.label("From");
        changed |= ui
            .add(DatePickerButton::new(&mut criteria.date_from).id_salt("date_from"))
            .changed();
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.label("To");
        changed |= ui
            .add(DatePickerButton::new(&mut criteria.date_to).id_salt("date_to"))
            .changed();
    });

    // An inverted range is allowed; it simply selects nothing.
    if criteria.date_from > criteria.date_to {
        ui.label(RichText::new("Range selects no rows").color(Color32::YELLOW));
    }

    if changed {
        state.recompute();
    }
}

fn category_section(ui: &mut Ui, state: &mut AppState, categories: &[String]) {
    let n_selected = state
        .criteria
        .as_ref()
        .map_or(0, |c| c.categories.len());
    let header = format!("Vehicle categories  ({n_selected}/{})", categories.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("categories")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_categories();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_categories();
                }
            });

            for cat in categories {
                let is_selected = state
                    .criteria
                    .as_ref()
                    .is_some_and(|c| c.categories.contains(cat));
                let text = RichText::new(cat).color(state.colors.color_for(cat));

                let mut checked = is_selected;
                if ui.checkbox(&mut checked, text).changed() {
                    state.toggle_category(cat);
                }
            }
        });
}

fn manufacturer_section(ui: &mut Ui, state: &mut AppState, manufacturers: &[String]) {
    let n_selected = state
        .criteria
        .as_ref()
        .map_or(0, |c| c.manufacturers.len());
    let header = format!("Manufacturers  ({n_selected}/{})", manufacturers.len());

    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("manufacturers")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all_manufacturers();
                }
                if ui.small_button("None").clicked() {
                    state.select_no_manufacturers();
                }
            });

            for man in manufacturers {
                let is_selected = state
                    .criteria
                    .as_ref()
                    .is_some_and(|c| c.manufacturers.contains(man));

                let mut checked = is_selected;
                if ui.checkbox(&mut checked, man).changed() {
                    state.toggle_manufacturer(man);
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} rows loaded, {} in selection",
                table.len(),
                state.view.filtered.len()
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open registration data")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.loading = true;
        match crate::data::loader::load_file(&path) {
            Ok(table) => {
                log::info!(
                    "Loaded {} rows, {} categories, {} manufacturers",
                    table.len(),
                    table.categories.len(),
                    table.manufacturers.len()
                );
                state.set_table(table);
            }
            Err(e) => {
                log::error!("Failed to load file: {e:#}");
                state.status_message = Some(format!("Error: {e:#}"));
                state.loading = false;
            }
        }
    }
}
