use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::export::DEFAULT_EXPORT_NAME;
use crate::data::model::{Column, format_dollars, format_thousands};
use crate::state::{AppState, SetFilter};

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🔍 Filters");
    ui.separator();

    let Some(dataset) = &state.dataset else {
        ui.label("No dataset loaded.");
        return;
    };

    // Clone what we need so we can mutate state inside the loop.
    let categories: Vec<String> = dataset.categories.iter().cloned().collect();
    let cities: Vec<String> = dataset.cities.iter().cloned().collect();
    let bounds = dataset.score_bounds;

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            score_range_controls(ui, state, bounds);
            ui.separator();

            checklist(ui, state, SetFilter::Category, &categories, true);
            checklist(ui, state, SetFilter::City, &cities, false);

            ui.separator();
            if ui
                .add_enabled(state.criteria.is_active(), egui::Button::new("Clear all filters"))
                .clicked()
            {
                state.clear_filters();
            }
        });
}

fn score_range_controls(ui: &mut Ui, state: &mut AppState, bounds: Option<(f64, f64)>) {
    ui.strong("Composite Score Range");
    let Some((lo, hi)) = bounds else {
        ui.label("No scores in dataset.");
        return;
    };

    let mut changed = false;
    ui.horizontal(|ui: &mut Ui| {
        changed |= ui
            .add(
                egui::DragValue::new(&mut state.range_input.0)
                    .speed(0.1)
                    .range(lo..=hi)
                    .max_decimals(2)
                    .prefix("min "),
            )
            .changed();
        changed |= ui
            .add(
                egui::DragValue::new(&mut state.range_input.1)
                    .speed(0.1)
                    .range(lo..=hi)
                    .max_decimals(2)
                    .prefix("max "),
            )
            .changed();
        if ui.small_button("Reset").clicked() {
            state.reset_range();
        }
    });
    if changed {
        state.apply_range_input();
    }
    if let Some(warning) = &state.range_warning {
        ui.label(RichText::new(format!("⚠ {warning}")).color(Color32::YELLOW));
    }
}

fn checklist(ui: &mut Ui, state: &mut AppState, filter: SetFilter, values: &[String], open: bool) {
    // Show count of selected / total in the header
    let (n_selected, n_total) = state.selection_counts(filter);
    let header_text = format!("{}  ({n_selected}/{n_total})", filter.label());

    egui::CollapsingHeader::new(RichText::new(header_text).strong())
        .id_salt(filter.label())
        .default_open(open)
        .show(ui, |ui: &mut Ui| {
            // Select all / none buttons
            ui.horizontal(|ui: &mut Ui| {
                if ui.small_button("All").clicked() {
                    state.select_all(filter);
                }
                if ui.small_button("None").clicked() {
                    state.select_none(filter);
                }
            });

            let colors = state.category_colors.clone();
            ScrollArea::vertical()
                .id_salt(("checklist", filter.label()))
                .max_height(260.0)
                .show(ui, |ui: &mut Ui| {
                    for value in values {
                        let mut text = RichText::new(value);
                        // Category labels carry their chart colour.
                        if filter == SetFilter::Category {
                            if let Some(cm) = &colors {
                                text = text.color(cm.color_for(value));
                            }
                        }

                        let mut checked = state.is_selected(filter, value);
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_filter_value(filter, value);
                        }
                    }
                });
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
            let can_export = state.dataset.is_some();
            if ui
                .add_enabled(can_export, egui::Button::new("Export filtered data…"))
                .clicked()
            {
                save_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} zip codes loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            if let Some(path) = &state.dataset_path {
                ui.label(RichText::new(path.display().to_string()).weak());
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Key metrics strip
// ---------------------------------------------------------------------------

/// Five headline numbers over the filtered view.
pub fn key_metrics(ui: &mut Ui, state: &AppState) {
    let Some(summary) = &state.summary else {
        return;
    };
    let fmt = |col: Column, f: fn(f64) -> String| summary.mean(col).map_or("–".to_string(), f);

    let metrics = [
        ("Total Zip Codes", summary.count.to_string()),
        (
            "Avg Composite Score",
            fmt(Column::CompositeScore, |v| format!("{v:.2}")),
        ),
        ("Avg Median Income", fmt(Column::MedianIncome, format_dollars)),
        ("Avg Home Value", fmt(Column::MedianHomeValue, format_dollars)),
        (
            "Avg Population",
            fmt(Column::EstimatedPopulation, format_thousands),
        ),
    ];

    ui.columns(metrics.len(), |cols: &mut [Ui]| {
        for (ui, (label, value)) in cols.iter_mut().zip(metrics) {
            ui.group(|ui: &mut Ui| {
                ui.set_min_width(ui.available_width());
                ui.label(RichText::new(label).weak());
                ui.label(RichText::new(value).size(22.0).strong());
            });
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open zip code dataset")
        .add_filter("Supported files", &["csv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

pub fn save_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Download filtered data as CSV")
        .set_file_name(DEFAULT_EXPORT_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_table(&path) {
            log::error!("Export to {} failed: {e:#}", path.display());
        }
    }
}
