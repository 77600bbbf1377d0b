use eframe::egui::{self, Color32, RichText, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::data::filter::FilteredView;
use crate::data::model::{Column, ZipDataset};
use crate::data::summary::describe;
use crate::state::AppState;
use crate::ui::panels::save_file_dialog;

const ROW_HEIGHT: f32 = 20.0;

/// Columns of the top / bottom ranking tables.
const RANKING_COLUMNS: [Column; 5] = [
    Column::ZipCode,
    Column::PrimaryCity,
    Column::CompositeScore,
    Column::MedianIncome,
    Column::MedianHomeValue,
];

// ---------------------------------------------------------------------------
// Generic record table
// ---------------------------------------------------------------------------

/// Table of dataset rows. `ranked` adds a leading 1-based rank column.
pub fn record_table(
    ui: &mut Ui,
    id: &str,
    dataset: &ZipDataset,
    indices: &[usize],
    columns: &[Column],
    ranked: bool,
    max_height: f32,
) {
    let n_cols = columns.len() + usize::from(ranked);
    TableBuilder::new(ui)
        .id_salt(id)
        .striped(true)
        .resizable(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .columns(TableColumn::auto().at_least(48.0), n_cols)
        .min_scrolled_height(0.0)
        .max_scroll_height(max_height)
        .header(ROW_HEIGHT + 4.0, |mut header| {
            if ranked {
                header.col(|ui: &mut Ui| {
                    ui.strong("#");
                });
            }
            for col in columns {
                header.col(|ui: &mut Ui| {
                    ui.strong(col.label());
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, indices.len(), |mut row| {
                let pos = row.index();
                let record = &dataset.records[indices[pos]];
                if ranked {
                    row.col(|ui: &mut Ui| {
                        ui.label((pos + 1).to_string());
                    });
                }
                for col in columns {
                    row.col(|ui: &mut Ui| {
                        ui.label(record.display(*col));
                    });
                }
            });
        });
}

/// Ranking table (top / bottom N) with its own heading.
pub fn ranking_table(ui: &mut Ui, id: &str, title: &str, dataset: &ZipDataset, indices: &[usize]) {
    ui.label(RichText::new(title).strong().size(15.0));
    if indices.is_empty() {
        ui.label(RichText::new("No data for the current filters").italics().weak());
        return;
    }
    record_table(ui, id, dataset, indices, &RANKING_COLUMNS, true, 320.0);
}

// ---------------------------------------------------------------------------
// Data Table tab
// ---------------------------------------------------------------------------

/// Search box, column picker, export button and the full table.
pub fn data_table_tab(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Data Table");

    ui.horizontal(|ui: &mut Ui| {
        ui.label("🔍");
        ui.add(
            egui::TextEdit::singleline(&mut state.search)
                .hint_text("Search (zip code, city, category)")
                .desired_width(280.0),
        );
        if !state.search.is_empty() && ui.small_button("✖").clicked() {
            state.search.clear();
        }
    });

    egui::CollapsingHeader::new("Select columns to display")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            ui.horizontal_wrapped(|ui: &mut Ui| {
                for col in Column::ALL {
                    let mut shown = state.table_columns.contains(&col);
                    if ui.checkbox(&mut shown, col.name()).changed() {
                        state.toggle_table_column(col);
                    }
                }
            });
        });

    let visible = state.table_view().map_or(0, |v| v.len());
    ui.horizontal(|ui: &mut Ui| {
        if ui
            .add_enabled(state.dataset.is_some(), egui::Button::new("📥 Download filtered data as CSV"))
            .clicked()
        {
            save_file_dialog(state);
        }
        ui.checkbox(&mut state.export_visible_only, "Visible columns only");
        ui.label(RichText::new(format!("{visible} rows")).weak());
    });
    if let Some(msg) = &state.export_message {
        let color = if msg.starts_with("Export failed") {
            Color32::RED
        } else {
            Color32::GREEN
        };
        ui.label(RichText::new(msg).color(color));
    }
    ui.separator();

    let Some(view) = state.table_view() else {
        return;
    };
    show_view(ui, &view, &state.table_columns);

    ui.add_space(12.0);
    summary_statistics(ui, &view, &state.table_columns);
}

fn show_view(ui: &mut Ui, view: &FilteredView<'_>, columns: &[Column]) {
    if view.is_empty() {
        ui.label(RichText::new("No zip codes match the current filters and search.").italics());
        return;
    }
    if columns.is_empty() {
        ui.label("Select at least one column to display.");
        return;
    }
    record_table(
        ui,
        "data_table",
        view.dataset(),
        view.indices(),
        columns,
        false,
        600.0,
    );
}

/// Count / mean / min / max of the visible numeric columns over the searched view.
fn summary_statistics(ui: &mut Ui, view: &FilteredView<'_>, columns: &[Column]) {
    ui.label(RichText::new("Summary Statistics").strong().size(15.0));
    let rows = describe(view, columns);
    if rows.is_empty() {
        ui.label(RichText::new("No numeric columns selected.").italics().weak());
        return;
    }

    TableBuilder::new(ui)
        .id_salt("summary_statistics")
        .striped(true)
        .cell_layout(egui::Layout::left_to_right(egui::Align::Center))
        .column(TableColumn::auto().at_least(140.0))
        .columns(TableColumn::auto().at_least(80.0), 4)
        .header(ROW_HEIGHT + 4.0, |mut header| {
            for title in ["Column", "count", "mean", "min", "max"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                let (col, stats) = rows[row.index()];
                let cells = match stats {
                    Some(s) => [
                        s.count.to_string(),
                        format!("{:.2}", s.mean),
                        format!("{:.2}", s.min),
                        format!("{:.2}", s.max),
                    ],
                    None => ["0".to_string(), "–".into(), "–".into(), "–".into()],
                };
                row.col(|ui: &mut Ui| {
                    ui.label(col.label());
                });
                for text in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(text);
                    });
                }
            });
        });
}
