use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Tab};
use crate::ui::{panels, table, tabs};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct ZipDashboardApp {
    pub state: AppState,
}

impl ZipDashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl Default for ZipDashboardApp {
    fn default() -> Self {
        Self::new(AppState::default())
    }
}

impl eframe::App for ZipDashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics + tabs ----
        egui::CentralPanel::default().show(ctx, |ui| {
            dashboard(ui, &mut self.state);
        });
    }
}

fn dashboard(ui: &mut Ui, state: &mut AppState) {
    ui.heading("🏙 Los Angeles County Zip Code Analysis Dashboard");
    ui.separator();

    if state.dataset.is_none() {
        // Load failures halt every analysis view.
        ui.centered_and_justified(|ui: &mut Ui| match &state.status_message {
            Some(msg) => {
                ui.label(RichText::new(msg).color(Color32::RED).size(16.0));
            }
            None => {
                ui.heading("Open a dataset to begin  (File → Open…)");
            }
        });
        return;
    }

    panels::key_metrics(ui, state);
    ui.separator();

    ui.horizontal(|ui: &mut Ui| {
        for tab in Tab::ALL {
            ui.selectable_value(&mut state.active_tab, tab, tab.title());
        }
    });
    ui.separator();

    if state.visible_indices.is_empty() && state.active_tab != Tab::DataTable {
        ui.label(
            RichText::new("No zip codes match the current filters. Adjust or clear them in the side panel.")
                .color(Color32::YELLOW),
        );
    }

    egui::ScrollArea::vertical()
        .id_salt(state.active_tab.title())
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.active_tab {
            Tab::Overview => tabs::overview(ui, state),
            Tab::ScoreAnalysis => tabs::score_analysis(ui, state),
            Tab::EconomicMetrics => tabs::economic_metrics(ui, state),
            Tab::Demographics => tabs::demographics(ui, state),
            Tab::DataTable => table::data_table_tab(ui, state),
        });
}
