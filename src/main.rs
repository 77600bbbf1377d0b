use eframe::egui;
use la_zip_dashboard::app::ZipDashboardApp;
use la_zip_dashboard::config::DashboardConfig;
use la_zip_dashboard::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = DashboardConfig::from_args(std::env::args().skip(1));
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size(config.window_size)
            .with_min_inner_size(config.min_window_size),
        ..Default::default()
    };

    // Load once, before the first frame; the dataset is never reloaded implicitly.
    let mut state = AppState::new(config);
    state.load_initial();

    eframe::run_native(
        "LA County Zip Code Analysis Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(ZipDashboardApp::new(state)))),
    )
}
