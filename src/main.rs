use eframe::egui;

use link_peek::config::PreviewConfig;

mod app;
mod ui;

use app::BrowserApp;

fn main() -> eframe::Result<()> {
    env_logger::init();

    let config = PreviewConfig::from_env();
    log::info!(
        "Starting with modifier {:?}, history interception {}",
        config.modifier,
        if config.intercept_history { "on" } else { "off" }
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1280.0, 800.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Link Peek",
        options,
        Box::new(|_cc| Ok(Box::new(BrowserApp::new(config)))),
    )
}
