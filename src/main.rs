mod core;
mod gui;
mod playback;
mod video;

use eframe::egui;
use gui::FeedApp;

const APP_NAME: &str = "Feed Autoplay";

fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Starting {} {}", APP_NAME, env!("CARGO_PKG_VERSION"));

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1100.0, 800.0])
            .with_min_inner_size([640.0, 480.0])
            .with_title(APP_NAME),
        ..Default::default()
    };

    eframe::run_native(
        APP_NAME,
        options,
        Box::new(|cc| {
            let app = FeedApp::new(cc).map_err(|e| {
                log::error!("Failed to set up the feed: {:#}", e);
                e
            })?;
            Ok(Box::new(app))
        }),
    )
    .map_err(|e| anyhow::anyhow!("{} window closed with an error: {}", APP_NAME, e))
}
