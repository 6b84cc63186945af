mod app;
mod cli;
mod color;
mod state;
mod ui;

use anyhow::{anyhow, bail, Result};
use app::HemaviewApp;
use clap::Parser;
use eframe::egui;
use hemaview::config::AppConfig;
use hemaview::data::{export::export_report, loader::load_record};
use state::AppState;

fn main() -> Result<()> {
    env_logger::init();

    let args = cli::Args::parse();
    let config = AppConfig::load_or_default(&args.config);

    // Headless: one record in, one report out.
    if let Some(out) = &args.export {
        let Some(record) = &args.record else {
            bail!("--export needs a RECORD to read");
        };
        let report = load_record(record, &config)?;
        export_report(&report, out, &config.export)?;
        log::info!("wrote {}", out.display());
        return Ok(());
    }

    let mut state = AppState::new(config);
    if let Some(record) = &args.record {
        state.open_record(record);
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Hemaview – Hematology Histogram Viewer",
        options,
        Box::new(|_cc| Ok(Box::new(HemaviewApp::new(state)))),
    )
    .map_err(|e| anyhow!("{e}"))
}
