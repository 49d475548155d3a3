//! pcset-gui: Pitch-class set calculator

mod app;
mod panels;

use anyhow::Context as _;
use app::PcSetApp;
use eframe::NativeOptions;
use pcset_core::Catalog;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("pcset=debug,eframe=warn,egui_glow=warn")))
        .init();

    tracing::info!("Starting pcsetcalc");

    // A catalog that fails validation is unusable; refuse to start
    let catalog = Catalog::load().context("set-class catalog is corrupt")?;
    tracing::info!(classes = catalog.set_classes().len(), "Catalog loaded");

    let options = NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([960.0, 640.0]),
        ..Default::default()
    };

    eframe::run_native(
        "pcsetcalc",
        options,
        Box::new(move |cc| Ok(Box::new(PcSetApp::new(cc, catalog)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
