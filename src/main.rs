use std::sync::Arc;

use anyhow::Context as _;
use eframe::egui;

use korsanpaint::app::{settings, PaintApp};

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let settings = settings::config_path()
        .and_then(|path| settings::load_settings(&path))
        .unwrap_or_default();
    let source = std::env::args()
        .nth(1)
        .unwrap_or_else(|| settings.image_dir.clone());

    let mut viewport = egui::ViewportBuilder::default()
        .with_title("KorsanPaint")
        .with_inner_size([800.0, 600.0])
        .with_min_inner_size([800.0, 600.0])
        .with_maximized(true);
    if let Some(path) = settings.icon_path.clone() {
        let icon =
            load_icon(&path).with_context(|| format!("loading window icon from {path}"))?;
        viewport = viewport.with_icon(Arc::new(icon));
    }

    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };
    // eframe's error is not Send + Sync and cannot cross `?` into anyhow.
    eframe::run_native(
        "KorsanPaint",
        native_options,
        Box::new(move |cc| match PaintApp::new(cc, &settings, source) {
            Ok(app) => Ok(Box::new(app)),
            Err(err) => Err(err.into()),
        }),
    )
    .map_err(|err| anyhow::anyhow!("{err}"))
}

fn load_icon(path: &str) -> anyhow::Result<egui::IconData> {
    let bytes = std::fs::read(path)?;
    let image = image::load_from_memory(&bytes)?.to_rgba8();
    let (width, height) = image.dimensions();
    Ok(egui::IconData {
        rgba: image.into_raw(),
        width,
        height,
    })
}
