use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use eframe::egui;
use log::{debug, warn};
use thiserror::Error;

pub const DEFAULT_IMAGE_DIR: &str = "/u/";

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Decode {
        path: PathBuf,
        source: image::ImageError,
    },
}

pub enum LoadedImage {
    /// The single-file source, to be placed full size onto the canvas.
    Canvas(egui::ColorImage),
    /// One decoded directory entry, published in listing order.
    Slot(egui::ColorImage),
}

/// Fires the one-shot loader thread. It publishes every image it finds over
/// the returned channel, asks for one repaint, and exits.
pub fn spawn(source: String, ctx: egui::Context) -> Receiver<LoadedImage> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        scan(&source, &tx);
        ctx.request_repaint();
    });
    rx
}

/// A source under /tmp is taken as a single image file; after it loads, the
/// scan falls through to the default directory. Anything else is listed,
/// sorted, and decoded entry by entry, skipping whatever does not decode.
pub fn scan(source: &str, tx: &Sender<LoadedImage>) {
    let mut dir = source.to_string();
    if dir.starts_with("/tmp") {
        match decode(Path::new(&dir)) {
            Ok(img) => {
                let _ = tx.send(LoadedImage::Canvas(img));
                dir = DEFAULT_IMAGE_DIR.to_string();
            }
            Err(err) => debug!("startup image skipped: {err}"),
        }
    }

    let entries = match fs::read_dir(&dir) {
        Ok(entries) => entries,
        Err(err) => {
            warn!("image directory {dir} is not readable: {err}");
            return;
        }
    };

    let mut paths: Vec<PathBuf> = entries.flatten().map(|entry| entry.path()).collect();
    paths.sort();

    for path in paths {
        match decode(&path) {
            Ok(img) => {
                let _ = tx.send(LoadedImage::Slot(img));
            }
            Err(err) => debug!("skipped {}: {err}", path.display()),
        }
    }
}

fn decode(path: &Path) -> Result<egui::ColorImage, LoadError> {
    let bytes = fs::read(path).map_err(|source| LoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let decoded = image::load_from_memory(&bytes).map_err(|source| LoadError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    let buffer = decoded.to_rgba8();
    let size = [buffer.width() as usize, buffer.height() as usize];
    let pixels = buffer.as_flat_samples();
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        size,
        pixels.as_slice(),
    ))
}
