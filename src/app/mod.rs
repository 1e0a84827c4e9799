use std::sync::mpsc::{Receiver, TryRecvError};

use anyhow::{Context as _, Result};
use eframe::egui;
use log::{debug, info};

use crate::editor::Editor;
use crate::loader::{self, LoadedImage};
use crate::model::{FONT_SIZE, TextMetrics};

mod render;
pub mod settings;
mod update;

/// Text measurement against the live font atlas, so stored text extents agree
/// with what the painter lays out.
struct GalleyMetrics {
    ctx: egui::Context,
}

impl TextMetrics for GalleyMetrics {
    fn measure(&self, text: &str) -> (i32, i32) {
        let galley = self.ctx.fonts_mut(|fonts| {
            fonts.layout_no_wrap(
                text.to_string(),
                egui::FontId::proportional(FONT_SIZE),
                egui::Color32::WHITE,
            )
        });
        (galley.size().x as i32, galley.size().y as i32)
    }
}

pub struct PaintApp {
    editor: Editor,
    textures: Vec<egui::TextureHandle>,
    images: Option<Receiver<LoadedImage>>,
}

impl PaintApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        app_settings: &settings::AppSettings,
        source: String,
    ) -> Result<Self> {
        if let Some(ref font_path) = app_settings.font_path {
            install_editor_font(&cc.egui_ctx, font_path)?;
        }

        info!("loading images from {source}");
        let images = loader::spawn(source, cc.egui_ctx.clone());
        let editor = Editor::new(Box::new(GalleyMetrics {
            ctx: cc.egui_ctx.clone(),
        }));

        Ok(Self {
            editor,
            textures: Vec::new(),
            images: Some(images),
        })
    }

    /// Drains whatever the loader thread has published so far. Once the
    /// channel disconnects the receiver is dropped for good; the loader only
    /// ever runs once.
    fn poll_images(&mut self, ctx: &egui::Context) {
        let Some(rx) = self.images.take() else {
            return;
        };
        let mut open = true;
        loop {
            match rx.try_recv() {
                Ok(LoadedImage::Canvas(img)) => {
                    let [w, h] = img.size;
                    self.push_texture(ctx, img);
                    self.editor.place_startup_image(w as i32, h as i32);
                }
                Ok(LoadedImage::Slot(img)) => {
                    self.push_texture(ctx, img);
                    self.editor.image_published();
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    open = false;
                    break;
                }
            }
        }
        if open {
            self.images = Some(rx);
        } else {
            info!("image loader finished with {} slot(s)", self.textures.len());
        }
    }

    fn push_texture(&mut self, ctx: &egui::Context, img: egui::ColorImage) {
        let name = format!("image-{}", self.textures.len());
        debug!("publishing texture {name} ({}x{})", img.size[0], img.size[1]);
        let handle = ctx.load_texture(name, img, egui::TextureOptions::LINEAR);
        self.textures.push(handle);
    }
}

fn install_editor_font(ctx: &egui::Context, path: &str) -> Result<()> {
    let bytes =
        std::fs::read(path).with_context(|| format!("reading editor font from {path}"))?;

    let mut fonts = egui::FontDefinitions::default();
    fonts.font_data.insert(
        "editor".to_string(),
        std::sync::Arc::new(egui::FontData::from_owned(bytes)),
    );
    if let Some(family) = fonts.families.get_mut(&egui::FontFamily::Proportional) {
        family.insert(0, "editor".to_string());
    }
    ctx.set_fonts(fonts);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn galley_metrics_grow_with_the_text() {
        let ctx = egui::Context::default();
        let _ = ctx.run(egui::RawInput::default(), |ctx| {
            let metrics = GalleyMetrics { ctx: ctx.clone() };
            let (w_short, h_short) = metrics.measure("hi");
            let (w_long, h_long) = metrics.measure("hi there");
            assert!(w_short > 0);
            assert!(h_short > 0);
            assert!(w_long > w_short);
            assert_eq!(h_short, h_long);
        });
    }
}
