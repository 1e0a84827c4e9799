use eframe::egui;

use super::render::{draw_background, draw_hud, draw_shape};
use super::PaintApp;

impl eframe::App for PaintApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_images(ctx);

        // Taken out of the input lock: handling a key release may measure
        // text, which needs the font atlas behind the same lock.
        let events = ctx.input(|i| i.events.clone());
        for event in &events {
            match event {
                egui::Event::Key {
                    key,
                    pressed: true,
                    repeat,
                    ..
                } => self.editor.key_pressed(*key, *repeat),
                egui::Event::Key {
                    key,
                    pressed: false,
                    modifiers,
                    ..
                } => self.editor.key_released(*key, *modifiers),
                egui::Event::PointerMoved(pos) => {
                    self.editor.pointer_moved(pos.x as i32, pos.y as i32);
                }
                egui::Event::Text(text) => self.editor.text_input(text),
                egui::Event::Paste(text) => self.editor.paste(text),
                _ => {}
            }
        }
        self.editor.end_frame();

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let (rect, _response) =
                    ui.allocate_exact_size(ui.available_size(), egui::Sense::click_and_drag());
                let painter = ui.painter_at(rect);

                draw_background(&painter, rect);
                for shape in self.editor.scene() {
                    draw_shape(&painter, &shape.borrow(), &self.textures);
                }
                if let Some(preview) = self.editor.preview_shape() {
                    draw_shape(&painter, &preview, &self.textures);
                }
                draw_hud(&painter, rect, &self.editor.style());
            });

        if self.editor.take_repaint() {
            ctx.request_repaint();
        }
    }
}
