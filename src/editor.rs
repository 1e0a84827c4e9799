use eframe::egui;

use crate::history::{handle, History, Scene};
use crate::model::{CharMetrics, Material, Shape, Style, TextMetrics};

/// Keyboard/pointer state machine behind the canvas. The pointer never draws
/// by itself; it only supplies the anchor and cursor for whatever key is
/// released. Each mutation lands in a fresh history revision, except restyle
/// and live text edits, which write through the shared shape handles.
pub struct Editor {
    history: History,
    style: Style,
    image_slot: i32,
    image_count: usize,
    x: i32,
    y: i32,
    anchor_x: i32,
    anchor_y: i32,
    typing: bool,
    deleting: bool,
    preview_key: Option<egui::Key>,
    anchor_pending: bool,
    dirty: bool,
    metrics: Box<dyn TextMetrics>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Box::new(CharMetrics))
    }
}

impl Editor {
    pub fn new(metrics: Box<dyn TextMetrics>) -> Self {
        Self {
            history: History::new(),
            style: Style::default(),
            image_slot: 0,
            image_count: 0,
            x: 0,
            y: 0,
            anchor_x: 0,
            anchor_y: 0,
            typing: false,
            deleting: false,
            preview_key: None,
            anchor_pending: false,
            dirty: true,
            metrics,
        }
    }

    pub fn scene(&self) -> &Scene {
        self.history.current()
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn style(&self) -> Style {
        self.style
    }

    pub fn is_typing(&self) -> bool {
        self.typing
    }

    pub fn is_deleting(&self) -> bool {
        self.deleting
    }

    pub fn image_slot(&self) -> i32 {
        self.image_slot
    }

    pub fn image_count(&self) -> usize {
        self.image_count
    }

    pub fn key_pressed(&mut self, key: egui::Key, repeat: bool) {
        if repeat {
            return;
        }
        if !self.typing && key == egui::Key::D {
            self.deleting = true;
            self.history.commit();
        }
        self.anchor_pending = true;
        if !self.typing {
            self.preview_key = Some(key);
        }
    }

    pub fn key_released(&mut self, key: egui::Key, modifiers: egui::Modifiers) {
        self.preview_key = None;
        let digit = digit_value(key);

        if modifiers.command && key == egui::Key::Z {
            self.history.undo();
            self.typing = false;
            self.dirty = true;
        } else if modifiers.command && key == egui::Key::Y {
            self.history.redo();
            self.typing = false;
            self.dirty = true;
        } else if modifiers.command && key == egui::Key::V {
            // Pasted content arrives as its own event; the release only
            // needs to be spent before it reaches the tap branch.
        } else if self.typing && key == egui::Key::Backspace {
            if let Some(last) = self.history.current().last() {
                last.borrow_mut().backspace_text(self.metrics.as_ref());
            }
            self.dirty = true;
        } else if key == egui::Key::Delete {
            self.history.commit();
            self.history.current_mut().clear();
            self.typing = false;
            self.dirty = true;
        } else if !self.typing && key == egui::Key::Enter {
            if let Some(last) = self.history.current().last() {
                last.borrow_mut().restyle(self.style.color, self.style.material);
            }
            self.dirty = true;
        } else if self.typing && key == egui::Key::Enter {
            if let Some(last) = self.history.current().last() {
                let row_y = last.borrow().y() + 100;
                let shape = Shape::text(self.style, ' ', self.x, row_y, self.metrics.as_ref());
                self.history.commit();
                self.history.current_mut().push(handle(shape));
                self.dirty = true;
            }
        } else if !self.typing && key == egui::Key::Backtick {
            self.style.material = self.style.material.cycled();
            self.dirty = true;
        } else if !self.typing && modifiers.command && matches!(digit, Some(1..=9)) {
            // Key k arms slot k - 3; the two lowest keys arm slots that can
            // never publish, and the guard in drag_shape holds them back.
            if let Some(d) = digit {
                self.image_slot = d - 3;
            }
            self.dirty = true;
        } else if !self.typing && !modifiers.command && matches!(digit, Some(0..=7)) {
            if let Some(d) = digit {
                self.style.color = d as usize;
            }
            self.dirty = true;
        } else if self.anchor_x == self.x && self.anchor_y == self.y {
            if !self.typing {
                if let Some(seed) = tap_seed(key) {
                    self.typing = true;
                    let shape = Shape::text(self.style, seed, self.x, self.y, self.metrics.as_ref());
                    self.history.commit();
                    self.history.current_mut().push(handle(shape));
                }
            }
            self.dirty = true;
        } else {
            if let Some(shape) = self.drag_shape(key) {
                self.history.commit();
                self.history.current_mut().push(handle(shape));
            }
            self.dirty = true;
        }

        if self.deleting {
            self.deleting = false;
        }
    }

    pub fn pointer_moved(&mut self, x: i32, y: i32) {
        self.x = x;
        self.y = y;
        self.typing = false;
        if self.deleting {
            let scene = self.history.current_mut();
            let before = scene.len();
            scene.retain(|shape| !shape.borrow().hit(x, y));
            if scene.len() != before {
                self.dirty = true;
            }
        }
        if self.preview_key.is_some() {
            self.dirty = true;
        }
    }

    pub fn text_input(&mut self, text: &str) {
        if !self.typing {
            return;
        }
        if let Some(last) = self.history.current().last() {
            last.borrow_mut().append_text(text, self.metrics.as_ref());
            self.dirty = true;
        }
    }

    pub fn paste(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if !self.typing {
            self.typing = true;
            let shape = Shape::text(self.style, ' ', self.x, self.y, self.metrics.as_ref());
            self.history.commit();
            self.history.current_mut().push(handle(shape));
        }
        if let Some(last) = self.history.current().last() {
            last.borrow_mut().append_text(text, self.metrics.as_ref());
        }
        self.dirty = true;
    }

    /// Applies the anchor capture once the whole event batch has been seen.
    pub fn end_frame(&mut self) {
        if self.anchor_pending {
            self.anchor_x = self.x;
            self.anchor_y = self.y;
            self.anchor_pending = false;
        }
    }

    /// A background-loaded directory image became available as the next slot.
    pub fn image_published(&mut self) {
        self.image_count += 1;
    }

    /// Startup single-file image: one revision holding the full-size shape
    /// at the origin, then the armed material switches to translucent.
    pub fn place_startup_image(&mut self, w: i32, h: i32) {
        let slot = self.image_count;
        self.image_count += 1;
        let shape = Shape::image(self.style, 0, 0, w, h, slot);
        self.history.commit();
        self.history.current_mut().push(handle(shape));
        self.style.material = Material::Translucent;
        self.dirty = true;
    }

    pub fn preview_shape(&self) -> Option<Shape> {
        self.drag_shape(self.preview_key?)
    }

    pub fn take_repaint(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    fn drag_shape(&self, key: egui::Key) -> Option<Shape> {
        let (x1, y1) = (self.anchor_x, self.anchor_y);
        let (x2, y2) = (self.x, self.y);
        match key {
            egui::Key::R => Some(Shape::rect(self.style, x1, y1, x2, y2)),
            egui::Key::E => Some(Shape::ellipse(self.style, x1, y1, x2, y2)),
            egui::Key::A => Some(Shape::arrow(self.style, x1, y1, x2, y2)),
            egui::Key::G => Some(Shape::grid(self.style, x1, y1, x2, y2)),
            egui::Key::I => {
                if self.image_slot < 0 || self.image_slot as usize >= self.image_count {
                    return None;
                }
                Some(Shape::image(
                    self.style,
                    x1,
                    y1,
                    x2,
                    y2,
                    self.image_slot as usize,
                ))
            }
            _ => None,
        }
    }
}

fn digit_value(key: egui::Key) -> Option<i32> {
    use eframe::egui::Key::*;
    Some(match key {
        Num0 => 0,
        Num1 => 1,
        Num2 => 2,
        Num3 => 3,
        Num4 => 4,
        Num5 => 5,
        Num6 => 6,
        Num7 => 7,
        Num8 => 8,
        Num9 => 9,
        _ => return None,
    })
}

fn tap_seed(key: egui::Key) -> Option<char> {
    use eframe::egui::Key::*;
    Some(match key {
        A => 'a',
        B => 'b',
        C => 'c',
        D => 'd',
        E => 'e',
        F => 'f',
        G => 'g',
        H => 'h',
        I => 'i',
        J => 'j',
        K => 'k',
        L => 'l',
        M => 'm',
        N => 'n',
        O => 'o',
        P => 'p',
        Q => 'q',
        R => 'r',
        S => 's',
        T => 't',
        U => 'u',
        V => 'v',
        W => 'w',
        X => 'x',
        Y => 'y',
        Z => 'z',
        Num8 => '8',
        Num9 => '9',
        Space => ' ',
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ShapeKind;
    use eframe::egui::{Key, Modifiers};

    fn editor() -> Editor {
        Editor::default()
    }

    fn drag(ed: &mut Editor, key: Key, from: (i32, i32), to: (i32, i32)) {
        ed.pointer_moved(from.0, from.1);
        ed.key_pressed(key, false);
        ed.end_frame();
        ed.pointer_moved(to.0, to.1);
        ed.key_released(key, Modifiers::NONE);
        ed.end_frame();
    }

    // Press and release land in separate frames, the way a real tap does;
    // the anchor capture between them is what makes the release a tap.
    fn tap(ed: &mut Editor, key: Key, at: (i32, i32)) {
        ed.pointer_moved(at.0, at.1);
        ed.key_pressed(key, false);
        ed.end_frame();
        ed.key_released(key, Modifiers::NONE);
        ed.end_frame();
    }

    #[test]
    fn drag_release_commits_one_shape() {
        let mut ed = editor();
        drag(&mut ed, Key::R, (100, 100), (300, 250));
        assert_eq!(ed.scene().len(), 1);
        assert_eq!(ed.history().cursor(), 1);
        assert_eq!(
            ed.scene()[0].borrow().kind,
            ShapeKind::Rect {
                x: 100,
                y: 100,
                w: 200,
                h: 150
            }
        );
    }

    #[test]
    fn non_shape_key_drag_commits_nothing() {
        let mut ed = editor();
        drag(&mut ed, Key::Q, (100, 100), (300, 250));
        assert!(ed.scene().is_empty());
        assert_eq!(ed.history().cursor(), 0);
    }

    #[test]
    fn repeat_presses_are_ignored() {
        let mut ed = editor();
        ed.pointer_moved(10, 10);
        ed.key_pressed(Key::D, true);
        assert!(!ed.is_deleting());
        assert_eq!(ed.history().cursor(), 0);
    }

    #[test]
    fn tap_starts_typing_with_the_seed_character() {
        let mut ed = editor();
        tap(&mut ed, Key::H, (200, 200));
        assert!(ed.is_typing());
        assert_eq!(ed.history().cursor(), 1);
        let ShapeKind::Text { ref text, .. } = ed.scene()[0].borrow().kind else {
            panic!("not a text");
        };
        assert_eq!(text, "h");
    }

    #[test]
    fn text_input_appends_while_typing_only() {
        let mut ed = editor();
        ed.text_input("ignored");
        assert!(ed.scene().is_empty());

        tap(&mut ed, Key::H, (200, 200));
        ed.text_input("i");
        let ShapeKind::Text { ref text, .. } = ed.scene()[0].borrow().kind else {
            panic!("not a text");
        };
        assert_eq!(text, "hi");
        assert_eq!(ed.history().cursor(), 1);
    }

    #[test]
    fn pointer_motion_exits_typing() {
        let mut ed = editor();
        tap(&mut ed, Key::H, (200, 200));
        assert!(ed.is_typing());
        ed.pointer_moved(201, 200);
        assert!(!ed.is_typing());
        ed.text_input("x");
        let ShapeKind::Text { ref text, .. } = ed.scene()[0].borrow().kind else {
            panic!("not a text");
        };
        assert_eq!(text, "h");
    }

    #[test]
    fn backspace_edits_the_live_text_without_committing() {
        let mut ed = editor();
        tap(&mut ed, Key::H, (200, 200));
        ed.text_input("ey");
        ed.key_pressed(Key::Backspace, false);
        ed.key_released(Key::Backspace, Modifiers::NONE);
        ed.end_frame();
        let ShapeKind::Text { ref text, .. } = ed.scene()[0].borrow().kind else {
            panic!("not a text");
        };
        assert_eq!(text, "he");
        assert_eq!(ed.history().cursor(), 1);
    }

    #[test]
    fn typing_enter_starts_the_next_row() {
        let mut ed = editor();
        tap(&mut ed, Key::H, (200, 200));
        ed.key_pressed(Key::Enter, false);
        ed.key_released(Key::Enter, Modifiers::NONE);
        ed.end_frame();

        assert_eq!(ed.scene().len(), 2);
        assert_eq!(ed.history().cursor(), 2);
        let first_y = ed.scene()[0].borrow().y();
        let ShapeKind::Text { x, y, ref text, .. } = ed.scene()[1].borrow().kind else {
            panic!("not a text");
        };
        assert_eq!(text, " ");
        assert_eq!(x, 200 - 15);
        assert_eq!(y, first_y + 100 - 48 + 10);
    }

    #[test]
    fn enter_outside_typing_restyles_without_committing() {
        let mut ed = editor();
        drag(&mut ed, Key::R, (0, 0), (50, 50));
        tap(&mut ed, Key::Num0, (50, 50));
        ed.key_pressed(Key::Enter, false);
        ed.key_released(Key::Enter, Modifiers::NONE);
        ed.end_frame();

        assert_eq!(ed.history().cursor(), 1);
        assert_eq!(ed.scene()[0].borrow().style.color, 0);
    }

    #[test]
    fn deleting_commits_once_and_sweeps_on_motion() {
        let mut ed = editor();
        drag(&mut ed, Key::R, (0, 0), (100, 50));
        drag(&mut ed, Key::R, (200, 200), (300, 250));
        assert_eq!(ed.history().cursor(), 2);

        ed.key_pressed(Key::D, false);
        ed.end_frame();
        assert!(ed.is_deleting());
        assert_eq!(ed.history().cursor(), 3);

        ed.pointer_moved(2, 25);
        assert_eq!(ed.scene().len(), 1);
        ed.key_released(Key::D, Modifiers::NONE);
        ed.end_frame();
        assert!(!ed.is_deleting());

        ed.key_pressed(Key::Z, false);
        ed.key_released(Key::Z, Modifiers::COMMAND);
        ed.end_frame();
        assert_eq!(ed.scene().len(), 2);
    }

    #[test]
    fn any_release_clears_deleting() {
        let mut ed = editor();
        ed.pointer_moved(400, 400);
        ed.key_pressed(Key::D, false);
        ed.end_frame();
        ed.pointer_moved(401, 400);
        ed.key_released(Key::X, Modifiers::NONE);
        ed.end_frame();
        assert!(!ed.is_deleting());
    }

    #[test]
    fn delete_clears_the_scene_into_a_new_revision() {
        let mut ed = editor();
        drag(&mut ed, Key::R, (0, 0), (100, 50));
        ed.key_pressed(Key::Delete, false);
        ed.key_released(Key::Delete, Modifiers::NONE);
        ed.end_frame();
        assert!(ed.scene().is_empty());
        assert_eq!(ed.history().cursor(), 2);

        ed.key_pressed(Key::Z, false);
        ed.key_released(Key::Z, Modifiers::COMMAND);
        ed.end_frame();
        assert_eq!(ed.scene().len(), 1);
    }

    #[test]
    fn undo_and_redo_leave_typing_mode() {
        let mut ed = editor();
        tap(&mut ed, Key::H, (200, 200));
        ed.key_pressed(Key::Z, false);
        ed.key_released(Key::Z, Modifiers::COMMAND);
        ed.end_frame();
        assert!(!ed.is_typing());
        assert!(ed.scene().is_empty());

        ed.key_pressed(Key::Y, false);
        ed.key_released(Key::Y, Modifiers::COMMAND);
        ed.end_frame();
        assert!(!ed.is_typing());
        assert_eq!(ed.scene().len(), 1);
    }

    #[test]
    fn digits_pick_palette_colors() {
        let mut ed = editor();
        assert_eq!(ed.style().color, 3);
        tap(&mut ed, Key::Num5, (0, 0));
        assert_eq!(ed.style().color, 5);
        assert!(!ed.is_typing());
    }

    #[test]
    fn digits_eight_and_nine_seed_text_instead() {
        let mut ed = editor();
        tap(&mut ed, Key::Num8, (100, 100));
        assert!(ed.is_typing());
        let ShapeKind::Text { ref text, .. } = ed.scene()[0].borrow().kind else {
            panic!("not a text");
        };
        assert_eq!(text, "8");
    }

    #[test]
    fn backtick_cycles_the_material() {
        let mut ed = editor();
        assert_eq!(ed.style().material, Material::Transparent);
        tap(&mut ed, Key::Backtick, (0, 0));
        assert_eq!(ed.style().material, Material::Translucent);
        tap(&mut ed, Key::Backtick, (0, 0));
        assert_eq!(ed.style().material, Material::Opaque);
        tap(&mut ed, Key::Backtick, (0, 0));
        assert_eq!(ed.style().material, Material::Transparent);
    }

    #[test]
    fn slot_keys_use_the_offset_binding() {
        let mut ed = editor();
        ed.key_pressed(Key::Num3, false);
        ed.key_released(Key::Num3, Modifiers::COMMAND);
        ed.end_frame();
        assert_eq!(ed.image_slot(), 0);

        ed.key_pressed(Key::Num1, false);
        ed.key_released(Key::Num1, Modifiers::COMMAND);
        ed.end_frame();
        assert_eq!(ed.image_slot(), -2);
    }

    #[test]
    fn image_drag_is_blocked_until_the_slot_is_published() {
        let mut ed = editor();
        drag(&mut ed, Key::I, (0, 0), (100, 100));
        assert!(ed.scene().is_empty());
        assert_eq!(ed.history().cursor(), 0);

        ed.image_published();
        ed.key_pressed(Key::Num3, false);
        ed.key_released(Key::Num3, Modifiers::COMMAND);
        ed.end_frame();
        drag(&mut ed, Key::I, (0, 0), (100, 100));
        assert_eq!(ed.scene().len(), 1);
        let ShapeKind::Image { slot, .. } = ed.scene()[0].borrow().kind else {
            panic!("not an image");
        };
        assert_eq!(slot, 0);
    }

    #[test]
    fn negative_slots_never_place() {
        let mut ed = editor();
        ed.image_published();
        ed.key_pressed(Key::Num1, false);
        ed.key_released(Key::Num1, Modifiers::COMMAND);
        ed.end_frame();
        drag(&mut ed, Key::I, (0, 0), (100, 100));
        assert!(ed.scene().is_empty());
    }

    #[test]
    fn paste_outside_typing_seeds_a_space() {
        let mut ed = editor();
        ed.pointer_moved(100, 100);
        ed.paste("hello");
        assert!(ed.is_typing());
        assert_eq!(ed.history().cursor(), 1);
        let ShapeKind::Text { ref text, .. } = ed.scene()[0].borrow().kind else {
            panic!("not a text");
        };
        assert_eq!(text, " hello");
    }

    #[test]
    fn paste_while_typing_appends_without_committing() {
        let mut ed = editor();
        tap(&mut ed, Key::H, (200, 200));
        ed.paste("op");
        assert_eq!(ed.history().cursor(), 1);
        let ShapeKind::Text { ref text, .. } = ed.scene()[0].borrow().kind else {
            panic!("not a text");
        };
        assert_eq!(text, "hop");
    }

    #[test]
    fn empty_paste_is_a_noop() {
        let mut ed = editor();
        ed.paste("");
        assert!(!ed.is_typing());
        assert!(ed.scene().is_empty());
        assert_eq!(ed.history().cursor(), 0);
    }

    #[test]
    fn preview_follows_the_held_key() {
        let mut ed = editor();
        ed.pointer_moved(10, 10);
        ed.key_pressed(Key::R, false);
        ed.end_frame();
        ed.pointer_moved(60, 40);
        let Some(shape) = ed.preview_shape() else {
            panic!("no preview");
        };
        assert_eq!(
            shape.kind,
            ShapeKind::Rect {
                x: 10,
                y: 10,
                w: 50,
                h: 30
            }
        );

        ed.key_released(Key::R, Modifiers::NONE);
        assert!(ed.preview_shape().is_none());
    }

    #[test]
    fn preview_image_respects_the_slot_guard() {
        let mut ed = editor();
        ed.pointer_moved(10, 10);
        ed.key_pressed(Key::I, false);
        ed.end_frame();
        ed.pointer_moved(60, 40);
        assert!(ed.preview_shape().is_none());
    }

    #[test]
    fn non_shape_keys_arm_no_visible_preview() {
        let mut ed = editor();
        ed.pointer_moved(10, 10);
        ed.key_pressed(Key::Z, false);
        ed.end_frame();
        ed.pointer_moved(60, 40);
        assert!(ed.preview_shape().is_none());
    }

    #[test]
    fn startup_image_placement_switches_material() {
        let mut ed = editor();
        ed.place_startup_image(640, 480);
        assert_eq!(ed.scene().len(), 1);
        assert_eq!(ed.history().cursor(), 1);
        assert_eq!(ed.image_count(), 1);
        assert_eq!(ed.style().material, Material::Translucent);

        let shape = ed.scene()[0].borrow();
        assert_eq!(
            shape.kind,
            ShapeKind::Image {
                x: 0,
                y: 0,
                w: 640,
                h: 480,
                slot: 0
            }
        );
        assert_eq!(shape.style.material, Material::Transparent);
    }

    #[test]
    fn anchor_is_captured_at_batch_end() {
        let mut ed = editor();
        ed.pointer_moved(10, 10);
        ed.key_pressed(Key::R, false);
        ed.pointer_moved(20, 20);
        ed.end_frame();
        ed.pointer_moved(70, 80);
        ed.key_released(Key::R, Modifiers::NONE);
        ed.end_frame();
        assert_eq!(
            ed.scene()[0].borrow().kind,
            ShapeKind::Rect {
                x: 20,
                y: 20,
                w: 50,
                h: 60
            }
        );
    }
}
