use std::cell::RefCell;
use std::rc::Rc;

use crate::model::Shape;

pub type ShapeHandle = Rc<RefCell<Shape>>;

/// One revision of the canvas, back-to-front draw order. Revisions copy the
/// handle list only; the shape bodies behind the handles stay shared.
pub type Scene = Vec<ShapeHandle>;

pub fn handle(shape: Shape) -> ShapeHandle {
    Rc::new(RefCell::new(shape))
}

pub const SLOTS: usize = 100;

/// Bounded linear undo chain. `current` is the scene being displayed and
/// edited, `newest` the most recent live revision; `current <= newest < SLOTS`
/// always holds.
pub struct History {
    slots: Vec<Scene>,
    current: usize,
    newest: usize,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self {
            slots: vec![Scene::new(); SLOTS],
            current: 0,
            newest: 0,
        }
    }

    pub fn current(&self) -> &Scene {
        &self.slots[self.current]
    }

    pub fn current_mut(&mut self) -> &mut Scene {
        &mut self.slots[self.current]
    }

    pub fn cursor(&self) -> usize {
        self.current
    }

    pub fn newest(&self) -> usize {
        self.newest
    }

    /// Duplicates the current scene into the next slot and steps both cursors
    /// onto it. Any redo frontier past the cursor is discarded first. When the
    /// chain has grown to the last slot, the newer half shifts down over the
    /// older half, keeping the 50 most recent revisions.
    pub fn commit(&mut self) {
        if self.current == SLOTS - 1 {
            for i in 0..SLOTS / 2 {
                self.slots[i] = std::mem::take(&mut self.slots[i + SLOTS / 2]);
            }
            self.current -= SLOTS / 2;
            self.newest -= SLOTS / 2;
        }

        if self.current < self.newest {
            for slot in &mut self.slots[self.current + 1..=self.newest] {
                slot.clear();
            }
            self.newest = self.current;
        }

        let copy = self.slots[self.current].clone();
        self.slots[self.current + 1] = copy;
        self.current += 1;
        self.newest += 1;
    }

    pub fn undo(&mut self) {
        if self.current > 0 {
            self.current -= 1;
        }
    }

    pub fn redo(&mut self) {
        if self.current < self.newest {
            self.current += 1;
        }
    }
}
