#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod editor;
pub mod history;
pub mod loader;
pub mod model;

pub use app::PaintApp;
pub use editor::Editor;
pub use history::{History, Scene, ShapeHandle};
pub use model::{Material, Shape, ShapeKind, Style};
