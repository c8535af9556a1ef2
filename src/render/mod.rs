pub mod renderer;
pub mod surface;
pub mod terminal;
pub mod theme;

pub use renderer::{Renderer, Scene};
pub use surface::{DisplayList, DrawCommand, Stroke, Surface};
pub use terminal::CanvasView;
pub use theme::{Palette, Rgba};
