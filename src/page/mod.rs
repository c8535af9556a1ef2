//! The page the game is embedded in

pub mod document;
pub mod events;
pub mod ids;
pub mod styles;

pub use document::{Document, Element, ListenerId, Media, Rect, StyleTag};
pub use events::{ListenerKind, PageEvent, Point};
pub use ids::{class, ElementIds};
pub use styles::GameStyles;
