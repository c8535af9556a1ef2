//! Mounting the game on a page and the open/takeover/close cycle

pub mod config;
pub mod instance;
pub mod machine;

pub use config::{Labels, Locale, OverlayConfig};
pub use instance::SnakeOverlay;
pub use machine::{OverlayMachine, Phase};
