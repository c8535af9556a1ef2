//! Player input: key mapping, turn queueing and the touch joystick

pub mod handler;
pub mod joystick;
pub mod mediator;

pub use handler::{InputHandler, KeyAction};
pub use joystick::{Joystick, StickUpdate};
pub use mediator::{queue_turn, InputMediator, InputOutcome};
