use crossterm::event::KeyEvent;

use super::handler::{InputHandler, KeyAction};
use crate::game::{Direction, GameState, Mode};

/// Result of feeding a key to the mediator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// A turn was queued for the next tick
    Queued(Direction),
    /// The key mapped to a turn that was refused
    Rejected,
    Restart,
    Close,
    Ignored,
}

/// Translates player input into at most one queued turn per tick
#[derive(Default)]
pub struct InputMediator {
    handler: InputHandler,
}

impl InputMediator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle a key press; nothing happens outside player mode
    pub fn handle_key(&self, mode: Mode, state: &mut GameState, key: KeyEvent) -> InputOutcome {
        if mode != Mode::Player {
            return InputOutcome::Ignored;
        }
        match self.handler.handle_key_event(key) {
            KeyAction::Steer(direction) => self.steer(mode, state, direction),
            KeyAction::Restart => InputOutcome::Restart,
            KeyAction::Close => InputOutcome::Close,
            KeyAction::None => InputOutcome::Ignored,
        }
    }

    /// Request a turn from any source (keys, joystick)
    pub fn steer(&self, mode: Mode, state: &mut GameState, direction: Direction) -> InputOutcome {
        if mode != Mode::Player {
            return InputOutcome::Ignored;
        }
        if queue_turn(state, direction) {
            InputOutcome::Queued(direction)
        } else {
            InputOutcome::Rejected
        }
    }
}

/// Queue `direction` for the next tick. Refuses reversals of a snake longer
/// than one segment, turns that change nothing, and a second turn before the
/// tick consumes the first.
pub fn queue_turn(state: &mut GameState, direction: Direction) -> bool {
    let heading = state.snake.direction;
    if state.snake.len() > 1 && direction.is_opposite(heading) {
        return false;
    }
    if direction == heading || direction == state.next_direction {
        return false;
    }
    if state.turn_queued {
        return false;
    }

    state.next_direction = direction;
    state.turn_queued = true;
    true
}
