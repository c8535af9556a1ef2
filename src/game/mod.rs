//! Core game logic module for Snake
//!
//! This module contains all the game logic without any I/O or rendering dependencies:
//! the occupancy grid, the time-aware pathfinder, the autopilot, the fixed-step clock
//! and the engine tick that ties them together.

pub mod action;
pub mod clock;
pub mod config;
pub mod engine;
pub mod grid;
pub mod pathfinder;
pub mod planner;
pub mod state;

// Re-export commonly used types
pub use action::Direction;
pub use clock::SimulationClock;
pub use config::GameConfig;
pub use engine::{GameEngine, ResetReason, TickOutcome, TickReport};
pub use grid::Grid;
pub use pathfinder::Pathfinder;
pub use planner::{Autopilot, Decision, Strategy};
pub use state::{GameState, Mode, Position, Snake};
