use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::Mode;

/// Fixed constants of the snake simulation and its presentation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    /// Edge of one grid cell in canvas pixels
    pub cell_size: f64,
    /// Lower bound on columns regardless of canvas width
    pub min_cols: usize,
    /// Lower bound on rows regardless of canvas height
    pub min_rows: usize,
    /// Length of the snake after a reset
    pub initial_snake_length: usize,

    /// Tick duration while the autopilot drives
    pub autonomous_step_ms: u64,
    /// Tick duration while a player drives
    pub player_step_ms: u64,
    /// Upper bound on ticks executed in one animation frame
    pub max_steps_per_frame: u32,
    /// Frame deltas above this are treated as a pause and discarded
    pub max_frame_gap_ms: u64,

    /// Overlay fade-out before it is hidden
    pub close_fade_ms: u64,
    /// How long the control button stays forced visible after closing
    pub ctrl_reveal_ms: u64,

    /// Joystick base radius in pixels
    pub joystick_base_radius: f64,
    /// Joystick knob radius in pixels
    pub joystick_stick_radius: f64,
    /// Displacements shorter than this do not steer
    pub joystick_dead_zone: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cell_size: 24.0,
            min_cols: 10,
            min_rows: 8,
            initial_snake_length: 3,
            autonomous_step_ms: 100,
            player_step_ms: 200,
            max_steps_per_frame: 4,
            max_frame_gap_ms: 500,
            close_fade_ms: 300,
            ctrl_reveal_ms: 5000,
            joystick_base_radius: 56.0,
            joystick_stick_radius: 28.0,
            joystick_dead_zone: 10.0,
        }
    }
}

impl GameConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tick duration for the given control mode
    pub fn step_for(&self, mode: Mode) -> Duration {
        match mode {
            Mode::Autonomous => Duration::from_millis(self.autonomous_step_ms),
            Mode::Player => Duration::from_millis(self.player_step_ms),
        }
    }

    pub fn max_frame_gap(&self) -> Duration {
        Duration::from_millis(self.max_frame_gap_ms)
    }

    pub fn close_fade(&self) -> Duration {
        Duration::from_millis(self.close_fade_ms)
    }

    pub fn ctrl_reveal(&self) -> Duration {
        Duration::from_millis(self.ctrl_reveal_ms)
    }

    /// Grid dimensions for a canvas of the given CSS size
    pub fn grid_dimensions(&self, width: f64, height: f64) -> (usize, usize) {
        let cols = (width / self.cell_size).floor().max(0.0) as usize;
        let rows = (height / self.cell_size).floor().max(0.0) as usize;
        (cols.max(self.min_cols), rows.max(self.min_rows))
    }

    /// Check that every constant is usable
    pub fn validate(&self) -> Result<(), String> {
        if self.cell_size.is_nan() || self.cell_size <= 0.0 {
            return Err(format!("cell_size must be positive, got {}", self.cell_size));
        }

        if self.min_cols == 0 || self.min_rows == 0 {
            return Err("min_cols and min_rows must be at least 1".to_string());
        }

        if self.initial_snake_length == 0 {
            return Err("initial_snake_length must be at least 1".to_string());
        }

        // The starting snake is laid out leftwards from a third of the width.
        if self.initial_snake_length > self.min_cols / 3 + 1 {
            return Err(format!(
                "initial_snake_length ({}) does not fit in {} columns",
                self.initial_snake_length, self.min_cols
            ));
        }

        if self.autonomous_step_ms == 0 || self.player_step_ms == 0 {
            return Err("tick durations must be positive".to_string());
        }

        if self.max_steps_per_frame == 0 {
            return Err("max_steps_per_frame must be at least 1".to_string());
        }

        if self.joystick_stick_radius >= self.joystick_base_radius {
            return Err(format!(
                "joystick_stick_radius ({}) must be smaller than joystick_base_radius ({})",
                self.joystick_stick_radius, self.joystick_base_radius
            ));
        }

        if self.joystick_dead_zone < 0.0 {
            return Err("joystick_dead_zone must be non-negative".to_string());
        }

        Ok(())
    }
}
