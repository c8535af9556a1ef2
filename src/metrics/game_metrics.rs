use std::time::{Duration, Instant};

use log::info;

use crate::game::{ResetReason, TickOutcome, TickReport};

/// Per-session statistics shown in the overlay HUD
pub struct SessionMetrics {
    pub start_time: Instant,
    pub elapsed_time: Duration,
    pub resets: u32,
    pub foods_eaten: u32,
    pub best_length: usize,
    pub last_reset: Option<ResetReason>,
}

impl SessionMetrics {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            elapsed_time: Duration::ZERO,
            resets: 0,
            foods_eaten: 0,
            best_length: 0,
            last_reset: None,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.start_time.elapsed();
    }

    /// Fold one tick into the totals. `before` and `after` are the snake
    /// lengths around the tick; a reset tick peaks at the pre-reset body.
    pub fn record(&mut self, report: &TickReport, before: usize, after: usize) {
        match report.outcome {
            TickOutcome::Moved => self.best_length = self.best_length.max(after),
            TickOutcome::Ate => {
                self.foods_eaten += 1;
                self.best_length = self.best_length.max(after);
            }
            TickOutcome::Reset(ResetReason::BoardFull) => {
                // The last food was eaten before the board was cleared
                self.foods_eaten += 1;
                self.on_reset(ResetReason::BoardFull, before + 1);
            }
            TickOutcome::Reset(reason) => self.on_reset(reason, before),
        }
    }

    /// Count a reset; `length` is the body length just before it
    pub fn on_reset(&mut self, reason: ResetReason, length: usize) {
        self.resets += 1;
        self.last_reset = Some(reason);
        self.best_length = self.best_length.max(length);
        info!(
            "game reset #{} ({reason:?}), best length {}, {} eaten",
            self.resets, self.best_length, self.foods_eaten
        );
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }
}

impl Default for SessionMetrics {
    fn default() -> Self {
        Self::new()
    }
}
