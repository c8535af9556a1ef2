use std::time::Duration;

/// Turns animation-frame timestamps into whole game ticks
#[derive(Debug, Clone)]
pub struct SimulationClock {
    accumulator: Duration,
    previous: Option<Duration>,
    running: bool,
    max_steps_per_frame: u32,
    max_frame_gap: Duration,
}

impl SimulationClock {
    pub fn new(max_steps_per_frame: u32, max_frame_gap: Duration) -> Self {
        Self {
            accumulator: Duration::ZERO,
            previous: None,
            running: true,
            max_steps_per_frame,
            max_frame_gap,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Stop producing ticks until [`resume`](Self::resume)
    pub fn pause(&mut self) {
        self.running = false;
        self.clear();
    }

    /// Start again from a clean accumulator
    pub fn resume(&mut self) {
        self.running = true;
        self.clear();
    }

    /// Forget the previous timestamp and any banked time
    pub fn clear(&mut self) {
        self.previous = None;
        self.accumulator = Duration::ZERO;
    }

    /// Time banked towards the next tick
    pub fn accumulated(&self) -> Duration {
        self.accumulator
    }

    /// Number of ticks to run for a frame at `now`
    pub fn advance(&mut self, now: Duration, step: Duration) -> u32 {
        if !self.running {
            self.previous = Some(now);
            return 0;
        }

        let previous = *self.previous.get_or_insert(now);
        let mut delta = now.saturating_sub(previous);
        // A long gap (tab resume, suspend) counts as a pause
        if delta > self.max_frame_gap {
            delta = Duration::ZERO;
        }
        self.previous = Some(now);
        self.accumulator += delta;

        if step.is_zero() {
            return 0;
        }

        let due = (self.accumulator.as_nanos() / step.as_nanos()) as u32;
        let ticks = due.min(self.max_steps_per_frame);
        self.accumulator -= step * ticks;
        ticks
    }
}
