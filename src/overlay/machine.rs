use std::time::Duration;

use crate::game::Mode;

/// Where the overlay is in its open/close cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Closed,
    /// Shown but still transparent; settles on the next frame
    Opening,
    Open(Mode),
    /// Fading out until the deadline
    Closing { until: Duration },
}

/// Transition produced by [`OverlayMachine::settle`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settled {
    Opened,
    Closed,
}

#[derive(Debug, Clone, Default)]
pub struct OverlayMachine {
    phase: Phase,
}

impl OverlayMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Who steers the snake. Everything but an open player session is
    /// autonomous.
    pub fn mode(&self) -> Mode {
        match self.phase {
            Phase::Open(mode) => mode,
            _ => Mode::Autonomous,
        }
    }

    /// Overlay element is not hidden
    pub fn is_visible(&self) -> bool {
        self.phase != Phase::Closed
    }

    pub fn open(&mut self) -> bool {
        if self.phase != Phase::Closed {
            return false;
        }
        self.phase = Phase::Opening;
        true
    }

    /// Player control is only reachable from the autonomous open state
    pub fn take_over(&mut self) -> bool {
        if self.phase != Phase::Open(Mode::Autonomous) {
            return false;
        }
        self.phase = Phase::Open(Mode::Player);
        true
    }

    pub fn close(&mut self, now: Duration, fade: Duration) -> bool {
        match self.phase {
            Phase::Opening | Phase::Open(_) => {
                self.phase = Phase::Closing { until: now + fade };
                true
            }
            Phase::Closed | Phase::Closing { .. } => false,
        }
    }

    /// Finish pending transitions at frame time `now`
    pub fn settle(&mut self, now: Duration) -> Option<Settled> {
        match self.phase {
            Phase::Opening => {
                self.phase = Phase::Open(Mode::Autonomous);
                Some(Settled::Opened)
            }
            Phase::Closing { until } if now >= until => {
                self.phase = Phase::Closed;
                Some(Settled::Closed)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FADE: Duration = Duration::from_millis(300);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn test_full_cycle() {
        let mut m = OverlayMachine::new();
        assert!(!m.is_visible());

        assert!(m.open());
        assert_eq!(m.phase(), Phase::Opening);
        assert!(m.is_visible());
        assert_eq!(m.settle(ms(16)), Some(Settled::Opened));
        assert_eq!(m.mode(), Mode::Autonomous);

        assert!(m.take_over());
        assert_eq!(m.mode(), Mode::Player);

        assert!(m.close(ms(1000), FADE));
        assert_eq!(m.mode(), Mode::Autonomous);
        assert!(m.is_visible());
        assert_eq!(m.settle(ms(1200)), None);
        assert_eq!(m.settle(ms(1300)), Some(Settled::Closed));
        assert_eq!(m.phase(), Phase::Closed);
    }

    #[test]
    fn test_takeover_requires_open_autonomous() {
        let mut m = OverlayMachine::new();
        assert!(!m.take_over());
        m.open();
        assert!(!m.take_over());
        m.settle(ms(0));
        assert!(m.take_over());
        assert!(!m.take_over());
    }

    #[test]
    fn test_open_ignored_unless_closed() {
        let mut m = OverlayMachine::new();
        m.open();
        assert!(!m.open());
        m.close(ms(0), FADE);
        assert!(!m.open());
        assert!(!m.close(ms(10), FADE));
    }

    #[test]
    fn test_close_while_opening() {
        let mut m = OverlayMachine::new();
        m.open();
        assert!(m.close(ms(5), FADE));
        assert_eq!(m.phase(), Phase::Closing { until: ms(305) });
    }
}
