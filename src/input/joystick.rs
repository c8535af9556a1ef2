use crate::game::{Direction, GameConfig};
use crate::page::Point;

/// Stick transform when released
pub const CENTERED_TRANSFORM: &str = "translate(-50%, -50%)";

/// On-screen joystick for touch devices. Tracks one touch that started on
/// the base and turns its offset into a direction.
#[derive(Debug, Clone)]
pub struct Joystick {
    base_radius: f64,
    stick_radius: f64,
    dead_zone: f64,
    center: Option<Point>,
}

/// Where to draw the stick and which way it points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StickUpdate {
    pub offset: (f64, f64),
    pub direction: Option<Direction>,
}

impl StickUpdate {
    /// CSS transform for the stick element
    pub fn transform(&self) -> String {
        stick_transform(self.offset)
    }
}

impl Joystick {
    pub fn new(config: &GameConfig) -> Self {
        Self {
            base_radius: config.joystick_base_radius,
            stick_radius: config.joystick_stick_radius,
            dead_zone: config.joystick_dead_zone,
            center: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.center.is_some()
    }

    /// Touch landed on the base centred at `center`
    pub fn start(&mut self, center: Point, touch: Point) -> StickUpdate {
        self.center = Some(center);
        self.update(center, touch)
    }

    /// Touch moved; `None` unless a touch is being tracked
    pub fn drag(&mut self, touch: Point) -> Option<StickUpdate> {
        let center = self.center?;
        Some(self.update(center, touch))
    }

    /// Touch ended or was cancelled
    pub fn release(&mut self) {
        self.center = None;
    }

    fn update(&self, center: Point, touch: Point) -> StickUpdate {
        let dx = touch.x - center.x;
        let dy = touch.y - center.y;
        StickUpdate {
            offset: clamp_offset(dx, dy, self.base_radius - self.stick_radius),
            direction: direction_for(dx, dy, self.dead_zone),
        }
    }
}

/// Limit the stick offset to a circle of radius `max`
pub fn clamp_offset(dx: f64, dy: f64, max: f64) -> (f64, f64) {
    let dist = dx.hypot(dy);
    if dist <= max || dist == 0.0 {
        return (dx, dy);
    }
    (dx / dist * max, dy / dist * max)
}

/// Map a screen-space offset (y grows downward) to the 90° band it falls in
pub fn direction_for(dx: f64, dy: f64, dead_zone: f64) -> Option<Direction> {
    if dx.hypot(dy) < dead_zone {
        return None;
    }
    let deg = dy.atan2(dx).to_degrees();
    let direction = if deg > -45.0 && deg <= 45.0 {
        Direction::Right
    } else if deg > 45.0 && deg <= 135.0 {
        Direction::Down
    } else if deg > -135.0 && deg <= -45.0 {
        Direction::Up
    } else {
        Direction::Left
    };
    Some(direction)
}

pub fn stick_transform((x, y): (f64, f64)) -> String {
    format!("translate(calc(-50% + {x}px), calc(-50% + {y}px))")
}
