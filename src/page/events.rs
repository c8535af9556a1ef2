use crossterm::event::KeyEvent;

/// A point in CSS pixels, relative to the viewport
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Events the page delivers to registered listeners
#[derive(Debug, Clone, PartialEq)]
pub enum PageEvent {
    Resize,
    OrientationChange,
    VisibilityChange,
    KeyDown(KeyEvent),
    /// Element with this id was activated
    Click(String),
    TouchStart { target: String, point: Point },
    TouchMove(Point),
    TouchEnd,
    TouchCancel,
    ColorSchemeChange,
    ReducedMotionChange,
    /// The root element's class list changed
    RootClassMutation,
}

/// What a listener subscribes to
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListenerKind {
    Resize,
    OrientationChange,
    VisibilityChange,
    KeyDown,
    /// Clicks on one element
    Click(String),
    /// Touches that start on one element
    TouchStart(String),
    TouchMove,
    TouchEnd,
    TouchCancel,
    ColorSchemeChange,
    ReducedMotionChange,
    RootClassMutation,
}

impl PageEvent {
    /// The listener kind this event is delivered to
    pub fn kind(&self) -> ListenerKind {
        match self {
            PageEvent::Resize => ListenerKind::Resize,
            PageEvent::OrientationChange => ListenerKind::OrientationChange,
            PageEvent::VisibilityChange => ListenerKind::VisibilityChange,
            PageEvent::KeyDown(_) => ListenerKind::KeyDown,
            PageEvent::Click(id) => ListenerKind::Click(id.clone()),
            PageEvent::TouchStart { target, .. } => ListenerKind::TouchStart(target.clone()),
            PageEvent::TouchMove(_) => ListenerKind::TouchMove,
            PageEvent::TouchEnd => ListenerKind::TouchEnd,
            PageEvent::TouchCancel => ListenerKind::TouchCancel,
            PageEvent::ColorSchemeChange => ListenerKind::ColorSchemeChange,
            PageEvent::ReducedMotionChange => ListenerKind::ReducedMotionChange,
            PageEvent::RootClassMutation => ListenerKind::RootClassMutation,
        }
    }
}
