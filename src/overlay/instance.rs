use std::time::Duration;

use log::{debug, info, warn};

use super::config::OverlayConfig;
use super::machine::{OverlayMachine, Phase, Settled};
use crate::game::{GameEngine, GameState, Mode, Position, ResetReason, SimulationClock};
use crate::input::{joystick::CENTERED_TRANSFORM, InputMediator, InputOutcome, Joystick, StickUpdate};
use crate::metrics::SessionMetrics;
use crate::page::{class, Document, GameStyles, ListenerId, ListenerKind, PageEvent};
use crate::render::{DisplayList, Palette, Renderer, Scene};

/// Body attribute marking a document that already hosts the game
pub const MOUNT_MARKER: &str = "data-snake-mounted";

/// The game mounted on a page: an ambient autopilot on the background
/// canvas and an overlay that a visitor can open and take over.
pub struct SnakeOverlay {
    config: OverlayConfig,
    styles: GameStyles,
    engine: GameEngine,
    state: GameState,
    clock: SimulationClock,
    machine: OverlayMachine,
    input: InputMediator,
    joystick: Joystick,
    renderer: Renderer,
    background: DisplayList,
    play: DisplayList,
    plan: Vec<Position>,
    metrics: SessionMetrics,
    listeners: Vec<ListenerId>,
    reduced_motion: bool,
    scheduled: bool,
    saved_overflow: Option<String>,
    ctrl_override_until: Option<Duration>,
}

impl SnakeOverlay {
    /// Mount on `doc`. Returns `None`, leaving the page untouched, when a
    /// required element is missing or the page already hosts a game.
    pub fn create(config: OverlayConfig, doc: &mut Document, seed: Option<u64>) -> Option<Self> {
        if let Err(e) = config.validate() {
            warn!("snake disabled: {e}");
            return None;
        }
        if doc.body().attribute(MOUNT_MARKER).is_some() {
            debug!("snake already mounted, skipping");
            return None;
        }
        if let Some(missing) = config.ids.required().into_iter().find(|id| !doc.has_element(id)) {
            warn!("snake disabled: element #{missing} not found");
            return None;
        }

        let styles = GameStyles::new(config.ids.clone());
        styles.inject(doc);
        doc.body_mut().set_attribute(MOUNT_MARKER, "1");

        let game = config.game.clone();
        let mut engine = match seed {
            Some(seed) => GameEngine::with_seed(game.clone(), seed),
            None => GameEngine::new(game.clone()),
        };
        let (width, height) = canvas_size(doc, &config.ids.bg_canvas);
        let (cols, rows) = game.grid_dimensions(width, height);
        let state = engine.reset(cols, rows);

        let mut overlay = Self {
            styles,
            engine,
            state,
            clock: SimulationClock::new(game.max_steps_per_frame, game.max_frame_gap()),
            machine: OverlayMachine::new(),
            input: InputMediator::new(),
            joystick: Joystick::new(&game),
            renderer: Renderer::new(game.cell_size),
            background: DisplayList::new(),
            play: DisplayList::new(),
            plan: Vec::new(),
            metrics: SessionMetrics::new(),
            listeners: Vec::new(),
            reduced_motion: doc.media().reduced_motion,
            scheduled: false,
            saved_overflow: None,
            ctrl_override_until: None,
            config,
        };
        overlay.apply_labels(doc);
        overlay.resize_all(doc);
        overlay.draw_all(doc);
        info!("snake mounted on a {cols}x{rows} board");
        Some(overlay)
    }

    /// Register page listeners and begin animating
    pub fn start(&mut self, doc: &mut Document) {
        let ids = &self.config.ids;
        let mut kinds = vec![
            ListenerKind::Resize,
            ListenerKind::OrientationChange,
            ListenerKind::VisibilityChange,
            ListenerKind::KeyDown,
            ListenerKind::Click(ids.ctrl.clone()),
            ListenerKind::Click(ids.exit.clone()),
            ListenerKind::Click(ids.takeover.clone()),
            ListenerKind::TouchMove,
            ListenerKind::TouchEnd,
            ListenerKind::TouchCancel,
            ListenerKind::ColorSchemeChange,
            ListenerKind::ReducedMotionChange,
            ListenerKind::RootClassMutation,
        ];
        if doc.has_element(&ids.joy_base) {
            kinds.push(ListenerKind::TouchStart(ids.joy_base.clone()));
        }
        self.listeners = kinds.into_iter().map(|k| doc.add_listener(k)).collect();

        if doc.is_hidden() {
            self.clock.pause();
        }
        self.scheduled = !self.reduced_motion;
        debug!(
            "snake started with {} listeners, animating: {}",
            self.listeners.len(),
            self.scheduled
        );
    }

    /// Remove every listener and release the page
    pub fn dispose(mut self, doc: &mut Document) {
        let removed = self
            .listeners
            .drain(..)
            .filter(|&id| doc.remove_listener(id))
            .count();
        doc.body_mut().remove_attribute(MOUNT_MARKER);
        info!("snake disposed, {removed} listeners removed");
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.machine.phase()
    }

    pub fn mode(&self) -> Mode {
        self.machine.mode()
    }

    /// Plan returned by the most recent tick
    pub fn plan(&self) -> &[Position] {
        &self.plan
    }

    pub fn background(&self) -> &DisplayList {
        &self.background
    }

    pub fn play(&self) -> &DisplayList {
        &self.play
    }

    pub fn metrics(&self) -> &SessionMetrics {
        &self.metrics
    }

    pub fn metrics_mut(&mut self) -> &mut SessionMetrics {
        &mut self.metrics
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }

    pub fn is_ctrl_forced_visible(&self) -> bool {
        self.ctrl_override_until.is_some()
    }

    /// Style rules as the page would apply them
    pub fn is_displayed(&self, doc: &Document, id: &str) -> bool {
        self.styles.is_displayed(doc, id)
    }

    /// Deliver every queued page event
    pub fn pump(&mut self, doc: &mut Document, now: Duration) {
        loop {
            let events = doc.drain_events();
            if events.is_empty() {
                break;
            }
            for event in events {
                self.handle_event(doc, event, now);
            }
        }
    }

    pub fn handle_event(&mut self, doc: &mut Document, event: PageEvent, now: Duration) {
        match event {
            PageEvent::Resize => {
                self.resize_all(doc);
                self.draw_all(doc);
            }
            PageEvent::OrientationChange => {
                if self.machine.is_visible() {
                    self.resize_play(doc);
                }
                self.draw_all(doc);
            }
            PageEvent::VisibilityChange => {
                if doc.is_hidden() {
                    self.clock.pause();
                    debug!("page hidden, pausing");
                } else {
                    self.clock.resume();
                    debug!("page visible, resuming");
                }
            }
            PageEvent::KeyDown(key) => {
                let mode = self.mode();
                match self.input.handle_key(mode, &mut self.state, key) {
                    InputOutcome::Close => {
                        self.close(doc, now);
                    }
                    InputOutcome::Restart => self.restart(doc),
                    InputOutcome::Queued(_) | InputOutcome::Rejected | InputOutcome::Ignored => {}
                }
            }
            PageEvent::Click(id) => {
                let ids = &self.config.ids;
                let (ctrl, exit, takeover) = (id == ids.ctrl, id == ids.exit, id == ids.takeover);
                if ctrl {
                    self.open(doc);
                } else if exit {
                    self.close(doc, now);
                } else if takeover {
                    self.take_control(doc);
                }
            }
            PageEvent::TouchStart { point, .. } => {
                if self.mode() != Mode::Player {
                    return;
                }
                let Some(base) = doc.element(&self.config.ids.joy_base) else {
                    return;
                };
                let update = self.joystick.start(base.rect.center(), point);
                self.apply_stick(doc, update);
            }
            PageEvent::TouchMove(point) => {
                if let Some(update) = self.joystick.drag(point) {
                    self.apply_stick(doc, update);
                }
            }
            PageEvent::TouchEnd | PageEvent::TouchCancel => self.release_stick(doc),
            PageEvent::ColorSchemeChange | PageEvent::RootClassMutation => self.draw_all(doc),
            PageEvent::ReducedMotionChange => {
                self.reduced_motion = doc.media().reduced_motion;
                self.scheduled = !self.reduced_motion;
                self.clock.clear();
                self.draw_all(doc);
            }
        }
    }

    /// One animation frame at time `now`; returns whether anything was drawn
    pub fn frame(&mut self, doc: &mut Document, now: Duration) -> bool {
        let mut redraw = false;
        match self.machine.settle(now) {
            Some(Settled::Opened) => {
                self.finish_open(doc);
                redraw = true;
            }
            Some(Settled::Closed) => {
                doc.with_element(&self.config.ids.overlay, |o| o.add_class(class::HIDDEN));
                debug!("overlay closed");
            }
            None => {}
        }
        if self.ctrl_override_until.is_some_and(|until| now >= until) {
            self.ctrl_override_until = None;
        }

        if self.scheduled && self.clock.is_running() {
            let mode = self.mode();
            let ticks = self.clock.advance(now, self.config.game.step_for(mode));
            for _ in 0..ticks {
                let before = self.state.snake.len();
                let report = self.engine.tick(&mut self.state, mode);
                self.metrics.record(&report, before, self.state.snake.len());
                self.plan = report.plan;
            }
            redraw = true;
        }

        if redraw {
            self.draw_all(doc);
        }
        redraw
    }

    /// Show the overlay with the autopilot still driving
    pub fn open(&mut self, doc: &mut Document) -> bool {
        if !self.machine.open() {
            return false;
        }
        info!("overlay opening");
        let ids = self.config.ids.clone();

        doc.with_element(&ids.overlay, |o| {
            o.remove_class(class::HIDDEN);
            o.add_class(class::OPACITY_0);
            o.remove_class(class::PLAYER_MODE);
        });
        let body = doc.body_mut();
        self.saved_overflow = Some(body.style("overflow").unwrap_or_default().to_string());
        body.set_style("overflow", "hidden");
        body.add_class(class::GAME_OPEN);

        doc.with_element(&ids.ctrl, |c| {
            c.add_class(class::OPACITY_0);
            c.add_class(class::TRANSLATE_Y_2);
            c.add_class(class::HIDDEN);
        });
        self.ctrl_override_until = None;
        self.state.reset_turn_queue();

        doc.with_element(&ids.layer, |l| l.add_class(class::GAME_PLAY));
        doc.with_element(&ids.page_shell, |p| {
            p.add_class(class::PAGE_HIDDEN);
            p.set_attribute("inert", "");
        });
        self.set_page_hidden(doc, true);
        self.draw_all(doc);
        true
    }

    /// Runs on the first frame after [`open`](Self::open)
    fn finish_open(&mut self, doc: &mut Document) {
        let ids = self.config.ids.clone();
        doc.with_element(&ids.overlay, |o| {
            o.remove_class(class::OPACITY_0);
            o.set_attribute("aria-modal", "true");
        });
        self.resize_all(doc);
        self.resize_play(doc);
        doc.focus(&ids.takeover);
        debug!("overlay open");
    }

    /// Hand the snake to the visitor
    pub fn take_control(&mut self, doc: &mut Document) -> bool {
        if !self.machine.take_over() {
            return false;
        }
        self.state.reset_turn_queue();
        let ids = &self.config.ids;
        doc.with_element(&ids.overlay, |o| o.add_class(class::PLAYER_MODE));
        doc.focus(&ids.exit);
        info!("player took control");
        true
    }

    /// Fade the overlay out and give the page back
    pub fn close(&mut self, doc: &mut Document, now: Duration) -> bool {
        if !self.machine.close(now, self.config.game.close_fade()) {
            return false;
        }
        info!("overlay closing");
        let ids = self.config.ids.clone();

        doc.with_element(&ids.overlay, |o| {
            o.add_class(class::OPACITY_0);
            o.remove_class(class::PLAYER_MODE);
        });
        let overflow = self.saved_overflow.take().unwrap_or_default();
        let body = doc.body_mut();
        body.set_style("overflow", overflow);
        body.remove_class(class::GAME_OPEN);

        doc.with_element(&ids.ctrl, |c| c.set_attribute("aria-pressed", "false"));
        doc.with_element(&ids.layer, |l| l.remove_class(class::GAME_PLAY));
        doc.with_element(&ids.page_shell, |p| {
            p.remove_class(class::PAGE_HIDDEN);
            p.remove_attribute("inert");
        });
        self.set_page_hidden(doc, false);
        self.release_stick(doc);
        self.state.reset_turn_queue();

        self.draw_all(doc);
        doc.focus(&ids.ctrl);
        self.force_show_ctrl(doc, now);
        true
    }

    fn restart(&mut self, doc: &mut Document) {
        let length = self.state.snake.len();
        self.engine.restart(&mut self.state, ResetReason::Restart);
        self.metrics.on_reset(ResetReason::Restart, length);
        self.plan.clear();
        self.draw_all(doc);
    }

    /// Reveal the control button for a while, whatever the page scroll says
    fn force_show_ctrl(&mut self, doc: &mut Document, now: Duration) {
        doc.with_element(&self.config.ids.ctrl, |c| {
            c.remove_class(class::HIDDEN);
            c.remove_class(class::OPACITY_0);
            c.remove_class(class::TRANSLATE_Y_2);
        });
        self.ctrl_override_until = Some(now + self.config.game.ctrl_reveal());
    }

    /// Hide or restore every body child outside the keep list
    fn set_page_hidden(&self, doc: &mut Document, hidden: bool) {
        let keep = self.config.ids.keep_visible();
        let targets: Vec<String> = doc
            .body_children()
            .iter()
            .filter(|id| !keep.contains(&id.as_str()))
            .cloned()
            .collect();
        for id in targets {
            doc.with_element(&id, |el| {
                if hidden {
                    el.add_class(class::PAGE_HIDDEN);
                    el.set_attribute("inert", "");
                } else {
                    el.remove_class(class::PAGE_HIDDEN);
                    el.remove_attribute("inert");
                }
            });
        }
    }

    fn apply_stick(&mut self, doc: &mut Document, update: StickUpdate) {
        doc.with_element(&self.config.ids.joy_stick, |s| {
            s.set_style("transform", update.transform())
        });
        if let Some(direction) = update.direction {
            let mode = self.mode();
            self.input.steer(mode, &mut self.state, direction);
        }
    }

    fn release_stick(&mut self, doc: &mut Document) {
        self.joystick.release();
        doc.with_element(&self.config.ids.joy_stick, |s| {
            s.set_style("transform", CENTERED_TRANSFORM)
        });
    }

    fn apply_labels(&self, doc: &mut Document) {
        let ids = &self.config.ids;
        let labels = &self.config.labels;
        for (id, label) in [
            (&ids.ctrl, &labels.ctrl),
            (&ids.exit, &labels.exit),
            (&ids.takeover, &labels.takeover),
        ] {
            doc.with_element(id, |el| {
                el.set_attribute("title", label.as_str());
                el.set_attribute("aria-label", label.as_str());
            });
        }
        doc.with_element(&ids.ctrl, |c| c.set_attribute("aria-pressed", "false"));
        doc.with_element(&ids.takeover, |t| t.text = labels.takeover.clone());
    }

    fn resize_all(&mut self, doc: &Document) {
        let (width, height) = canvas_size(doc, &self.config.ids.bg_canvas);
        self.background.resize(width, height, pixel_ratio(doc));

        let (cols, rows) = self.config.game.grid_dimensions(width, height);
        if (cols, rows) != (self.state.cols(), self.state.rows()) {
            debug!(
                "board {}x{} -> {cols}x{rows}",
                self.state.cols(),
                self.state.rows()
            );
            self.engine.resize(&mut self.state, cols, rows);
            self.plan.clear();
        }

        if self.machine.is_visible() {
            self.resize_play(doc);
        }
    }

    /// The play canvas mirrors the background canvas size
    fn resize_play(&mut self, doc: &Document) {
        let (width, height) = canvas_size(doc, &self.config.ids.bg_canvas);
        self.play.resize(width, height, pixel_ratio(doc));
    }

    fn draw_all(&mut self, doc: &Document) {
        let palette = Palette::resolve(doc);
        let scene = Scene {
            state: &self.state,
            plan: &self.plan,
            mode: self.machine.mode(),
            palette: &palette,
        };
        self.renderer.render(&mut self.background, &scene);
        if self.machine.is_visible() {
            self.renderer.render(&mut self.play, &scene);
        }
    }
}

fn canvas_size(doc: &Document, id: &str) -> (f64, f64) {
    doc.element(id)
        .map(|el| (el.client_width(), el.client_height()))
        .unwrap_or_default()
}

/// Whole device pixels per CSS pixel, at least one
fn pixel_ratio(doc: &Document) -> f64 {
    doc.media().device_pixel_ratio.floor().max(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Element, ElementIds, Point, Rect};
    use crate::render::DrawCommand;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    fn page() -> Document {
        let ids = ElementIds::default();
        let mut doc = Document::new();
        doc.append_child(Element::new("site-header"));
        doc.append_child(Element::new(&ids.page_shell));
        doc.append_child(Element::new(&ids.background_root));
        doc.append_child(Element::new(&ids.layer));
        doc.append_child(Element::new(&ids.ctrl));
        doc.append_child(Element::new(&ids.overlay).with_class(class::HIDDEN));
        doc.append_child(Element::new("site-footer"));

        let mut bg = Element::new(&ids.bg_canvas).with_parent(&ids.layer);
        bg.rect = Rect::new(0.0, 0.0, 480.0, 384.0);
        doc.insert(bg);
        doc.insert(Element::new(&ids.play_canvas).with_parent(&ids.overlay));
        doc.insert(Element::new(&ids.exit).with_parent(&ids.overlay));
        doc.insert(Element::new(&ids.takeover).with_parent(&ids.overlay));
        doc.insert(Element::new(&ids.joy).with_parent(&ids.overlay));
        let mut base = Element::new(&ids.joy_base).with_parent(&ids.joy);
        base.rect = Rect::new(20.0, 300.0, 112.0, 112.0);
        doc.insert(base);
        doc.insert(Element::new(&ids.joy_stick).with_parent(&ids.joy_base));
        doc
    }

    fn mounted() -> (Document, SnakeOverlay) {
        let mut doc = page();
        let mut overlay = SnakeOverlay::create(OverlayConfig::default(), &mut doc, Some(7)).unwrap();
        overlay.start(&mut doc);
        (doc, overlay)
    }

    fn key(code: KeyCode) -> PageEvent {
        PageEvent::KeyDown(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn opened() -> (Document, SnakeOverlay) {
        let (mut doc, mut overlay) = mounted();
        doc.dispatch(PageEvent::Click("snake-ctrl".into()));
        overlay.pump(&mut doc, ms(0));
        overlay.frame(&mut doc, ms(16));
        (doc, overlay)
    }

    #[test]
    fn test_missing_element_aborts_silently() {
        let mut doc = page();
        doc.remove("snake-exit");
        assert!(SnakeOverlay::create(OverlayConfig::default(), &mut doc, None).is_none());
        assert!(doc.head_styles().is_empty());
        assert_eq!(doc.body().attribute(MOUNT_MARKER), None);
    }

    #[test]
    fn test_missing_takeover_aborts() {
        let mut doc = page();
        doc.remove("snake-takeover");
        assert!(SnakeOverlay::create(OverlayConfig::default(), &mut doc, None).is_none());
        assert_eq!(doc.listener_count(), 0);
    }

    #[test]
    fn test_double_mount_guard() {
        let (mut doc, overlay) = mounted();
        assert!(SnakeOverlay::create(OverlayConfig::default(), &mut doc, None).is_none());

        overlay.dispose(&mut doc);
        assert_eq!(doc.listener_count(), 0);
        let again = SnakeOverlay::create(OverlayConfig::default(), &mut doc, None);
        assert!(again.is_some());
        // Style tag is not duplicated
        assert_eq!(doc.head_styles().len(), 1);
    }

    #[test]
    fn test_create_sizes_board_and_draws() {
        let (doc, overlay) = mounted();
        assert_eq!((overlay.state().cols(), overlay.state().rows()), (20, 16));
        assert_eq!(overlay.state().snake.len(), 3);
        assert!(!overlay.background().commands().is_empty());
        assert!(overlay.play().commands().is_empty());
        assert_eq!(
            doc.element("snake-ctrl").unwrap().attribute("aria-label"),
            Some("Tomar control del juego")
        );
        assert!(doc.listener_count() > 0);
        assert!(overlay.is_scheduled());
    }

    #[test]
    fn test_open_hides_page_and_settles_next_frame() {
        let (mut doc, mut overlay) = mounted();
        doc.dispatch(PageEvent::Click("snake-ctrl".into()));
        overlay.pump(&mut doc, ms(0));

        assert_eq!(overlay.phase(), Phase::Opening);
        assert!(doc.body().has_class(class::GAME_OPEN));
        assert_eq!(doc.body().style("overflow"), Some("hidden"));
        assert!(!overlay.is_displayed(&doc, "snake-ctrl"));
        for hidden in ["site-header", "site-footer", "page-shell"] {
            let el = doc.element(hidden).unwrap();
            assert!(el.has_class(class::PAGE_HIDDEN), "{hidden}");
            assert_eq!(el.attribute("inert"), Some(""));
        }
        for kept in ["snake-overlay", "snake-ctrl", "snake-layer", "background-root"] {
            assert!(!doc.element(kept).unwrap().has_class(class::PAGE_HIDDEN), "{kept}");
        }
        assert!(doc.element("snake-layer").unwrap().has_class(class::GAME_PLAY));

        overlay.frame(&mut doc, ms(16));
        assert_eq!(overlay.phase(), Phase::Open(Mode::Autonomous));
        let el = doc.element("snake-overlay").unwrap();
        assert!(!el.has_class(class::OPACITY_0));
        assert_eq!(el.attribute("aria-modal"), Some("true"));
        assert_eq!(doc.focused(), Some("snake-takeover"));
        assert!(!overlay.play().commands().is_empty());
    }

    #[test]
    fn test_keys_inert_until_takeover() {
        let (mut doc, mut overlay) = opened();
        doc.dispatch(key(KeyCode::Esc));
        doc.dispatch(key(KeyCode::Up));
        overlay.pump(&mut doc, ms(20));
        assert_eq!(overlay.phase(), Phase::Open(Mode::Autonomous));
        assert!(!overlay.state().turn_queued);
    }

    #[test]
    fn test_takeover_then_steer_and_escape() {
        let (mut doc, mut overlay) = opened();
        doc.dispatch(PageEvent::Click("snake-takeover".into()));
        overlay.pump(&mut doc, ms(20));

        assert_eq!(overlay.mode(), Mode::Player);
        assert!(doc.element("snake-overlay").unwrap().has_class(class::PLAYER_MODE));
        assert!(!overlay.is_displayed(&doc, "snake-takeover"));
        assert_eq!(doc.focused(), Some("snake-exit"));

        doc.dispatch(key(KeyCode::Up));
        overlay.pump(&mut doc, ms(30));
        assert!(overlay.state().turn_queued);

        doc.dispatch(key(KeyCode::Esc));
        overlay.pump(&mut doc, ms(40));
        assert!(matches!(overlay.phase(), Phase::Closing { .. }));
        assert_eq!(overlay.mode(), Mode::Autonomous);
        assert!(!overlay.state().turn_queued);
    }

    #[test]
    fn test_close_restores_page_after_fade() {
        let (mut doc, mut overlay) = opened();
        doc.dispatch(PageEvent::Click("snake-exit".into()));
        overlay.pump(&mut doc, ms(100));

        assert!(!doc.body().has_class(class::GAME_OPEN));
        assert_eq!(doc.body().style("overflow"), None);
        assert!(!doc.element("site-header").unwrap().has_class(class::PAGE_HIDDEN));
        assert_eq!(doc.element("page-shell").unwrap().attribute("inert"), None);
        assert_eq!(
            doc.element("snake-ctrl").unwrap().attribute("aria-pressed"),
            Some("false")
        );
        assert!(overlay.is_displayed(&doc, "snake-ctrl"));
        assert!(overlay.is_ctrl_forced_visible());
        assert_eq!(doc.focused(), Some("snake-ctrl"));

        overlay.frame(&mut doc, ms(300));
        assert!(!doc.element("snake-overlay").unwrap().has_class(class::HIDDEN));
        overlay.frame(&mut doc, ms(400));
        assert_eq!(overlay.phase(), Phase::Closed);
        assert!(doc.element("snake-overlay").unwrap().has_class(class::HIDDEN));

        overlay.frame(&mut doc, ms(5100));
        assert!(!overlay.is_ctrl_forced_visible());
    }

    #[test]
    fn test_frame_tick_budget() {
        let (mut doc, mut overlay) = mounted();
        overlay.frame(&mut doc, ms(0));
        // 4.5 steps are due but the frame is capped
        overlay.frame(&mut doc, ms(450));
        assert_eq!(overlay.state().steps, 4);
        assert_eq!(overlay.metrics().resets, 0);
    }

    #[test]
    fn test_hidden_page_pauses_ticks() {
        let (mut doc, mut overlay) = mounted();
        overlay.frame(&mut doc, ms(0));
        doc.set_hidden(true);
        overlay.pump(&mut doc, ms(10));
        overlay.frame(&mut doc, ms(300));
        assert_eq!(overlay.state().steps, 0);

        doc.set_hidden(false);
        overlay.pump(&mut doc, ms(310));
        overlay.frame(&mut doc, ms(320));
        overlay.frame(&mut doc, ms(430));
        assert!(overlay.state().steps > 0 || overlay.metrics().resets > 0);
    }

    #[test]
    fn test_reduced_motion_stops_animation_but_not_overlay() {
        let mut doc = page();
        doc.set_reduced_motion(true);
        let mut overlay = SnakeOverlay::create(OverlayConfig::default(), &mut doc, Some(1)).unwrap();
        overlay.start(&mut doc);
        assert!(!overlay.is_scheduled());

        overlay.open(&mut doc);
        overlay.frame(&mut doc, ms(0));
        overlay.frame(&mut doc, ms(400));
        assert_eq!(overlay.phase(), Phase::Open(Mode::Autonomous));
        assert_eq!(overlay.state().steps, 0);

        doc.set_reduced_motion(false);
        overlay.pump(&mut doc, ms(410));
        assert!(overlay.is_scheduled());
    }

    #[test]
    fn test_shrinking_viewport_keeps_snake_in_bounds() {
        let (mut doc, mut overlay) = mounted();
        doc.with_element("snake-bg", |bg| bg.rect = Rect::new(0.0, 0.0, 120.0, 96.0));
        doc.set_viewport(Rect::new(0.0, 0.0, 120.0, 96.0));
        overlay.pump(&mut doc, ms(0));

        let state = overlay.state();
        assert_eq!((state.cols(), state.rows()), (10, 8));
        assert!(state.snake.segments().iter().all(|&p| state.is_in_bounds(p)));
        assert!(state.grid.is_consistent_with(&state.snake));
    }

    #[test]
    fn test_joystick_steers_in_player_mode() {
        let (mut doc, mut overlay) = opened();
        let center = doc.element("joy-base").unwrap().rect.center();

        // Ignored while autonomous
        doc.dispatch(PageEvent::TouchStart {
            target: "joy-base".into(),
            point: Point::new(center.x, center.y - 40.0),
        });
        overlay.pump(&mut doc, ms(20));
        assert!(!overlay.state().turn_queued);

        overlay.take_control(&mut doc);
        doc.set_coarse_pointer(true);
        assert!(overlay.is_displayed(&doc, "joy-base"));

        doc.dispatch(PageEvent::TouchStart {
            target: "joy-base".into(),
            point: Point::new(center.x, center.y - 40.0),
        });
        overlay.pump(&mut doc, ms(30));
        assert!(overlay.state().turn_queued);
        assert_eq!(overlay.state().next_direction, crate::game::Direction::Up);
        assert_eq!(
            doc.element("joy-stick").unwrap().style("transform"),
            Some("translate(calc(-50% + 0px), calc(-50% + -28px))")
        );

        doc.dispatch(PageEvent::TouchEnd);
        overlay.pump(&mut doc, ms(40));
        assert_eq!(
            doc.element("joy-stick").unwrap().style("transform"),
            Some(CENTERED_TRANSFORM)
        );
    }

    #[test]
    fn test_theme_change_redraws_with_new_colours() {
        let (mut doc, mut overlay) = mounted();
        let light = overlay.background().commands()[0].clone();

        doc.set_root_class(class::DARK, true);
        overlay.pump(&mut doc, ms(0));
        let dark = &overlay.background().commands()[0];

        match (light, dark) {
            (
                DrawCommand::FillRoundRect { color: a, .. },
                DrawCommand::FillRoundRect { color: b, .. },
            ) => assert_ne!(a, *b),
            other => panic!("unexpected commands {other:?}"),
        }
    }

    #[test]
    fn test_restart_key_in_player_mode() {
        let (mut doc, mut overlay) = opened();
        overlay.take_control(&mut doc);
        doc.dispatch(key(KeyCode::Char('r')));
        overlay.pump(&mut doc, ms(20));
        assert_eq!(overlay.metrics().resets, 1);
        assert_eq!(overlay.metrics().last_reset, Some(ResetReason::Restart));
        assert_eq!(overlay.state().snake.len(), 3);
    }
}
