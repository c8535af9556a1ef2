//! Terminal host for the page: lays the page out in terminal cells, turns
//! terminal input into page events and draws both canvases with Braille.

use anyhow::{Context, Result};
use clap::ValueEnum;
use crossterm::{
    event::{
        DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture, Event,
        EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton, MouseEvent,
        MouseEventKind,
    },
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use log::{info, warn};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Alignment, Rect as Area},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Clear, Paragraph, Wrap},
    Frame, Terminal,
};
use std::io::{stderr, Stderr};
use std::time::{Duration, Instant};
use tokio::time::interval;

use crate::game::Mode;
use crate::overlay::{Labels, Locale, OverlayConfig, SnakeOverlay};
use crate::page::{class, Document, Element, ElementIds, GameStyles, PageEvent, Point, Rect};
use crate::render::terminal::to_color;
use crate::render::theme::{parse_hsl_triplet, LIGHT_INK, PRIMARY_VAR, SECONDARY_VAR};
use crate::render::{CanvasView, Palette};

/// CSS pixels covered by one terminal cell
pub const PX_PER_COL: f64 = 6.0;
pub const PX_PER_ROW: f64 = 12.0;

const HEADER_ID: &str = "site-header";
const FOOTER_ID: &str = "site-footer";

/// Site colour themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Accent {
    #[default]
    Indigo,
    Emerald,
    Amber,
    Rose,
}

impl Accent {
    const ALL: [Accent; 4] = [Accent::Indigo, Accent::Emerald, Accent::Amber, Accent::Rose];

    pub fn next(self) -> Self {
        let i = Self::ALL.iter().position(|&a| a == self).unwrap_or(0);
        Self::ALL[(i + 1) % Self::ALL.len()]
    }

    pub fn name(self) -> &'static str {
        match self {
            Accent::Indigo => "indigo",
            Accent::Emerald => "emerald",
            Accent::Amber => "amber",
            Accent::Rose => "rose",
        }
    }

    /// Primary and secondary 400 shades as HSL triplets
    pub fn shades(self) -> (&'static str, &'static str) {
        match self {
            Accent::Indigo => ("234 89% 74%", "292 91% 73%"),
            Accent::Emerald => ("158 64% 52%", "27 96% 61%"),
            Accent::Amber => ("33 90% 65%", "199 89% 48%"),
            Accent::Rose => ("351 95% 71%", "198 93% 60%"),
        }
    }
}

/// Host settings from the command line
#[derive(Debug, Clone, Default)]
pub struct SiteOptions {
    pub locale: Locale,
    pub accent: Accent,
    pub dark: bool,
    pub reduced_motion: bool,
    /// Pretend to be a touch device: shows the joystick, mouse acts as touch
    pub touch: bool,
    pub seed: Option<u64>,
}

/// Build the page skeleton the game mounts on
pub fn build_page(ids: &ElementIds, labels: &Labels, locale: Locale) -> Document {
    let (title, intro) = match locale {
        Locale::En => (
            "Portfolio",
            "Software engineer. Systems, tooling and the occasional game.",
        ),
        Locale::Es => (
            "Portafolio",
            "Ingeniero de software. Sistemas, herramientas y algún que otro juego.",
        ),
    };

    let mut doc = Document::new();
    doc.append_child(Element::new(HEADER_ID).with_text(title));
    doc.append_child(Element::new(&ids.page_shell).with_text(intro));
    doc.append_child(Element::new(&ids.background_root));
    doc.append_child(Element::new(&ids.layer));
    doc.append_child(Element::new(&ids.ctrl).with_text(labels.ctrl.as_str()));
    doc.append_child(
        Element::new(&ids.overlay)
            .with_class(class::HIDDEN)
            .with_class(class::OPACITY_0),
    );
    doc.append_child(Element::new(FOOTER_ID).with_text("© 2025"));

    doc.insert(Element::new(&ids.bg_canvas).with_parent(&ids.layer));
    doc.insert(Element::new(&ids.play_canvas).with_parent(&ids.overlay));
    doc.insert(Element::new(&ids.exit).with_parent(&ids.overlay).with_text(labels.exit.as_str()));
    doc.insert(
        Element::new(&ids.takeover)
            .with_parent(&ids.overlay)
            .with_text(labels.takeover.as_str()),
    );
    doc.insert(Element::new(&ids.hint).with_parent(&ids.overlay));
    doc.insert(
        Element::new(hint_variant_id(ids, false))
            .with_parent(&ids.hint)
            .with_class(class::HINT_DESKTOP)
            .with_text(labels.hint_desktop.as_str()),
    );
    doc.insert(
        Element::new(hint_variant_id(ids, true))
            .with_parent(&ids.hint)
            .with_class(class::HINT_MOBILE)
            .with_text(labels.hint_mobile.as_str()),
    );
    doc.insert(Element::new(&ids.joy).with_parent(&ids.overlay));
    doc.insert(Element::new(&ids.joy_base).with_parent(&ids.joy));
    doc.insert(Element::new(&ids.joy_stick).with_parent(&ids.joy_base));
    doc
}

fn hint_variant_id(ids: &ElementIds, mobile: bool) -> String {
    format!("{}-{}", ids.hint, if mobile { "mobile" } else { "desktop" })
}

/// Set the accent's custom properties and theme class on the root
pub fn apply_accent(doc: &mut Document, accent: Accent) {
    let (primary, secondary) = accent.shades();
    doc.set_root_property(PRIMARY_VAR, primary);
    doc.set_root_property(SECONDARY_VAR, secondary);
    for other in Accent::ALL {
        if other != accent {
            doc.set_root_class(other.name(), false);
        }
    }
    doc.set_root_class(accent.name(), true);
}

/// Pixel offset encoded in a stick `transform` value
pub fn stick_offset(transform: &str) -> (f64, f64) {
    let mut nums = transform
        .split("+ ")
        .skip(1)
        .filter_map(|part| part.split("px").next()?.trim().parse::<f64>().ok());
    (nums.next().unwrap_or(0.0), nums.next().unwrap_or(0.0))
}

fn cell_rect(x: f64, y: f64, width: f64, height: f64) -> Rect {
    Rect::new(
        x.max(0.0) * PX_PER_COL,
        y.max(0.0) * PX_PER_ROW,
        width * PX_PER_COL,
        height * PX_PER_ROW,
    )
}

pub struct SiteMode {
    config: OverlayConfig,
    options: SiteOptions,
    doc: Document,
    styles: GameStyles,
    overlay: Option<SnakeOverlay>,
    accent: Accent,
    area: Area,
    origin: Instant,
    should_quit: bool,
}

impl SiteMode {
    pub fn new(config: OverlayConfig, options: SiteOptions) -> Self {
        let mut doc = build_page(&config.ids, &config.labels, options.locale);
        doc.set_coarse_pointer(options.touch);
        doc.set_reduced_motion(options.reduced_motion);
        doc.set_root_class(class::DARK, options.dark);
        apply_accent(&mut doc, options.accent);

        Self {
            styles: GameStyles::new(config.ids.clone()),
            accent: options.accent,
            config,
            options,
            doc,
            overlay: None,
            area: Area::default(),
            origin: Instant::now(),
            should_quit: false,
        }
    }

    /// Lay the page out for `area` and mount the game
    pub fn mount(&mut self, area: Area) {
        self.layout(area);
        self.overlay = SnakeOverlay::create(self.config.clone(), &mut self.doc, self.options.seed);
        match self.overlay.as_mut() {
            Some(overlay) => overlay.start(&mut self.doc),
            None => warn!("game unavailable, showing the page only"),
        }
        self.doc.drain_events();
    }

    pub async fn run(&mut self) -> Result<()> {
        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(
            stderr,
            EnterAlternateScreen,
            EnableMouseCapture,
            EnableFocusChange
        )
        .context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let size = terminal.size().context("Failed to read terminal size")?;
        self.mount(Area::new(0, 0, size.width, size.height));

        let result = self.run_frame_loop(&mut terminal).await;

        self.cleanup_terminal(&mut terminal)?;
        if let Some(overlay) = self.overlay.take() {
            overlay.dispose(&mut self.doc);
        }

        result
    }

    async fn run_frame_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();

        // Animation frames at ~60 Hz; the game clock decides how many ticks run
        let mut frame_timer = interval(Duration::from_millis(16));

        loop {
            tokio::select! {
                maybe_event = event_stream.next() => {
                    if let Some(Ok(event)) = maybe_event {
                        self.handle_event(event);
                    }
                }

                _ = frame_timer.tick() => {
                    self.on_frame();
                    terminal.draw(|frame| self.render(frame)).context("Failed to draw frame")?;
                }

                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn now(&self) -> Duration {
        self.origin.elapsed()
    }

    fn mode(&self) -> Mode {
        self.overlay.as_ref().map_or(Mode::Autonomous, SnakeOverlay::mode)
    }

    fn displayed(&self, id: &str) -> bool {
        self.styles.is_displayed(&self.doc, id)
    }

    /// Overlay is shown and not mid-fade
    /// Control button is in its post-close reveal window
    fn ctrl_revealed(&self) -> bool {
        self.overlay
            .as_ref()
            .is_some_and(SnakeOverlay::is_ctrl_forced_visible)
    }

    fn overlay_visible(&self) -> bool {
        let id = &self.config.ids.overlay;
        self.displayed(id)
            && self
                .doc
                .element(id)
                .is_some_and(|o| !o.has_class(class::OPACITY_0))
    }

    fn layout(&mut self, area: Area) {
        self.area = area;
        let (w, h) = (f64::from(area.width), f64::from(area.height));
        let full = cell_rect(0.0, 0.0, w, h);
        let was_portrait = {
            let v = self.doc.media().viewport;
            v.height > v.width
        };

        let ids = self.config.ids.clone();
        let mid = (w / 2.0).floor();
        let rects = [
            (ids.bg_canvas.clone(), full),
            (ids.play_canvas.clone(), full),
            (ids.layer.clone(), full),
            (ids.background_root.clone(), full),
            (ids.overlay.clone(), full),
            (HEADER_ID.to_string(), cell_rect(0.0, 0.0, w, 1.0)),
            (FOOTER_ID.to_string(), cell_rect(0.0, h - 1.0, w, 1.0)),
            (
                ids.page_shell.clone(),
                cell_rect(mid - 30.0, (h / 2.0 - 4.0).floor(), 60.0, 7.0),
            ),
            (ids.ctrl.clone(), cell_rect(2.0, h - 5.0, 30.0, 3.0)),
            (ids.exit.clone(), cell_rect(w - 14.0, 1.0, 12.0, 3.0)),
            (ids.takeover.clone(), cell_rect(mid - 12.0, h - 4.0, 24.0, 3.0)),
            (ids.hint.clone(), cell_rect(mid - 22.0, h - 6.0, 44.0, 1.0)),
            (hint_variant_id(&ids, false), cell_rect(mid - 22.0, h - 6.0, 44.0, 1.0)),
            (hint_variant_id(&ids, true), cell_rect(mid - 22.0, h - 6.0, 44.0, 1.0)),
            (ids.joy.clone(), cell_rect(2.0, h - 12.0, 19.0, 9.0)),
            (ids.joy_base.clone(), cell_rect(2.0, h - 12.0, 19.0, 9.0)),
            (ids.joy_stick.clone(), cell_rect(7.0, h - 9.0, 9.0, 3.0)),
        ];
        for (id, rect) in rects {
            self.doc.with_element(&id, |el| el.rect = rect);
        }

        self.doc.set_viewport(full);
        if was_portrait != (full.height > full.width) {
            self.doc.dispatch(PageEvent::OrientationChange);
        }
    }

    fn pump(&mut self) {
        let now = self.now();
        match self.overlay.as_mut() {
            Some(overlay) => overlay.pump(&mut self.doc, now),
            None => {
                self.doc.drain_events();
            }
        }
    }

    fn on_frame(&mut self) {
        self.pump();
        let now = self.now();
        if let Some(overlay) = self.overlay.as_mut() {
            overlay.frame(&mut self.doc, now);
            overlay.metrics_mut().update();
        }
    }

    fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            Event::Resize(cols, rows) => self.layout(Area::new(0, 0, cols, rows)),
            Event::FocusLost => self.doc.set_hidden(true),
            Event::FocusGained => self.doc.set_hidden(false),
            _ => {}
        }
        self.pump();
    }

    fn click(&mut self, id: &str) {
        if self.displayed(id) {
            self.doc.dispatch(PageEvent::Click(id.to_string()));
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        if key.kind == KeyEventKind::Press {
            let ids = self.config.ids.clone();
            match key.code {
                KeyCode::Char('q') if self.mode() != Mode::Player => self.should_quit = true,
                KeyCode::Char('g') => self.click(&ids.ctrl),
                KeyCode::Char('t') => self.click(&ids.takeover),
                KeyCode::Char('x') => self.click(&ids.exit),
                KeyCode::Char('m') => self.toggle_dark(),
                KeyCode::Char('c') => self.cycle_accent(),
                KeyCode::Tab => self.cycle_focus(),
                KeyCode::Enter => {
                    if let Some(id) = self.doc.focused().map(str::to_string) {
                        self.click(&id);
                    }
                }
                _ => {}
            }
        }

        self.doc.dispatch(PageEvent::KeyDown(key));
    }

    fn handle_mouse(&mut self, mouse: MouseEvent) {
        let point = Point::new(
            (f64::from(mouse.column) + 0.5) * PX_PER_COL,
            (f64::from(mouse.row) + 0.5) * PX_PER_ROW,
        );
        let ids = self.config.ids.clone();
        let hit = |doc: &Document, id: &str| {
            doc.element(id)
                .is_some_and(|el| el.rect.contains(point))
        };

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => {
                if self.displayed(&ids.joy_base) && hit(&self.doc, &ids.joy_base) {
                    self.doc.dispatch(PageEvent::TouchStart {
                        target: ids.joy_base.clone(),
                        point,
                    });
                    return;
                }
                let target = [&ids.exit, &ids.takeover, &ids.ctrl]
                    .into_iter()
                    .find(|id| self.displayed(id.as_str()) && hit(&self.doc, id.as_str()));
                if let Some(id) = target {
                    self.doc.dispatch(PageEvent::Click(id.clone()));
                }
            }
            MouseEventKind::Drag(MouseButton::Left) => {
                self.doc.dispatch(PageEvent::TouchMove(point));
            }
            MouseEventKind::Up(MouseButton::Left) => {
                self.doc.dispatch(PageEvent::TouchEnd);
            }
            _ => {}
        }
    }

    fn toggle_dark(&mut self) {
        let dark = !self.doc.root().has_class(class::DARK);
        self.doc.set_root_class(class::DARK, dark);
        info!("dark mode {}", if dark { "on" } else { "off" });
    }

    fn cycle_accent(&mut self) {
        self.accent = self.accent.next();
        apply_accent(&mut self.doc, self.accent);
        info!("accent {}", self.accent.name());
    }

    fn cycle_focus(&mut self) {
        let ids = &self.config.ids;
        let order = [ids.ctrl.clone(), ids.takeover.clone(), ids.exit.clone()];
        let focusable: Vec<&String> = order
            .iter()
            .filter(|id| self.displayed(id.as_str()))
            .collect();
        if focusable.is_empty() {
            return;
        }
        let current = self.doc.focused();
        let next = focusable
            .iter()
            .position(|id| Some(id.as_str()) == current)
            .map_or(0, |i| (i + 1) % focusable.len());
        let id = focusable[next].clone();
        self.doc.focus(&id);
    }

    fn to_area(&self, rect: Rect) -> Area {
        let x = (rect.x / PX_PER_COL).round() as u16;
        let y = (rect.y / PX_PER_ROW).round() as u16;
        let w = (rect.width / PX_PER_COL).round() as u16;
        let h = (rect.height / PX_PER_ROW).round() as u16;
        Area::new(x, y, w, h).intersection(self.area)
    }

    fn element_area(&self, id: &str) -> Option<Area> {
        self.doc.element(id).map(|el| self.to_area(el.rect))
    }

    pub fn render(&self, frame: &mut Frame) {
        let area = frame.area();
        let palette = Palette::resolve(&self.doc);
        let ink = if palette.is_dark {
            Color::Rgb(226, 232, 240)
        } else {
            to_color(LIGHT_INK)
        };
        let accent = Style::default().fg(
            self.doc
                .root_property(PRIMARY_VAR)
                .and_then(parse_hsl_triplet)
                .map_or(ink, to_color),
        );
        let base = Style::default().fg(ink).bg(to_color(palette.background));

        match &self.overlay {
            Some(overlay) => frame.render_widget(
                CanvasView::new(overlay.background(), palette.background),
                area,
            ),
            None => frame.render_widget(Block::default().style(base), area),
        }

        self.render_page(frame, base, accent);

        if self.overlay_visible() {
            frame.render_widget(Clear, area);
            if let Some(overlay) = &self.overlay {
                frame.render_widget(CanvasView::new(overlay.play(), palette.background), area);
                frame.render_widget(
                    self.render_stats(overlay, base, accent),
                    Area::new(area.x, area.y, area.width, 1),
                );
            }
            self.render_controls(frame, base, accent);
        }
    }

    fn render_page(&self, frame: &mut Frame, base: Style, accent: Style) {
        let ids = &self.config.ids;

        if self.displayed(HEADER_ID) {
            if let (Some(area), Some(el)) = (self.element_area(HEADER_ID), self.doc.element(HEADER_ID)) {
                let line = Line::from(vec![
                    Span::styled(format!(" {} ", el.text), accent.add_modifier(Modifier::BOLD)),
                    Span::styled(
                        "   g game · m dark · c accent · tab/enter focus · q quit",
                        base.add_modifier(Modifier::DIM),
                    ),
                ]);
                frame.render_widget(Paragraph::new(line).style(base), area);
            }
        }

        if self.displayed(&ids.page_shell) {
            if let (Some(area), Some(el)) = (self.element_area(&ids.page_shell), self.doc.element(&ids.page_shell)) {
                let shell = Paragraph::new(el.text.as_str())
                    .style(base)
                    .alignment(Alignment::Center)
                    .wrap(Wrap { trim: true })
                    .block(
                        Block::bordered()
                            .border_type(BorderType::Rounded)
                            .border_style(accent)
                            .title(self.doc.element(HEADER_ID).map(|h| h.text.clone()).unwrap_or_default()),
                    );
                frame.render_widget(Clear, area);
                frame.render_widget(shell, area);
            }
        }

        if self.displayed(FOOTER_ID) {
            if let (Some(area), Some(el)) = (self.element_area(FOOTER_ID), self.doc.element(FOOTER_ID)) {
                frame.render_widget(
                    Paragraph::new(el.text.as_str()).style(base.add_modifier(Modifier::DIM)).alignment(Alignment::Right),
                    area,
                );
            }
        }

        self.render_button(frame, &ids.ctrl, base, accent);
    }

    fn render_controls(&self, frame: &mut Frame, base: Style, accent: Style) {
        let ids = &self.config.ids;
        self.render_button(frame, &ids.exit, base, accent);
        self.render_button(frame, &ids.takeover, base, accent);

        for mobile in [false, true] {
            let id = hint_variant_id(ids, mobile);
            if self.displayed(&id) {
                if let (Some(area), Some(el)) = (self.element_area(&id), self.doc.element(&id)) {
                    frame.render_widget(
                        Paragraph::new(el.text.as_str()).style(base).alignment(Alignment::Center),
                        area,
                    );
                }
            }
        }

        if self.displayed(&ids.joy_base) {
            if let (Some(area), Some(base_el)) = (self.element_area(&ids.joy_base), self.doc.element(&ids.joy_base)) {
                frame.render_widget(
                    Block::bordered().border_type(BorderType::Rounded).border_style(accent),
                    area,
                );
                let (dx, dy) = self
                    .doc
                    .element(&ids.joy_stick)
                    .and_then(|s| s.style("transform"))
                    .map_or((0.0, 0.0), stick_offset);
                let center = base_el.rect.center();
                let stick = self.to_area(Rect::new(center.x + dx - PX_PER_COL, center.y + dy, 2.0 * PX_PER_COL, PX_PER_ROW));
                frame.render_widget(Paragraph::new("●").style(accent.add_modifier(Modifier::BOLD)), stick);
            }
        }
    }

    fn render_button(&self, frame: &mut Frame, id: &str, base: Style, accent: Style) {
        if !self.displayed(id) {
            return;
        }
        let (Some(area), Some(el)) = (self.element_area(id), self.doc.element(id)) else {
            return;
        };
        let focused = self.doc.focused() == Some(id);
        let border = if focused {
            accent.add_modifier(Modifier::BOLD | Modifier::REVERSED)
        } else if id == self.config.ids.ctrl && self.ctrl_revealed() {
            accent.add_modifier(Modifier::BOLD)
        } else {
            accent
        };
        let button = Paragraph::new(el.text.as_str())
            .style(base)
            .alignment(Alignment::Center)
            .block(Block::bordered().border_type(BorderType::Rounded).border_style(border));
        frame.render_widget(Clear, area);
        frame.render_widget(button, area);
    }

    fn render_stats(&self, overlay: &SnakeOverlay, base: Style, accent: Style) -> Paragraph<'_> {
        let metrics = overlay.metrics();
        let state = overlay.state();
        let label = |text: &'static str| Span::styled(text, accent);
        let value = |v: String| Span::styled(v, base.add_modifier(Modifier::BOLD));

        let line = Line::from(vec![
            label(" Length: "),
            value(state.snake.len().to_string()),
            label("  Best: "),
            value(metrics.best_length.to_string()),
            label("  Eaten: "),
            value(metrics.foods_eaten.to_string()),
            label("  Resets: "),
            value(metrics.resets.to_string()),
            label("  Time: "),
            value(metrics.format_time()),
            label(if overlay.mode() == Mode::Player { "  [player]" } else { "  [autopilot]" }),
        ]);
        Paragraph::new(line).style(base)
    }

    fn cleanup_terminal(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
    ) -> Result<()> {
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(
            terminal.backend_mut(),
            DisableFocusChange,
            DisableMouseCapture,
            LeaveAlternateScreen
        )
        .context("Failed to leave alternate screen")?;
        terminal.show_cursor().context("Failed to show cursor")?;
        Ok(())
    }
}
