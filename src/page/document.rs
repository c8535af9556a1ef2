//! In-memory model of the host page
//!
//! The overlay only talks to the page through this type: element lookup by
//! id, class lists, attributes, inline styles, layout boxes, focus, the
//! root's custom properties, media queries and listener registration.
//! Events raised on the page are queued for registered listeners and drained
//! by whoever drives the event loop.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::events::{ListenerKind, PageEvent, Point};
use super::ids::class;

/// A layout box in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x < self.x + self.width
            && point.y >= self.y
            && point.y < self.y + self.height
    }
}

/// One page element
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Element {
    id: String,
    parent: Option<String>,
    classes: BTreeSet<String>,
    attributes: BTreeMap<String, String>,
    style: BTreeMap<String, String>,
    /// Text content, used for labels
    pub text: String,
    /// Layout box
    pub rect: Rect,
}

impl Element {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn with_class(mut self, name: &str) -> Self {
        self.add_class(name);
        self
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn has_class(&self, name: &str) -> bool {
        self.classes.contains(name)
    }

    pub fn add_class(&mut self, name: &str) {
        self.classes.insert(name.to_string());
    }

    pub fn remove_class(&mut self, name: &str) {
        self.classes.remove(name);
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(String::as_str)
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        self.attributes.insert(name.to_string(), value.into());
    }

    pub fn remove_attribute(&mut self, name: &str) {
        self.attributes.remove(name);
    }

    /// Inline style property
    pub fn style(&self, property: &str) -> Option<&str> {
        self.style.get(property).map(String::as_str)
    }

    /// Set an inline style property; an empty value removes it
    pub fn set_style(&mut self, property: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.style.remove(property);
        } else {
            self.style.insert(property.to_string(), value);
        }
    }

    pub fn client_width(&self) -> f64 {
        self.rect.width
    }

    pub fn client_height(&self) -> f64 {
        self.rect.height
    }
}

/// Media-query and environment state
#[derive(Debug, Clone, PartialEq)]
pub struct Media {
    pub prefers_dark: bool,
    pub reduced_motion: bool,
    /// `(pointer: coarse)`, i.e. a touch device
    pub coarse_pointer: bool,
    pub device_pixel_ratio: f64,
    pub viewport: Rect,
}

impl Default for Media {
    fn default() -> Self {
        Self {
            prefers_dark: false,
            reduced_motion: false,
            coarse_pointer: false,
            device_pixel_ratio: 1.0,
            viewport: Rect::new(0.0, 0.0, 1280.0, 800.0),
        }
    }
}

/// A `<style>` element in the head
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StyleTag {
    pub attributes: BTreeMap<String, String>,
    pub css: String,
}

/// Handle returned by [`Document::add_listener`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

#[derive(Debug, Clone, Default)]
pub struct Document {
    root: Element,
    body: Element,
    /// Direct children of the body, in order
    children: Vec<String>,
    elements: BTreeMap<String, Element>,
    head: Vec<StyleTag>,
    focused: Option<String>,
    hidden: bool,
    media: Media,
    listeners: BTreeMap<ListenerId, ListenerKind>,
    next_listener: u64,
    pending: VecDeque<PageEvent>,
}

impl Document {
    pub fn new() -> Self {
        Self {
            root: Element::new("html"),
            body: Element::new("body"),
            ..Self::default()
        }
    }

    /// Append a direct child of the body
    pub fn append_child(&mut self, element: Element) {
        let id = element.id.clone();
        self.children.retain(|c| c != &id);
        self.children.push(id.clone());
        self.elements.insert(id, element);
    }

    /// Add an element nested somewhere below a body child
    pub fn insert(&mut self, element: Element) {
        self.elements.insert(element.id.clone(), element);
    }

    pub fn remove(&mut self, id: &str) -> Option<Element> {
        self.children.retain(|c| c != id);
        if self.focused.as_deref() == Some(id) {
            self.focused = None;
        }
        self.elements.remove(id)
    }

    pub fn element(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn element_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Run `f` on the element if it exists
    pub fn with_element(&mut self, id: &str, f: impl FnOnce(&mut Element)) {
        if let Some(element) = self.elements.get_mut(id) {
            f(element);
        }
    }

    pub fn has_element(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    /// The element followed by its ancestors, innermost first
    pub fn ancestry<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Element> + 'a {
        let mut next = self.elements.get(id);
        let mut depth = 0;
        std::iter::from_fn(move || {
            let current = next?;
            depth += 1;
            // Guard against parent cycles
            next = match current.parent() {
                Some(parent) if depth <= self.elements.len() => self.elements.get(parent),
                _ => None,
            };
            Some(current)
        })
    }

    pub fn body_children(&self) -> &[String] {
        &self.children
    }

    pub fn body(&self) -> &Element {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Element {
        &mut self.body
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Toggle a class on the root element, notifying class observers
    pub fn set_root_class(&mut self, name: &str, on: bool) {
        if self.root.has_class(name) == on {
            return;
        }
        if on {
            self.root.add_class(name);
        } else {
            self.root.remove_class(name);
        }
        self.dispatch(PageEvent::RootClassMutation);
    }

    /// Set a custom property (`--name`) on the root element
    pub fn set_root_property(&mut self, name: &str, value: impl Into<String>) {
        self.root.set_style(name, value);
    }

    /// Computed value of a root custom property, trimmed
    pub fn root_property(&self, name: &str) -> Option<&str> {
        self.root
            .style(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Dark colour scheme: the root's `dark` class or the media preference
    pub fn is_dark(&self) -> bool {
        self.root.has_class(class::DARK) || self.media.prefers_dark
    }

    pub fn focus(&mut self, id: &str) {
        if self.elements.contains_key(id) {
            self.focused = Some(id.to_string());
        }
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        if self.hidden != hidden {
            self.hidden = hidden;
            self.dispatch(PageEvent::VisibilityChange);
        }
    }

    pub fn media(&self) -> &Media {
        &self.media
    }

    pub fn set_prefers_dark(&mut self, dark: bool) {
        if self.media.prefers_dark != dark {
            self.media.prefers_dark = dark;
            self.dispatch(PageEvent::ColorSchemeChange);
        }
    }

    pub fn set_reduced_motion(&mut self, reduced: bool) {
        if self.media.reduced_motion != reduced {
            self.media.reduced_motion = reduced;
            self.dispatch(PageEvent::ReducedMotionChange);
        }
    }

    pub fn set_coarse_pointer(&mut self, coarse: bool) {
        self.media.coarse_pointer = coarse;
    }

    pub fn set_device_pixel_ratio(&mut self, ratio: f64) {
        self.media.device_pixel_ratio = ratio;
    }

    /// Resize the viewport and notify resize listeners
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.media.viewport = viewport;
        self.dispatch(PageEvent::Resize);
    }

    pub fn head_styles(&self) -> &[StyleTag] {
        &self.head
    }

    pub fn append_style(&mut self, tag: StyleTag) {
        self.head.push(tag);
    }

    pub fn add_listener(&mut self, kind: ListenerKind) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.insert(id, kind);
        id
    }

    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_listening(&self, kind: &ListenerKind) -> bool {
        self.listeners.values().any(|k| k == kind)
    }

    /// Queue an event if anyone listens for it; returns whether it was queued
    pub fn dispatch(&mut self, event: PageEvent) -> bool {
        let listened = self.is_listening(&event.kind());
        if listened {
            self.pending.push_back(event);
        }
        listened
    }

    /// Take every queued event, oldest first
    pub fn drain_events(&mut self) -> Vec<PageEvent> {
        self.pending.drain(..).collect()
    }
}
