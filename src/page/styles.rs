use std::collections::BTreeMap;

use super::document::{Document, Element, StyleTag};
use super::ids::{class, ElementIds};

/// Marker attribute on the injected style tag
pub const STYLE_MARKER: (&str, &str) = ("data-game-styles", "1");

/// The game's stylesheet, bound to a set of element ids
#[derive(Debug, Clone)]
pub struct GameStyles {
    ids: ElementIds,
}

impl GameStyles {
    pub fn new(ids: ElementIds) -> Self {
        Self { ids }
    }

    /// CSS text of the injected rules
    pub fn css(&self) -> String {
        let ids = &self.ids;
        format!(
            "body.{game_open} #{ctrl} {{ display: none !important; }}\n\
             #{overlay}.{player} #{takeover} {{ display: none !important; }}\n\
             #{joy} {{ display: none !important; }}\n\
             #{hint} .{hint_mobile} {{ display: none; }}\n\
             @media (pointer: coarse) {{\n\
             \x20 #{overlay}.{player} #{joy} {{ display: block !important; pointer-events: auto !important; }}\n\
             \x20 #{hint} .{hint_desktop} {{ display: none; }}\n\
             \x20 #{hint} .{hint_mobile} {{ display: inline; }}\n\
             }}\n\
             .{game_play} {{ mask-image: none !important; opacity: .9 !important; }}\n\
             .{page_hidden} {{ opacity: 0 !important; visibility: hidden !important; pointer-events: none !important; user-select: none !important; transition: opacity .25s ease; }}\n\
             @media (prefers-reduced-motion: reduce) {{\n\
             \x20 #{layer}, #{overlay} {{ animation: none !important; }}\n\
             }}\n",
            game_open = class::GAME_OPEN,
            player = class::PLAYER_MODE,
            hint_mobile = class::HINT_MOBILE,
            hint_desktop = class::HINT_DESKTOP,
            game_play = class::GAME_PLAY,
            page_hidden = class::PAGE_HIDDEN,
            ctrl = ids.ctrl,
            overlay = ids.overlay,
            takeover = ids.takeover,
            joy = ids.joy,
            hint = ids.hint,
            layer = ids.layer,
        )
    }

    /// Whether the style tag is already in the head
    pub fn is_injected(doc: &Document) -> bool {
        let (name, value) = STYLE_MARKER;
        doc.head_styles()
            .iter()
            .any(|tag| tag.attributes.get(name).map(String::as_str) == Some(value))
    }

    /// Add the style tag once; returns whether it was added
    pub fn inject(&self, doc: &mut Document) -> bool {
        if Self::is_injected(doc) {
            return false;
        }
        let (name, value) = STYLE_MARKER;
        doc.append_style(StyleTag {
            attributes: BTreeMap::from([(name.to_string(), value.to_string())]),
            css: self.css(),
        });
        true
    }

    /// Evaluate the utility classes and injected rules for an element and
    /// all of its ancestors
    pub fn is_displayed(&self, doc: &Document, id: &str) -> bool {
        let injected = Self::is_injected(doc);
        let mut found = false;
        for element in doc.ancestry(id) {
            found = true;
            if element.has_class(class::HIDDEN) || element.has_class(class::PAGE_HIDDEN) {
                return false;
            }
            if injected && !self.rule_allows(doc, element, id) {
                return false;
            }
        }
        found
    }

    fn rule_allows(&self, doc: &Document, element: &Element, target: &str) -> bool {
        let ids = &self.ids;
        let coarse = doc.media().coarse_pointer;
        let player = doc
            .element(&ids.overlay)
            .is_some_and(|o| o.has_class(class::PLAYER_MODE));

        let id = element.id();
        if id == ids.ctrl {
            return !doc.body().has_class(class::GAME_OPEN);
        }
        if id == ids.takeover {
            return !player;
        }
        if id == ids.joy {
            return coarse && player;
        }
        // Hint variants are selected by class on descendants of the hint
        if id == target && doc.ancestry(target).any(|a| a.id() == ids.hint) {
            if element.has_class(class::HINT_MOBILE) {
                return coarse;
            }
            if element.has_class(class::HINT_DESKTOP) {
                return !coarse;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page() -> (Document, GameStyles) {
        let ids = ElementIds::default();
        let mut doc = Document::new();
        doc.append_child(Element::new(&ids.ctrl));
        doc.append_child(Element::new(&ids.overlay));
        doc.insert(Element::new(&ids.takeover).with_parent(&ids.overlay));
        doc.insert(Element::new(&ids.joy).with_parent(&ids.overlay));
        doc.insert(Element::new(&ids.joy_base).with_parent(&ids.joy));
        doc.insert(Element::new(&ids.hint).with_parent(&ids.overlay));
        doc.insert(
            Element::new("hint-d")
                .with_parent(&ids.hint)
                .with_class(class::HINT_DESKTOP),
        );
        doc.insert(
            Element::new("hint-m")
                .with_parent(&ids.hint)
                .with_class(class::HINT_MOBILE),
        );
        (doc, GameStyles::new(ids))
    }

    #[test]
    fn test_inject_is_idempotent() {
        let (mut doc, styles) = page();
        assert!(styles.inject(&mut doc));
        assert!(!styles.inject(&mut doc));
        assert_eq!(doc.head_styles().len(), 1);
        assert!(doc.head_styles()[0].css.contains("#snake-joy"));
    }

    #[test]
    fn test_ctrl_hidden_while_game_open() {
        let (mut doc, styles) = page();
        styles.inject(&mut doc);
        assert!(styles.is_displayed(&doc, "snake-ctrl"));
        doc.body_mut().add_class(class::GAME_OPEN);
        assert!(!styles.is_displayed(&doc, "snake-ctrl"));
    }

    #[test]
    fn test_joystick_needs_touch_and_player_mode() {
        let (mut doc, styles) = page();
        styles.inject(&mut doc);
        assert!(!styles.is_displayed(&doc, "joy-base"));

        doc.with_element("snake-overlay", |o| o.add_class(class::PLAYER_MODE));
        assert!(!styles.is_displayed(&doc, "joy-base"));
        assert!(!styles.is_displayed(&doc, "snake-takeover"));

        doc.set_coarse_pointer(true);
        assert!(styles.is_displayed(&doc, "joy-base"));
    }

    #[test]
    fn test_hint_variant_follows_pointer() {
        let (mut doc, styles) = page();
        styles.inject(&mut doc);
        assert!(styles.is_displayed(&doc, "hint-d"));
        assert!(!styles.is_displayed(&doc, "hint-m"));

        doc.set_coarse_pointer(true);
        assert!(!styles.is_displayed(&doc, "hint-d"));
        assert!(styles.is_displayed(&doc, "hint-m"));
    }

    #[test]
    fn test_hidden_ancestor_hides_descendants() {
        let (mut doc, styles) = page();
        doc.with_element("snake-overlay", |o| o.add_class(class::HIDDEN));
        assert!(!styles.is_displayed(&doc, "snake-takeover"));
        assert!(!styles.is_displayed(&doc, "missing"));
    }

    #[test]
    fn test_rules_inactive_until_injected() {
        let (mut doc, styles) = page();
        doc.body_mut().add_class(class::GAME_OPEN);
        assert!(styles.is_displayed(&doc, "snake-ctrl"));
    }
}
