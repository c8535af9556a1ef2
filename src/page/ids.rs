use serde::{Deserialize, Serialize};

/// Class names the overlay toggles on page elements
pub mod class {
    pub const GAME_OPEN: &str = "game-open";
    pub const PLAYER_MODE: &str = "player-mode";
    pub const PAGE_HIDDEN: &str = "page-hidden";
    pub const GAME_PLAY: &str = "game-play";
    pub const HIDDEN: &str = "hidden";
    pub const OPACITY_0: &str = "opacity-0";
    pub const TRANSLATE_Y_2: &str = "translate-y-2";
    pub const HINT_DESKTOP: &str = "hint-desktop";
    pub const HINT_MOBILE: &str = "hint-mobile";
    pub const DARK: &str = "dark";
}

/// Element ids the overlay expects to find on the page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ElementIds {
    pub page_shell: String,
    pub background_root: String,
    pub layer: String,
    pub overlay: String,
    pub ctrl: String,
    pub exit: String,
    pub takeover: String,
    pub bg_canvas: String,
    pub play_canvas: String,
    pub joy: String,
    pub joy_base: String,
    pub joy_stick: String,
    pub hint: String,
}

impl Default for ElementIds {
    fn default() -> Self {
        Self {
            page_shell: "page-shell".into(),
            background_root: "background-root".into(),
            layer: "snake-layer".into(),
            overlay: "snake-overlay".into(),
            ctrl: "snake-ctrl".into(),
            exit: "snake-exit".into(),
            takeover: "snake-takeover".into(),
            bg_canvas: "snake-bg".into(),
            play_canvas: "snake-play".into(),
            joy: "snake-joy".into(),
            joy_base: "joy-base".into(),
            joy_stick: "joy-stick".into(),
            hint: "snake-hint".into(),
        }
    }
}

impl ElementIds {
    /// Ids whose absence disables the game
    pub fn required(&self) -> [&str; 8] {
        [
            &self.bg_canvas,
            &self.play_canvas,
            &self.layer,
            &self.ctrl,
            &self.overlay,
            &self.exit,
            &self.takeover,
            &self.page_shell,
        ]
    }

    /// Body children that stay visible while the overlay is open
    pub fn keep_visible(&self) -> [&str; 4] {
        [&self.overlay, &self.ctrl, &self.layer, &self.background_root]
    }
}
