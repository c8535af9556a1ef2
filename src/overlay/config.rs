use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::game::GameConfig;
use crate::page::ElementIds;

/// Languages with built-in label sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Es,
}

/// Already-resolved user-facing strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Labels {
    pub ctrl: String,
    pub exit: String,
    pub takeover: String,
    pub hint_desktop: String,
    pub hint_mobile: String,
}

impl Labels {
    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::En => Self {
                ctrl: "Take control of game".into(),
                exit: "Return".into(),
                takeover: "Take control".into(),
                hint_desktop: "Use ← ↑ → ↓ or WASD to move".into(),
                hint_mobile: "Use the joystick to move".into(),
            },
            Locale::Es => Self {
                ctrl: "Tomar control del juego".into(),
                exit: "Volver".into(),
                takeover: "Tomar el control".into(),
                hint_desktop: "Usa ← ↑ → ↓ o WASD para moverte".into(),
                hint_mobile: "Usa el joystick para moverte".into(),
            },
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::for_locale(Locale::default())
    }
}

/// Everything needed to mount the game on a page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    pub game: GameConfig,
    pub ids: ElementIds,
    pub labels: Labels,
}

impl OverlayConfig {
    pub fn for_locale(locale: Locale) -> Self {
        Self {
            labels: Labels::for_locale(locale),
            ..Self::default()
        }
    }

    /// Load from a JSON file; missing fields take their defaults
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        config.validate().map_err(anyhow::Error::msg)?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), String> {
        self.game.validate()?;
        if let Some(blank) = self.ids.required().iter().find(|id| id.trim().is_empty()) {
            return Err(format!("element id must not be blank (got {blank:?})"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_locale_presets() {
        assert_eq!(Labels::for_locale(Locale::En).exit, "Return");
        assert_eq!(Labels::for_locale(Locale::Es).exit, "Volver");
        assert_eq!(Labels::default(), Labels::for_locale(Locale::Es));
    }

    #[test]
    fn test_load_partial_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "game": {{ "player_step_ms": 150 }}, "ids": {{ "overlay": "game-overlay" }} }}"#
        )
        .unwrap();

        let config = OverlayConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.game.player_step_ms, 150);
        assert_eq!(config.game.autonomous_step_ms, 100);
        assert_eq!(config.ids.overlay, "game-overlay");
        assert_eq!(config.ids.exit, "snake-exit");
        assert_eq!(config.labels, Labels::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "game": {{ "max_steps_per_frame": 0 }} }}"#).unwrap();
        assert!(OverlayConfig::from_json_file(file.path()).is_err());
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = OverlayConfig::from_json_file(&dir.path().join("nope.json")).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }

    #[test]
    fn test_blank_id_rejected() {
        let mut config = OverlayConfig::default();
        config.ids.exit = " ".into();
        assert!(config.validate().is_err());
    }
}
