//! Ambient Snake - a self-driving Snake game behind a portfolio page
//!
//! This library provides:
//! - Core game logic: grid, time-aware A*, autopilot and fixed-step clock (game module)
//! - A small page model the game mounts on (page module)
//! - Keyboard and joystick input mediation (input module)
//! - Canvas drawing and theme colours (render module)
//! - The overlay controller tying it all to the page (overlay module)
//! - Session statistics (metrics module)
//! - The terminal host (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod overlay;
pub mod page;
pub mod render;
