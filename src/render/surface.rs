use super::theme::Rgba;
use crate::page::{Point, Rect};

/// Dashed stroke settings
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
    /// On and off lengths
    pub dash: [f64; 2],
}

/// A 2D drawing target in CSS pixels
pub trait Surface {
    /// Size in CSS pixels
    fn size(&self) -> (f64, f64);
    fn clear(&mut self);
    fn fill_round_rect(&mut self, rect: Rect, radius: f64, color: Rgba);
    fn stroke_path(&mut self, points: &[Point], stroke: Stroke);
}

#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    FillRoundRect {
        rect: Rect,
        radius: f64,
        color: Rgba,
    },
    StrokePath {
        points: Vec<Point>,
        stroke: Stroke,
    },
}

/// A canvas that records what was drawn since the last clear
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DisplayList {
    width: f64,
    height: f64,
    /// Backing-store pixels per CSS pixel
    scale: f64,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self {
            scale: 1.0,
            ..Self::default()
        }
    }

    /// Size the backing store; drops whatever was drawn
    pub fn resize(&mut self, width: f64, height: f64, scale: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
        self.scale = scale.max(1.0);
        self.commands.clear();
    }

    /// Backing-store size in device pixels
    pub fn pixel_size(&self) -> (u32, u32) {
        (
            (self.width * self.scale) as u32,
            (self.height * self.scale) as u32,
        )
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }
}

impl Surface for DisplayList {
    fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.commands.clear();
    }

    fn fill_round_rect(&mut self, rect: Rect, radius: f64, color: Rgba) {
        self.commands.push(DrawCommand::FillRoundRect {
            rect,
            radius,
            color,
        });
    }

    fn stroke_path(&mut self, points: &[Point], stroke: Stroke) {
        if points.len() < 2 {
            return;
        }
        self.commands.push(DrawCommand::StrokePath {
            points: points.to_vec(),
            stroke,
        });
    }
}
