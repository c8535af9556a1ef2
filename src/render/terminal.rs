//! Paints a [`DisplayList`] into a ratatui buffer with Braille dots.
//!
//! Alpha is approximated by compositing every colour over the view's
//! background, since terminal cells have no transparency.

use ratatui::{
    buffer::Buffer,
    layout::Rect as Area,
    style::Color,
    symbols::Marker,
    widgets::{
        canvas::{Canvas, Context, Line},
        Widget,
    },
};

use super::surface::{DisplayList, DrawCommand, Stroke, Surface};
use super::theme::Rgba;
use crate::page::{Point, Rect};

pub fn to_color(color: Rgba) -> Color {
    Color::Rgb(color.r, color.g, color.b)
}

/// A display list shown in a terminal area
pub struct CanvasView<'a> {
    list: &'a DisplayList,
    background: Rgba,
}

impl<'a> CanvasView<'a> {
    pub fn new(list: &'a DisplayList, background: Rgba) -> Self {
        Self { list, background }
    }
}

impl Widget for CanvasView<'_> {
    fn render(self, area: Area, buf: &mut Buffer) {
        let (width, height) = self.list.size();
        if width <= 0.0 || height <= 0.0 || area.width == 0 || area.height == 0 {
            return;
        }
        // Braille cells are 2x4 dots
        let dot = height / (f64::from(area.height) * 4.0);
        let background = self.background;
        let commands = self.list.commands();

        Canvas::default()
            .marker(Marker::Braille)
            .background_color(to_color(background))
            .x_bounds([0.0, width])
            .y_bounds([0.0, height])
            .paint(|ctx| {
                for command in commands {
                    match command {
                        DrawCommand::FillRoundRect {
                            rect,
                            radius,
                            color,
                        } => {
                            let color = to_color(color.over(background));
                            fill_round_rect(ctx, height, *rect, *radius, color, dot);
                        }
                        DrawCommand::StrokePath { points, stroke } => {
                            let color = to_color(stroke.color.over(background));
                            for (a, b) in dashes(points, stroke) {
                                ctx.draw(&Line {
                                    x1: a.x,
                                    y1: height - a.y,
                                    x2: b.x,
                                    y2: height - b.y,
                                    color,
                                });
                            }
                        }
                    }
                }
            })
            .render(area, buf);
    }
}

/// Scanline fill; the canvas y axis points up
fn fill_round_rect(ctx: &mut Context, height: f64, rect: Rect, radius: f64, color: Color, dot: f64) {
    let step = dot.max(0.5);
    let r = radius.min(rect.width / 2.0).min(rect.height / 2.0).max(0.0);
    let mut y = rect.y;
    while y <= rect.y + rect.height {
        let from_edge = (y - rect.y).min(rect.y + rect.height - y);
        let inset = if from_edge < r {
            let d = r - from_edge;
            r - (r * r - d * d).max(0.0).sqrt()
        } else {
            0.0
        };
        ctx.draw(&Line {
            x1: rect.x + inset,
            y1: height - y,
            x2: rect.x + rect.width - inset,
            y2: height - y,
            color,
        });
        y += step;
    }
}

/// Split a polyline into the visible pieces of its dash pattern
pub fn dashes(points: &[Point], stroke: &Stroke) -> Vec<(Point, Point)> {
    let [on, off] = stroke.dash;
    if on <= 0.0 {
        return Vec::new();
    }
    let mut pieces = Vec::new();
    let mut drawing = true;
    let mut left = on;

    for pair in points.windows(2) {
        let (a, b) = (pair[0], pair[1]);
        let len = (b.x - a.x).hypot(b.y - a.y);
        if len == 0.0 {
            continue;
        }
        let mut t = 0.0;
        while t < len {
            let run = left.min(len - t);
            if drawing {
                let lerp = |s: f64| Point::new(a.x + (b.x - a.x) * s / len, a.y + (b.y - a.y) * s / len);
                pieces.push((lerp(t), lerp(t + run)));
            }
            t += run;
            left -= run;
            if left <= 0.0 {
                drawing = !drawing || off <= 0.0;
                left = if drawing { on } else { off };
            }
        }
    }
    pieces
}
