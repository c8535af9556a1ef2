use super::surface::{Stroke, Surface};
use super::theme::Palette;
use crate::game::{GameState, Mode, Position};
use crate::page::{Point, Rect};

/// Everything a single draw needs
pub struct Scene<'a> {
    pub state: &'a GameState,
    /// Path the autopilot committed to, excluding the head
    pub plan: &'a [Position],
    pub mode: Mode,
    pub palette: &'a Palette,
}

/// Draws the board onto a surface
pub struct Renderer {
    cell: f64,
}

impl Renderer {
    pub fn new(cell_size: f64) -> Self {
        Self { cell: cell_size }
    }

    pub fn render(&self, surface: &mut dyn Surface, scene: &Scene) {
        surface.clear();
        let palette = scene.palette;
        let segments = scene.state.snake.segments();

        // Body, tail first so the head ends up on top
        let body = palette.snake.with_alpha(palette.body_alpha());
        for seg in segments.iter().rev() {
            surface.fill_round_rect(self.inset(*seg, 3.0), 5.0, body);
        }

        if let Some(head) = segments.front() {
            let color = palette.snake.with_alpha(palette.head_alpha());
            surface.fill_round_rect(self.inset(*head, 2.0), 6.0, color);
        }

        if let Some(food) = scene.state.food {
            let color = palette.food.with_alpha(palette.food_alpha());
            surface.fill_round_rect(self.inset(food, 6.0), 4.0, color);
        }

        self.render_plan(surface, scene);
    }

    /// Dashed line from the head through the committed plan
    fn render_plan(&self, surface: &mut dyn Surface, scene: &Scene) {
        if scene.mode == Mode::Player || scene.plan.is_empty() {
            return;
        }
        let Some(head) = scene.state.snake.segments().front() else {
            return;
        };

        let points: Vec<Point> = std::iter::once(*head)
            .chain(scene.plan.iter().copied())
            .map(|p| self.center(p))
            .collect();
        let stroke = Stroke {
            color: scene.palette.food.with_alpha(scene.palette.plan_alpha()),
            width: 3.0,
            dash: [6.0, 6.0],
        };
        surface.stroke_path(&points, stroke);
    }

    fn inset(&self, pos: Position, by: f64) -> Rect {
        Rect::new(
            f64::from(pos.x) * self.cell + by,
            f64::from(pos.y) * self.cell + by,
            self.cell - 2.0 * by,
            self.cell - 2.0 * by,
        )
    }

    fn center(&self, pos: Position) -> Point {
        Point::new(
            f64::from(pos.x) * self.cell + self.cell / 2.0,
            f64::from(pos.y) * self.cell + self.cell / 2.0,
        )
    }
}
