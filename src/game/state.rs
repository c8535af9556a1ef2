use std::collections::VecDeque;

use super::action::Direction;
use super::grid::Grid;

/// A cell on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Move position by delta
    pub fn moved_by(&self, dx: i32, dy: i32) -> Self {
        Self {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Move position in a direction
    pub fn moved_in_direction(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.delta();
        self.moved_by(dx, dy)
    }

    pub fn manhattan(&self, other: Position) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Direction of a unit step from self to other
    pub fn direction_to(&self, other: Position) -> Option<Direction> {
        Direction::from_delta(other.x - self.x, other.y - self.y)
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at the front
    body: VecDeque<Position>,
    /// Committed heading
    pub direction: Direction,
}

impl Snake {
    /// Create a new snake with given starting position and direction
    pub fn new(head: Position, direction: Direction, length: usize) -> Self {
        let (dx, dy) = direction.delta();
        let body = (0..length as i32)
            .map(|i| head.moved_by(-dx * i, -dy * i))
            .collect();

        Self { body, direction }
    }

    /// Build a snake from explicit segments, head first
    pub fn from_segments(segments: impl IntoIterator<Item = Position>, direction: Direction) -> Self {
        Self {
            body: segments.into_iter().collect(),
            direction,
        }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get the tail position (last segment)
    pub fn tail(&self) -> Position {
        self.body[self.body.len() - 1]
    }

    pub fn segments(&self) -> &VecDeque<Position> {
        &self.body
    }

    /// Whether a move to `next_head` lands on the body. The tail is excluded
    /// when it vacates this tick, i.e. when the move does not eat.
    pub fn hits_body(&self, next_head: Position, will_eat: bool) -> bool {
        let live = self.body.len().saturating_sub(usize::from(!will_eat));
        self.body.iter().take(live).any(|&s| s == next_head)
    }

    /// Prepend a new head
    pub fn push_head(&mut self, head: Position) {
        self.body.push_front(head);
    }

    /// Remove and return the tail
    pub fn pop_tail(&mut self) -> Option<Position> {
        self.body.pop_back()
    }

    /// Keep segments up to (excluding) the first one rejected by `keep`
    pub fn truncate_at(&mut self, keep: impl Fn(Position) -> bool) {
        let cut = self
            .body
            .iter()
            .position(|&s| !keep(s))
            .unwrap_or(self.body.len());
        self.body.truncate(cut);
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// True if some cell appears twice or two neighbours are not adjacent
    pub fn is_broken(&self) -> bool {
        let adjacent = self
            .body
            .iter()
            .zip(self.body.iter().skip(1))
            .all(|(a, b)| a.manhattan(*b) == 1);
        let mut cells: Vec<_> = self.body.iter().map(|p| (p.x, p.y)).collect();
        cells.sort_unstable();
        cells.dedup();
        !adjacent || cells.len() != self.body.len()
    }
}

/// Who is steering the snake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Autonomous,
    Player,
}

/// Complete game state. Only the engine tick mutates grid, snake and food;
/// input only writes `next_direction` and `turn_queued`.
#[derive(Debug, Clone, PartialEq)]
pub struct GameState {
    pub snake: Snake,
    pub food: Option<Position>,
    pub grid: Grid,
    /// Heading consumed at the next tick
    pub next_direction: Direction,
    /// A turn is already queued for the upcoming tick
    pub turn_queued: bool,
    pub score: u32,
    pub steps: u32,
}

impl GameState {
    /// Create a new game state; the grid is built from the snake
    pub fn new(snake: Snake, food: Option<Position>, cols: usize, rows: usize) -> Self {
        let mut grid = Grid::new(cols, rows);
        grid.rebuild(&snake);
        let next_direction = snake.direction;

        Self {
            snake,
            food,
            grid,
            next_direction,
            turn_queued: false,
            score: 0,
            steps: 0,
        }
    }

    pub fn cols(&self) -> usize {
        self.grid.cols()
    }

    pub fn rows(&self) -> usize {
        self.grid.rows()
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        self.grid.in_bounds(pos)
    }

    pub fn is_food(&self, pos: Position) -> bool {
        self.food == Some(pos)
    }

    /// Drop any queued turn and point the queue at the current heading
    pub fn reset_turn_queue(&mut self) {
        self.next_direction = self.snake.direction;
        self.turn_queued = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_movement() {
        let pos = Position::new(5, 5);
        assert_eq!(pos.moved_by(1, 0), Position::new(6, 5));
        assert_eq!(pos.moved_by(-1, 0), Position::new(4, 5));
        assert_eq!(pos.moved_by(0, 1), Position::new(5, 6));
        assert_eq!(pos.moved_by(0, -1), Position::new(5, 4));
        assert_eq!(pos.direction_to(Position::new(5, 4)), Some(Direction::Up));
        assert_eq!(pos.direction_to(Position::new(7, 5)), None);
    }

    #[test]
    fn test_snake_creation() {
        let snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(5, 5));
        assert_eq!(snake.segments()[1], Position::new(4, 5));
        assert_eq!(snake.tail(), Position::new(3, 5));
        assert!(!snake.is_broken());
    }

    #[test]
    fn test_hits_body_excludes_vacating_tail() {
        // Square loop: head (1,0) with tail (0,0) right behind the next move
        let snake = Snake::from_segments(
            [
                Position::new(1, 0),
                Position::new(1, 1),
                Position::new(0, 1),
                Position::new(0, 0),
            ],
            Direction::Up,
        );
        let tail = Position::new(0, 0);
        assert!(!snake.hits_body(tail, false));
        assert!(snake.hits_body(tail, true));
        assert!(snake.hits_body(Position::new(0, 1), false));
        assert!(!snake.hits_body(Position::new(2, 0), false));
    }

    #[test]
    fn test_push_and_pop() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right, 3);
        snake.push_head(Position::new(6, 5));
        assert_eq!(snake.pop_tail(), Some(Position::new(3, 5)));
        assert_eq!(snake.len(), 3);
        assert_eq!(snake.head(), Position::new(6, 5));
    }

    #[test]
    fn test_truncate_at_first_rejected_segment() {
        let mut snake = Snake::new(Position::new(5, 5), Direction::Right, 4);
        snake.truncate_at(|p| p.x >= 4);
        assert_eq!(snake.len(), 2);
        assert_eq!(snake.tail(), Position::new(4, 5));

        snake.truncate_at(|p| p.x > 10);
        assert!(snake.is_empty());
    }

    #[test]
    fn test_broken_snake_detection() {
        let gap = Snake::from_segments([Position::new(0, 0), Position::new(2, 0)], Direction::Left);
        assert!(gap.is_broken());

        let overlap = Snake::from_segments(
            [Position::new(0, 0), Position::new(1, 0), Position::new(0, 0)],
            Direction::Left,
        );
        assert!(overlap.is_broken());
    }

    #[test]
    fn test_state_builds_grid_from_snake() {
        let state = GameState::new(
            Snake::new(Position::new(5, 5), Direction::Right, 3),
            Some(Position::new(9, 9)),
            20,
            20,
        );

        assert!(state.grid.is_consistent_with(&state.snake));
        assert_eq!(state.next_direction, Direction::Right);
        assert!(state.is_in_bounds(Position::new(19, 19)));
        assert!(!state.is_in_bounds(Position::new(20, 0)));
        assert!(state.is_food(Position::new(9, 9)));
    }
}
