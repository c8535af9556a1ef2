use super::state::{Position, Snake};

/// Flat occupancy buffer, one byte per cell
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cols: usize,
    rows: usize,
    cells: Vec<u8>,
    occupied: usize,
}

impl Grid {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols,
            rows,
            cells: vec![0; cols * rows],
            occupied: 0,
        }
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Total number of cells
    pub fn area(&self) -> usize {
        self.cols * self.rows
    }

    /// Number of cells currently marked
    pub fn occupied_count(&self) -> usize {
        self.occupied
    }

    pub fn in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.y >= 0 && (pos.x as usize) < self.cols && (pos.y as usize) < self.rows
    }

    /// Flat index of an in-bounds cell
    pub fn index(&self, pos: Position) -> usize {
        debug_assert!(self.in_bounds(pos), "{pos:?} outside {}x{}", self.cols, self.rows);
        pos.y as usize * self.cols + pos.x as usize
    }

    /// Position of a flat index
    pub fn position(&self, index: usize) -> Position {
        Position::new((index % self.cols) as i32, (index / self.cols) as i32)
    }

    pub fn occupied(&self, x: i32, y: i32) -> bool {
        self.cells[self.index(Position::new(x, y))] != 0
    }

    pub fn is_occupied(&self, pos: Position) -> bool {
        self.occupied(pos.x, pos.y)
    }

    pub fn set_occupied(&mut self, x: i32, y: i32, value: bool) {
        let i = self.index(Position::new(x, y));
        let next = u8::from(value);
        match (self.cells[i], next) {
            (0, 1) => self.occupied += 1,
            (1, 0) => self.occupied -= 1,
            _ => {}
        }
        self.cells[i] = next;
    }

    /// Clear every cell and mark each in-bounds segment
    pub fn rebuild(&mut self, snake: &Snake) {
        self.cells.iter_mut().for_each(|c| *c = 0);
        self.occupied = 0;
        for &segment in snake.segments() {
            if self.in_bounds(segment) {
                self.set_occupied(segment.x, segment.y, true);
            }
        }
    }

    /// Reallocate for new dimensions; every cell starts free
    pub fn resize(&mut self, cols: usize, rows: usize) {
        *self = Self::new(cols, rows);
    }

    /// True when every segment is marked and nothing else is
    pub fn is_consistent_with(&self, snake: &Snake) -> bool {
        self.occupied == snake.len()
            && snake
                .segments()
                .iter()
                .all(|&s| self.in_bounds(s) && self.is_occupied(s))
    }

    /// In-bounds 4-neighbours of a cell, in expansion order
    pub fn neighbours(&self, pos: Position) -> impl Iterator<Item = Position> + '_ {
        super::Direction::ALL
            .into_iter()
            .map(move |d| pos.moved_in_direction(d))
            .filter(move |&n| self.in_bounds(n))
    }
}
