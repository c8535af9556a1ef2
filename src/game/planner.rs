//! Autopilot for the ambient snake
//!
//! Each tick the autopilot either keeps following the path it committed to,
//! or replans in priority order: a path to the food that still leaves the
//! tail reachable afterwards, a path to its own tail, and finally the free
//! neighbour with the most reachable space behind it.

use std::collections::VecDeque;

use log::debug;

use super::action::Direction;
use super::grid::Grid;
use super::pathfinder::Pathfinder;
use super::state::{GameState, Position, Snake};

/// Which rule produced a plan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    SeekFood,
    SeekTail,
    Fallback,
}

/// Outcome of a replan
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub direction: Direction,
    pub strategy: Strategy,
}

/// Committed plan plus the survival flag
#[derive(Debug, Clone, Default)]
pub struct Autopilot {
    plan: VecDeque<Position>,
    survival: bool,
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cells still to be traversed, next step first
    pub fn plan(&self) -> &VecDeque<Position> {
        &self.plan
    }

    /// No tail-safe food path was found at the last replan
    pub fn is_survival(&self) -> bool {
        self.survival
    }

    pub fn clear(&mut self) {
        self.plan.clear();
    }

    /// Forget everything, including the survival flag
    pub fn reset(&mut self) {
        self.plan.clear();
        self.survival = false;
    }

    /// Direction of the committed plan's next step if it is still safe.
    /// An unsafe or malformed first step drops the whole plan.
    pub fn follow(&mut self, state: &GameState) -> Option<Direction> {
        let &step = self.plan.front()?;
        let head = state.snake.head();

        let safe = state.is_in_bounds(step)
            && !state.snake.hits_body(step, state.is_food(step));
        match head.direction_to(step) {
            Some(direction) if safe => Some(direction),
            _ => {
                debug!("dropping plan: first step {step:?} no longer safe from {head:?}");
                self.plan.clear();
                None
            }
        }
    }

    /// Pick a new plan. `None` means every neighbour is blocked.
    pub fn replan(&mut self, state: &GameState) -> Option<Decision> {
        let snake = &state.snake;
        let head = snake.head();
        let finder = Pathfinder::new(&state.grid, snake);

        self.survival = false;
        if let Some(path) = finder.find_path(head, state.food) {
            if !path.is_empty() && tail_reachable_after(state, &path) {
                return Some(self.commit(snake, path, Strategy::SeekFood));
            }
        }

        self.survival = true;
        if let Some(path) = finder.find_path(head, Some(snake.tail())) {
            if !path.is_empty() {
                return Some(self.commit(snake, path, Strategy::SeekTail));
            }
        }

        let best = safe_moves(state)
            .into_iter()
            .map(|dir| {
                let cell = head.moved_in_direction(dir);
                let freed = (!state.is_food(cell)).then(|| snake.tail());
                (dir, reachable_area(&state.grid, cell, freed))
            })
            .fold(None, |best: Option<(Direction, usize)>, (dir, area)| match best {
                Some((_, best_area)) if best_area >= area => best,
                _ => Some((dir, area)),
            })?;

        let cell = head.moved_in_direction(best.0);
        Some(self.commit(snake, vec![cell], Strategy::Fallback))
    }

    /// Account for a move that has just been executed
    pub fn advance(&mut self, new_head: Position) {
        if self.plan.front() == Some(&new_head) {
            self.plan.pop_front();
        } else {
            self.plan.clear();
        }
    }

    /// Leave survival as soon as a tail-safe food path exists again
    pub fn recheck_survival(&mut self, state: &GameState) {
        if !self.survival {
            return;
        }
        let finder = Pathfinder::new(&state.grid, &state.snake);
        if let Some(path) = finder.find_path(state.snake.head(), state.food) {
            if !path.is_empty() && tail_reachable_after(state, &path) {
                debug!("leaving survival mode at {:?}", state.snake.head());
                self.survival = false;
            }
        }
    }

    fn commit(&mut self, snake: &Snake, path: Vec<Position>, strategy: Strategy) -> Decision {
        let head = snake.head();
        debug_assert!(
            head.direction_to(path[0]).is_some(),
            "plan must start next to the head"
        );
        let direction = head.direction_to(path[0]).unwrap_or(snake.direction);
        self.plan = path.into();
        Decision {
            direction,
            strategy,
        }
    }
}

/// Snake after following `path`, growing on the cell holding food
pub fn simulate_path(snake: &Snake, path: &[Position], food: Option<Position>) -> Snake {
    let mut future = snake.clone();
    for &cell in path {
        if let Some(direction) = future.head().direction_to(cell) {
            future.direction = direction;
        }
        future.push_head(cell);
        if food != Some(cell) {
            future.pop_tail();
        }
    }
    future
}

/// Whether the snake can still reach its own tail after taking `path`
pub fn tail_reachable_after(state: &GameState, path: &[Position]) -> bool {
    if path.is_empty() {
        return true;
    }
    let future = simulate_path(&state.snake, path, state.food);
    let mut grid = Grid::new(state.cols(), state.rows());
    grid.rebuild(&future);

    // The tail stays occupied; its free_at of 1 admits it from the first step
    let tail = future.tail();
    Pathfinder::new(&grid, &future)
        .find_path(future.head(), Some(tail))
        .is_some_and(|p| !p.is_empty())
}

/// In-bounds free neighbours of the head, current heading first, the rest
/// ordered by distance to food
pub fn safe_moves(state: &GameState) -> Vec<Direction> {
    let head = state.snake.head();
    let heading = state.snake.direction;

    let mut moves: Vec<Direction> = Direction::ALL
        .into_iter()
        .filter(|&d| {
            let cell = head.moved_in_direction(d);
            state.is_in_bounds(cell) && !state.grid.is_occupied(cell)
        })
        .collect();

    moves.sort_by_key(|&d| {
        let cell = head.moved_in_direction(d);
        let food_distance = state.food.map_or(0, |f| cell.manhattan(f));
        (d != heading, food_distance)
    });
    moves
}

/// Flood-fill count of free cells reachable from `from`, treating `freed`
/// as empty
pub fn reachable_area(grid: &Grid, from: Position, freed: Option<Position>) -> usize {
    let open = |p: Position| !grid.is_occupied(p) || Some(p) == freed;
    if !grid.in_bounds(from) || !open(from) {
        return 0;
    }

    let mut visited = vec![false; grid.area()];
    let mut queue = VecDeque::from([from]);
    visited[grid.index(from)] = true;
    let mut count = 1;

    while let Some(cell) = queue.pop_front() {
        for next in grid.neighbours(cell) {
            let i = grid.index(next);
            if !visited[i] && open(next) {
                visited[i] = true;
                count += 1;
                queue.push_back(next);
            }
        }
    }

    count
}
