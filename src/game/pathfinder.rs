//! Time-aware A* over the occupancy grid
//!
//! A cell held by the snake is not a permanent wall: the segment `j` places
//! from the head of a snake of length `L` leaves its cell after `L - j` ticks,
//! since exactly one tail segment vacates per tick. The search admits an
//! occupied neighbour once the mover's arrival time reaches that tick, which
//! lets paths thread through space the tail is about to release.

use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::action::Direction;
use super::grid::Grid;
use super::state::{Position, Snake};

/// Extra cost of a step that leaves the current heading. Smaller than one
/// step, so it only breaks ties between equally short paths.
const TURN_PENALTY: f64 = 1e-3;

/// Ticks until each cell is vacated, zero for cells the body does not hold
#[derive(Debug, Clone)]
pub struct FreeTimes {
    ticks: Vec<u32>,
}

impl FreeTimes {
    /// No cell is held by anyone
    pub fn none(grid: &Grid) -> Self {
        Self {
            ticks: vec![0; grid.area()],
        }
    }

    pub fn for_snake(grid: &Grid, snake: &Snake) -> Self {
        let mut times = Self::none(grid);
        let len = snake.len();
        for (j, &segment) in snake.segments().iter().enumerate() {
            if grid.in_bounds(segment) {
                times.ticks[grid.index(segment)] = (len - j) as u32;
            }
        }
        times
    }

    pub fn at(&self, index: usize) -> u32 {
        self.ticks[index]
    }
}

#[derive(Debug, Clone, Copy)]
struct OpenNode {
    f: f64,
    index: usize,
}

impl PartialEq for OpenNode {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for OpenNode {}

impl Ord for OpenNode {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse ordering for min-heap behavior
        other
            .f
            .total_cmp(&self.f)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for OpenNode {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Shortest-path search over one grid snapshot
pub struct Pathfinder<'a> {
    grid: &'a Grid,
    free_at: FreeTimes,
    heading: Direction,
}

impl<'a> Pathfinder<'a> {
    /// Search around `snake`, preferring its current heading
    pub fn new(grid: &'a Grid, snake: &Snake) -> Self {
        Self {
            grid,
            free_at: FreeTimes::for_snake(grid, snake),
            heading: snake.direction,
        }
    }

    /// Search a grid whose marks never clear
    pub fn unobstructed(grid: &'a Grid, heading: Direction) -> Self {
        Self {
            grid,
            free_at: FreeTimes::none(grid),
            heading,
        }
    }

    pub fn free_times(&self) -> &FreeTimes {
        &self.free_at
    }

    /// Cells from the step after `start` through `goal`, or `None` when there
    /// is no goal or it cannot be reached. `start == goal` yields an empty path.
    pub fn find_path(&self, start: Position, goal: Option<Position>) -> Option<Vec<Position>> {
        let goal = goal?;
        let grid = self.grid;
        if !grid.in_bounds(start) || !grid.in_bounds(goal) {
            return None;
        }

        let n = grid.area();
        let mut cost = vec![f64::INFINITY; n];
        let mut steps = vec![u32::MAX; n];
        let mut prev = vec![usize::MAX; n];
        let mut closed = vec![false; n];
        let mut open = BinaryHeap::new();

        let s = grid.index(start);
        cost[s] = 0.0;
        steps[s] = 0;
        open.push(OpenNode {
            f: start.manhattan(goal) as f64,
            index: s,
        });

        while let Some(OpenNode { index: ci, .. }) = open.pop() {
            if closed[ci] {
                continue;
            }
            closed[ci] = true;

            let current = grid.position(ci);
            if current == goal {
                return Some(Self::reconstruct(grid, &prev, s, ci));
            }

            let arrive = steps[ci] + 1;
            for next in grid.neighbours(current) {
                let ni = grid.index(next);
                if closed[ni] {
                    continue;
                }

                // Occupied now, but enterable once vacated by arrival time
                if grid.is_occupied(next) && arrive < self.free_at.at(ni) {
                    continue;
                }

                let turn = if current.direction_to(next) == Some(self.heading) {
                    0.0
                } else {
                    TURN_PENALTY
                };
                let tentative = cost[ci] + 1.0 + turn;
                if tentative < cost[ni] {
                    cost[ni] = tentative;
                    steps[ni] = arrive;
                    prev[ni] = ci;
                    open.push(OpenNode {
                        f: tentative + next.manhattan(goal) as f64,
                        index: ni,
                    });
                }
            }
        }

        None
    }

    fn reconstruct(grid: &Grid, prev: &[usize], start: usize, goal: usize) -> Vec<Position> {
        let mut path = Vec::new();
        let mut at = goal;
        while at != start {
            path.push(grid.position(at));
            at = prev[at];
        }
        path.reverse();
        path
    }
}
