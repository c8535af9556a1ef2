use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::{
    action::Direction,
    config::GameConfig,
    planner::{Autopilot, Strategy},
    state::{GameState, Mode, Position, Snake},
};

/// Why the game started over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetReason {
    /// Snake hit a wall
    Wall,
    /// Snake hit itself
    SelfCollision,
    /// No free neighbour was left
    Trapped,
    /// The last free cell was eaten
    BoardFull,
    /// Explicit restart
    Restart,
    /// The board shrank past the head
    Resize,
}

/// What a tick did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Moved,
    Ate,
    Reset(ResetReason),
}

/// Result of one tick, including the plan the renderer should draw
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub outcome: TickOutcome,
    /// Set when the autopilot replanned this tick
    pub strategy: Option<Strategy>,
    /// Remaining committed plan after the move
    pub plan: Vec<Position>,
    /// The grid had drifted from the snake and was rebuilt
    pub rebuilt_grid: bool,
}

/// The game engine that handles all game logic
pub struct GameEngine {
    config: GameConfig,
    rng: StdRng,
    autopilot: Autopilot,
}

impl GameEngine {
    /// Create a new game engine with the given configuration
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic food placement
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: GameConfig, rng: StdRng) -> Self {
        Self {
            config,
            rng,
            autopilot: Autopilot::new(),
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn autopilot(&self) -> &Autopilot {
        &self.autopilot
    }

    /// Committed plan as owned cells
    pub fn plan(&self) -> Vec<Position> {
        self.autopilot.plan().iter().copied().collect()
    }

    /// Fresh game on a `cols` x `rows` board
    pub fn reset(&mut self, cols: usize, rows: usize) -> GameState {
        let start = Position::new((cols / 3) as i32, (rows / 2) as i32);
        let snake = Snake::new(start, Direction::Right, self.config.initial_snake_length);

        let mut state = GameState::new(snake, None, cols, rows);
        self.place_food(&mut state);
        self.autopilot.reset();
        state
    }

    /// Start over on the same board
    pub fn restart(&mut self, state: &mut GameState, reason: ResetReason) {
        debug!(
            "reset ({reason:?}) at length {} after {} steps",
            state.snake.len(),
            state.steps
        );
        *state = self.reset(state.cols(), state.rows());
    }

    /// Adopt new board dimensions, keeping as much of the snake as fits
    pub fn resize(&mut self, state: &mut GameState, cols: usize, rows: usize) {
        if state.cols() != cols || state.rows() != rows {
            state.grid.resize(cols, rows);
        }

        let grid = &state.grid;
        state.snake.truncate_at(|p| grid.in_bounds(p));
        if state.snake.is_empty() {
            debug!("resize to {cols}x{rows} dropped the head");
            *state = self.reset(cols, rows);
            return;
        }

        state.grid.rebuild(&state.snake);
        let food_lost = state
            .food
            .map_or(true, |f| !state.grid.in_bounds(f) || state.grid.is_occupied(f));
        if food_lost {
            self.place_food(state);
        }
        self.autopilot.clear();
    }

    /// Put food on a random free cell, or none if the board is full
    pub fn place_food(&mut self, state: &mut GameState) {
        let grid = &state.grid;
        if state.snake.len() >= grid.area() {
            state.food = None;
            return;
        }

        for _ in 0..grid.area() * 2 {
            let pos = Position::new(
                self.rng.gen_range(0..grid.cols()) as i32,
                self.rng.gen_range(0..grid.rows()) as i32,
            );
            if !grid.is_occupied(pos) {
                state.food = Some(pos);
                return;
            }
        }

        // Crowded board: pick among the free cells directly
        let free: Vec<usize> = (0..grid.area())
            .filter(|&i| !grid.is_occupied(grid.position(i)))
            .collect();
        state.food = match free.len() {
            0 => None,
            n => Some(grid.position(free[self.rng.gen_range(0..n)])),
        };
    }

    /// Advance the game by one cell
    pub fn tick(&mut self, state: &mut GameState, mode: Mode) -> TickReport {
        let rebuilt_grid = !state.grid.is_consistent_with(&state.snake);
        if rebuilt_grid {
            debug!("grid drifted from snake, rebuilding");
            state.grid.rebuild(&state.snake);
        }

        if state.snake.is_empty() {
            return self.reset_report(state, ResetReason::Restart, rebuilt_grid);
        }

        let head = state.snake.head();
        let mut strategy = None;

        if mode == Mode::Autonomous {
            match self.autopilot.follow(state) {
                Some(direction) => state.next_direction = direction,
                None => match self.autopilot.replan(state) {
                    Some(decision) => {
                        state.next_direction = decision.direction;
                        strategy = Some(decision.strategy);
                    }
                    None => return self.reset_report(state, ResetReason::Trapped, rebuilt_grid),
                },
            }
        }

        // Execute the move
        state.snake.direction = state.next_direction;
        let next_head = head.moved_in_direction(state.snake.direction);
        if !state.is_in_bounds(next_head) {
            return self.reset_report(state, ResetReason::Wall, rebuilt_grid);
        }

        let will_eat = state.is_food(next_head);
        if state.snake.hits_body(next_head, will_eat) {
            return self.reset_report(state, ResetReason::SelfCollision, rebuilt_grid);
        }

        if !will_eat {
            if let Some(old) = state.snake.pop_tail() {
                state.grid.set_occupied(old.x, old.y, false);
            }
        }
        state.snake.push_head(next_head);
        state.grid.set_occupied(next_head.x, next_head.y, true);
        state.steps += 1;
        self.autopilot.advance(next_head);

        let outcome = if will_eat {
            state.score += 1;
            // Eating changes the topology: replan next tick
            self.autopilot.clear();
            if state.snake.len() >= state.grid.area() {
                return self.reset_report(state, ResetReason::BoardFull, rebuilt_grid);
            }
            self.place_food(state);
            TickOutcome::Ate
        } else {
            TickOutcome::Moved
        };

        if mode == Mode::Autonomous {
            self.autopilot.recheck_survival(state);
        }
        state.turn_queued = false;

        TickReport {
            outcome,
            strategy,
            plan: self.plan(),
            rebuilt_grid,
        }
    }

    fn reset_report(
        &mut self,
        state: &mut GameState,
        reason: ResetReason,
        rebuilt_grid: bool,
    ) -> TickReport {
        self.restart(state, reason);
        TickReport {
            outcome: TickOutcome::Reset(reason),
            strategy: None,
            plan: Vec::new(),
            rebuilt_grid,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: i32, y: i32) -> Position {
        Position::new(x, y)
    }

    fn engine() -> GameEngine {
        GameEngine::with_seed(GameConfig::default(), 7)
    }

    fn assert_fresh(state: &GameState) {
        assert_eq!(state.snake.len(), 3);
        assert!(state.snake.segments().iter().all(|&s| state.is_in_bounds(s)));
        let food = state.food.expect("food placed");
        assert!(state.is_in_bounds(food));
        assert!(!state.snake.segments().contains(&food));
        assert!(state.grid.is_consistent_with(&state.snake));
        assert_eq!(state.score, 0);
        assert_eq!(state.steps, 0);
    }

    #[test]
    fn test_reset() {
        let mut engine = engine();
        let state = engine.reset(20, 10);

        assert_fresh(&state);
        assert_eq!(state.snake.head(), p(6, 5));
        assert_eq!(state.snake.direction, Direction::Right);
        assert!(engine.plan().is_empty());
    }

    #[test]
    fn test_reset_from_any_state_is_fresh() {
        let mut engine = engine();
        let mut state = engine.reset(12, 10);
        for _ in 0..150 {
            engine.tick(&mut state, Mode::Autonomous);
        }
        state.score = 42;

        engine.restart(&mut state, ResetReason::Restart);
        assert_fresh(&state);

        engine.restart(&mut state, ResetReason::Restart);
        assert_fresh(&state);
    }

    #[test]
    fn test_autonomous_ticks_keep_grid_and_snake_consistent() {
        let mut engine = engine();
        let mut state = engine.reset(12, 10);

        for _ in 0..3000 {
            let report = engine.tick(&mut state, Mode::Autonomous);

            assert!(!report.rebuilt_grid, "grid drifted during normal play");
            assert!(state.grid.is_consistent_with(&state.snake));
            assert!(!state.snake.is_broken());
            if let Some(food) = state.food {
                assert!(!state.grid.is_occupied(food));
            }
            if let Some(first) = report.plan.first() {
                assert_eq!(state.snake.head().manhattan(*first), 1);
            }
        }
    }

    #[test]
    fn test_autopilot_eats() {
        let mut engine = engine();
        let mut state = engine.reset(12, 10);

        let ate = (0..500)
            .map(|_| engine.tick(&mut state, Mode::Autonomous))
            .filter(|r| r.outcome == TickOutcome::Ate)
            .count();

        assert!(ate >= 5, "autopilot only ate {ate} times");
    }

    #[test]
    fn test_player_tick_follows_queued_direction() {
        let mut engine = engine();
        let mut state = engine.reset(20, 10);
        state.food = Some(p(0, 0));
        state.next_direction = Direction::Down;
        state.turn_queued = true;

        let report = engine.tick(&mut state, Mode::Player);

        assert_eq!(report.outcome, TickOutcome::Moved);
        assert_eq!(report.strategy, None);
        assert_eq!(state.snake.head(), p(6, 6));
        assert_eq!(state.snake.direction, Direction::Down);
        assert!(!state.turn_queued);
    }

    #[test]
    fn test_food_consumption() {
        let mut engine = engine();
        let mut state = engine.reset(20, 10);
        state.food = Some(p(7, 5));

        let report = engine.tick(&mut state, Mode::Player);

        assert_eq!(report.outcome, TickOutcome::Ate);
        assert_eq!(state.snake.len(), 4);
        assert_eq!(state.score, 1);
        assert_ne!(state.food, Some(p(7, 5)));
        assert!(report.plan.is_empty());
        assert!(state.grid.is_consistent_with(&state.snake));
    }

    #[test]
    fn test_wall_collision_resets() {
        let mut engine = engine();
        let snake = Snake::from_segments([p(0, 5), p(1, 5), p(2, 5)], Direction::Left);
        let mut state = GameState::new(snake, Some(p(8, 8)), 10, 10);

        let report = engine.tick(&mut state, Mode::Player);

        assert_eq!(report.outcome, TickOutcome::Reset(ResetReason::Wall));
        assert_fresh(&state);
    }

    #[test]
    fn test_self_collision_resets() {
        // Head at (2,1) turning up into its own neck loop
        let snake = Snake::from_segments(
            [p(2, 1), p(3, 1), p(3, 0), p(2, 0), p(1, 0)],
            Direction::Left,
        );
        let mut engine = engine();
        let mut state = GameState::new(snake, Some(p(8, 8)), 10, 10);
        state.next_direction = Direction::Up;

        let report = engine.tick(&mut state, Mode::Player);

        assert_eq!(report.outcome, TickOutcome::Reset(ResetReason::SelfCollision));
        assert_fresh(&state);
    }

    #[test]
    fn test_moving_into_vacating_tail_is_allowed() {
        let snake = Snake::from_segments([p(1, 0), p(1, 1), p(0, 1), p(0, 0)], Direction::Up);
        let mut engine = engine();
        let mut state = GameState::new(snake, Some(p(8, 8)), 10, 10);
        state.next_direction = Direction::Left;

        let report = engine.tick(&mut state, Mode::Player);

        assert_eq!(report.outcome, TickOutcome::Moved);
        assert_eq!(state.snake.head(), p(0, 0));
        assert!(state.grid.is_consistent_with(&state.snake));
    }

    #[test]
    fn test_trapped_snake_resets() {
        let snake = Snake::from_segments(
            [
                p(1, 1),
                p(1, 0),
                p(0, 0),
                p(0, 1),
                p(0, 2),
                p(1, 2),
                p(2, 2),
                p(2, 1),
                p(2, 0),
            ],
            Direction::Up,
        );
        let mut engine = engine();
        let mut state = GameState::new(snake, Some(p(8, 6)), 10, 8);

        let report = engine.tick(&mut state, Mode::Autonomous);

        assert_eq!(report.outcome, TickOutcome::Reset(ResetReason::Trapped));
        assert_fresh(&state);
    }

    #[test]
    fn test_filling_the_board_resets() {
        let mut config = GameConfig::default();
        config.initial_snake_length = 1;
        let mut engine = GameEngine::with_seed(config, 1);
        let snake = Snake::from_segments([p(1, 0), p(0, 0)], Direction::Right);
        let mut state = GameState::new(snake, Some(p(2, 0)), 3, 1);

        let report = engine.tick(&mut state, Mode::Player);

        assert_eq!(report.outcome, TickOutcome::Reset(ResetReason::BoardFull));
        assert_eq!(state.snake.len(), 1);
    }

    #[test]
    fn test_desync_is_repaired() {
        let mut engine = engine();
        let mut state = engine.reset(12, 10);
        let tail = state.snake.tail();
        state.grid.set_occupied(tail.x, tail.y, false);
        state.grid.set_occupied(11, 9, true);

        let report = engine.tick(&mut state, Mode::Autonomous);

        assert!(report.rebuilt_grid);
        assert!(state.grid.is_consistent_with(&state.snake));
    }

    #[test]
    fn test_plan_is_followed_across_ticks() {
        let mut engine = engine();
        let mut state = engine.reset(20, 10);
        state.food = Some(p(12, 5));

        let first = engine.tick(&mut state, Mode::Autonomous);
        assert_eq!(first.strategy, Some(Strategy::SeekFood));
        assert_eq!(first.plan.last(), Some(&p(12, 5)));

        let second = engine.tick(&mut state, Mode::Autonomous);
        assert_eq!(second.strategy, None);
        assert_eq!(second.plan.len(), first.plan.len() - 1);
    }

    #[test]
    fn test_resize_keeps_head_side_of_snake() {
        let mut engine = engine();
        let snake = Snake::from_segments([p(10, 4), p(11, 4), p(12, 4)], Direction::Left);
        let mut state = GameState::new(snake, Some(p(15, 7)), 20, 10);

        engine.resize(&mut state, 12, 8);

        assert_eq!(state.cols(), 12);
        assert_eq!(state.snake.len(), 2);
        assert_eq!(state.snake.head(), p(10, 4));
        assert!(state.grid.is_consistent_with(&state.snake));
        let food = state.food.expect("food replaced");
        assert!(state.is_in_bounds(food));
    }

    #[test]
    fn test_resize_past_head_resets() {
        let mut engine = engine();
        let snake = Snake::from_segments([p(15, 4), p(14, 4), p(13, 4)], Direction::Right);
        let mut state = GameState::new(snake, Some(p(1, 1)), 20, 10);

        engine.resize(&mut state, 10, 8);

        assert_fresh(&state);
        assert_eq!(state.cols(), 10);
    }

    #[test]
    fn test_place_food_on_crowded_board() {
        let mut engine = engine();
        let snake = Snake::from_segments([p(0, 0), p(1, 0), p(2, 0)], Direction::Left);
        let mut state = GameState::new(snake, None, 4, 1);

        engine.place_food(&mut state);

        assert_eq!(state.food, Some(p(3, 0)));
    }
}
