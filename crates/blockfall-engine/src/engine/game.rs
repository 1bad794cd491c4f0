use std::{rc::Rc, time::Duration};

use rand::{Rng as _, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::core::{BOARD_HEIGHT, BOARD_WIDTH, Board, ShapeKind};

use super::{ActiveBlock, Observation, SystemTimeSource, TimeSource};

/// Row whose occupancy ends the episode. Row 1 rather than 0: one row of
/// headroom above the loss line.
const LOSS_ROW: usize = 1;

/// Reward per unit decrease in hole count across a merge or a row clear.
const HOLE_DELTA_REWARD: i32 = 100;
/// Bonus for a placement that leaves the hole count unchanged.
const CLEAN_PLACEMENT_REWARD: i32 = 20;
/// Reward per cleared row.
const ROW_CLEAR_REWARD: i32 = 100;
/// Reward on the losing step; replaces whatever the step accumulated.
const LOSS_REWARD: i32 = -1000;

/// Discrete command applied to the active block at the start of a step.
///
/// Indices 0-2 are the movement commands; every other index maps to
/// [`Action::Wait`], which lets the block fall without interference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    MoveLeft = 0,
    MoveRight = 1,
    Rotate = 2,
    Wait = 3,
}

impl Action {
    /// Number of actions an agent chooses between.
    pub const COUNT: usize = 4;

    /// All actions in index order.
    pub const ALL: [Self; Self::COUNT] =
        [Self::MoveLeft, Self::MoveRight, Self::Rotate, Self::Wait];

    /// Maps an action index to an action. Indices outside 0..=2 are no-ops.
    #[must_use]
    pub fn from_index(index: usize) -> Self {
        match index {
            0 => Self::MoveLeft,
            1 => Self::MoveRight,
            2 => Self::Rotate,
            _ => Self::Wait,
        }
    }

    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Whether the episode is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum GamePhase {
    Playing,
    Lost,
}

/// Result of one environment step: next state, reward, terminal flag.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub state: Observation,
    pub reward: i32,
    pub done: bool,
}

/// The simulation: board + active block across discrete steps.
///
/// Two surfaces share the same merge/clear/loss pipeline:
///
/// - [`step`](Self::step) is the environment contract for an agent:
///   apply an action, force a fast drop, and return
///   (observation, reward, done);
/// - [`tick`](Self::tick) plus the movement methods drive interactive
///   play, where gravity runs at the block's own interval.
#[derive(Debug, Clone)]
pub struct Game {
    board: Board,
    block: ActiveBlock,
    score: usize,
    reward: i32,
    phase: GamePhase,
    rng: Pcg32,
    clock: Rc<dyn TimeSource>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new()
    }
}

impl Game {
    /// Creates a game with a random spawn seed and the system clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but with a specific seed for a deterministic
    /// shape sequence.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        Self::with_time_source(seed, Rc::new(SystemTimeSource::new()))
    }

    /// Like [`Self::with_seed`], but gravity is paced by the given time
    /// source instead of the system clock.
    #[must_use]
    pub fn with_time_source(seed: u64, clock: Rc<dyn TimeSource>) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let kind: ShapeKind = rng.random();
        let block = ActiveBlock::spawn(kind, clock.elapsed());
        Self {
            board: Board::EMPTY,
            block,
            score: 0,
            reward: 0,
            phase: GamePhase::Playing,
            rng,
            clock,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active_block(&self) -> &ActiveBlock {
        &self.block
    }

    /// Rows cleared so far this episode.
    #[must_use]
    pub fn score(&self) -> usize {
        self.score
    }

    #[must_use]
    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    /// Resets the episode in place: empty board, zero score, fresh block.
    /// The shape sequence continues from the same seed stream.
    pub fn restart(&mut self) {
        self.board = Board::EMPTY;
        self.score = 0;
        self.reward = 0;
        self.phase = GamePhase::Playing;
        self.spawn_block();
    }

    /// Advances the simulation by one environment step.
    ///
    /// Resets the reward accumulator, applies `action` to the active block,
    /// forces the gravity interval to the instant-drop value, then runs the
    /// gravity/merge/clear/loss pipeline. On loss the reward is overridden
    /// with the terminal penalty.
    pub fn step(&mut self, action: Action) -> StepOutcome {
        self.reward = 0;
        match action {
            Action::MoveLeft => self.block.try_move(-1, &self.board),
            Action::MoveRight => self.block.try_move(1, &self.board),
            Action::Rotate => self.block.try_rotate(&self.board),
            Action::Wait => {}
        }
        self.block
            .set_gravity_interval(ActiveBlock::INSTANT_DROP_INTERVAL);
        self.advance();
        StepOutcome {
            state: self.observe(),
            reward: self.reward,
            done: self.phase.is_lost(),
        }
    }

    /// Advances the simulation by one interactive frame, with gravity at
    /// the block's own interval. Does nothing once the episode is lost.
    pub fn tick(&mut self) {
        if self.phase.is_lost() {
            return;
        }
        self.reward = 0;
        self.advance();
    }

    pub fn move_left(&mut self) {
        if self.phase.is_playing() {
            self.block.try_move(-1, &self.board);
        }
    }

    pub fn move_right(&mut self) {
        if self.phase.is_playing() {
            self.block.try_move(1, &self.board);
        }
    }

    pub fn rotate(&mut self) {
        if self.phase.is_playing() {
            self.block.try_rotate(&self.board);
        }
    }

    /// Changes how fast the active block falls (soft drop, instant drop).
    /// A newly spawned block always starts back at the normal interval.
    pub fn set_gravity_interval(&mut self, interval: Duration) {
        self.block.set_gravity_interval(interval);
    }

    /// Captures the current state vector.
    #[must_use]
    pub fn observe(&self) -> Observation {
        Observation::capture(&self.board, &self.block)
    }

    /// Gravity, merge, row clears and the loss check, shared by both
    /// surfaces.
    fn advance(&mut self) {
        let now = self.clock.elapsed();
        self.block.step_gravity(now);
        self.merge_if_landed();
        self.apply_row_clears();
        if self.board.is_row_occupied(LOSS_ROW) {
            self.reward = LOSS_REWARD;
            self.phase = GamePhase::Lost;
        }
    }

    /// Stamps a landed block into the board, rewards the placement by its
    /// effect on the hole count, and spawns the next block. A block that
    /// has not landed is left untouched, so a merge can never double-fire.
    fn merge_if_landed(&mut self) {
        if !self.block.has_landed(&self.board) {
            return;
        }

        let holes_before = self.board.count_holes();
        for (x, y) in self.block.occupied_positions() {
            let (Ok(x), Ok(y)) = (usize::try_from(x), usize::try_from(y)) else {
                continue;
            };
            if x < BOARD_WIDTH && y < BOARD_HEIGHT {
                self.board.occupy(x, y);
            }
        }
        let holes_after = self.board.count_holes();

        self.reward += hole_delta(holes_before, holes_after) * HOLE_DELTA_REWARD;
        if holes_before == holes_after {
            self.reward += CLEAN_PLACEMENT_REWARD;
        }

        self.spawn_block();
    }

    /// Clears full rows, scoring one point and 100 reward per row, plus the
    /// hole-count change the clear caused.
    fn apply_row_clears(&mut self) {
        let holes_before = self.board.count_holes();
        let cleared = self.board.clear_full_rows();
        if cleared > 0 {
            self.score += cleared;
            let cleared = i32::try_from(cleared).expect("at most 20 rows clear at once");
            self.reward += cleared * ROW_CLEAR_REWARD;
        }
        let holes_after = self.board.count_holes();
        self.reward += hole_delta(holes_before, holes_after) * HOLE_DELTA_REWARD;
    }

    /// Draws the next shape uniformly at random and spawns it at the fixed
    /// origin. No spawn-collision pre-check.
    fn spawn_block(&mut self) {
        let kind: ShapeKind = self.rng.random();
        self.block = ActiveBlock::spawn(kind, self.clock.elapsed());
    }
}

#[expect(clippy::cast_possible_wrap)]
fn hole_delta(before: u32, after: u32) -> i32 {
    before as i32 - after as i32
}

#[cfg(test)]
mod tests {
    use crate::engine::ManualTimeSource;

    use super::*;

    /// Exceeds the instant-drop interval, so every step drops one row.
    const FRAME: Duration = Duration::from_millis(17);

    fn test_game(seed: u64) -> (Game, Rc<ManualTimeSource>) {
        let clock = Rc::new(ManualTimeSource::new());
        let game = Game::with_time_source(seed, clock.clone());
        (game, clock)
    }

    fn step(game: &mut Game, clock: &ManualTimeSource, action: Action) -> StepOutcome {
        clock.advance(FRAME);
        game.step(action)
    }

    fn occupied_cells(board: &Board) -> usize {
        board
            .rows()
            .map(|row| row.iter_cells().filter(|&c| c).count())
            .sum()
    }

    fn with_bar(mut game: Game) -> Game {
        game.block = ActiveBlock::spawn(ShapeKind::Bar, Duration::ZERO);
        game
    }

    #[test]
    fn test_action_index_round_trip() {
        assert_eq!(Action::from_index(0), Action::MoveLeft);
        assert_eq!(Action::from_index(1), Action::MoveRight);
        assert_eq!(Action::from_index(2), Action::Rotate);
        assert_eq!(Action::from_index(3), Action::Wait);
        assert_eq!(Action::from_index(99), Action::Wait);
        for action in Action::ALL {
            assert_eq!(Action::from_index(action.index()), action);
        }
    }

    #[test]
    fn test_block_descends_every_step() {
        let (game, clock) = test_game(0);
        let mut game = with_bar(game);
        for expected_y in 1..=3 {
            step(&mut game, &clock, Action::Wait);
            assert_eq!(game.active_block().y(), expected_y);
        }
    }

    #[test]
    fn test_clean_placement_reward() {
        let (game, clock) = test_game(0);
        let mut game = with_bar(game);
        // A vertical bar spawned at y=0 lands when its bottom cell reaches
        // the floor: 16 drops.
        for _ in 0..15 {
            let outcome = step(&mut game, &clock, Action::Wait);
            assert_eq!(outcome.reward, 0);
            assert!(!outcome.done);
        }
        let outcome = step(&mut game, &clock, Action::Wait);
        assert_eq!(outcome.reward, CLEAN_PLACEMENT_REWARD);
        assert!(!outcome.done);
        // The bar was stamped and a fresh block spawned at the origin.
        assert_eq!(occupied_cells(game.board()), 4);
        assert_eq!(game.active_block().y(), 0);
    }

    #[test]
    fn test_merge_stamps_previously_empty_cells() {
        let (game, clock) = test_game(3);
        let mut game = with_bar(game);
        for x in 0..BOARD_WIDTH {
            if x != 5 {
                game.board.occupy(x, BOARD_HEIGHT - 1);
            }
        }
        // Drop straight down: the bar fills (5, 16..=19), completing the
        // bottom row without overlapping any settled cell.
        let cells_before = occupied_cells(game.board());
        let mut merged = false;
        for _ in 0..20 {
            let before = occupied_cells(game.board());
            step(&mut game, &clock, Action::Wait);
            let after = occupied_cells(game.board());
            if after != before {
                // One full row cleared: 4 stamped, 10 removed.
                assert_eq!(after, before + 4 - BOARD_WIDTH);
                merged = true;
                break;
            }
        }
        assert!(merged);
        assert_eq!(game.score(), 1);
        assert_eq!(occupied_cells(game.board()), cells_before + 4 - BOARD_WIDTH);
    }

    #[test]
    fn test_full_bottom_row_scores_and_rewards() {
        let (mut game, clock) = test_game(0);
        game.board = Board::from_ascii("##########");
        let outcome = step(&mut game, &clock, Action::Wait);
        assert_eq!(game.score(), 1);
        assert_eq!(outcome.reward, ROW_CLEAR_REWARD);
        assert!(!outcome.done);
        assert!(!game.board().is_row_occupied(BOARD_HEIGHT - 1));
    }

    #[test]
    fn test_loss_overrides_reward() {
        let (mut game, clock) = test_game(0);
        // The bottom row clears for +100 and shifts the cell at row 0 down
        // into the loss row; the terminal penalty replaces the reward.
        for x in 0..BOARD_WIDTH {
            game.board.occupy(x, BOARD_HEIGHT - 1);
        }
        game.board.occupy(0, 0);
        let outcome = step(&mut game, &clock, Action::Wait);
        assert!(outcome.done);
        assert_eq!(outcome.reward, LOSS_REWARD);
        assert_eq!(game.score(), 1);
        assert!(game.phase().is_lost());
    }

    #[test]
    fn test_unknown_action_behaves_like_wait() {
        let (mut game_a, clock_a) = test_game(17);
        let (mut game_b, clock_b) = test_game(17);
        for _ in 0..30 {
            let a = step(&mut game_a, &clock_a, Action::from_index(99));
            let b = step(&mut game_b, &clock_b, Action::Wait);
            assert_eq!(a.state, b.state);
            assert_eq!(a.reward, b.reward);
            assert_eq!(a.done, b.done);
        }
    }

    #[test]
    fn test_same_seed_same_trajectory() {
        let (mut game_a, clock_a) = test_game(99);
        let (mut game_b, clock_b) = test_game(99);
        let actions = [
            Action::MoveLeft,
            Action::Rotate,
            Action::MoveRight,
            Action::Wait,
        ];
        for i in 0..60 {
            let action = actions[i % actions.len()];
            let a = step(&mut game_a, &clock_a, action);
            let b = step(&mut game_b, &clock_b, action);
            assert_eq!(a.state, b.state);
        }
    }

    #[test]
    fn test_reward_accumulator_resets_each_step() {
        let (game, clock) = test_game(0);
        let mut game = with_bar(game);
        for _ in 0..16 {
            step(&mut game, &clock, Action::Wait);
        }
        // Previous step rewarded the placement; a free-fall step is worth 0.
        let outcome = step(&mut game, &clock, Action::Wait);
        assert_eq!(outcome.reward, 0);
    }

    #[test]
    fn test_restart_resets_episode() {
        let (mut game, clock) = test_game(5);
        game.board.occupy(0, 1);
        step(&mut game, &clock, Action::Wait);
        assert!(game.phase().is_lost());

        game.restart();
        assert!(game.phase().is_playing());
        assert_eq!(game.score(), 0);
        assert_eq!(occupied_cells(game.board()), 0);
        assert_eq!(game.active_block().y(), 0);
    }

    #[test]
    fn test_tick_respects_block_interval() {
        let (mut game, clock) = test_game(1);
        game.tick();
        assert_eq!(game.active_block().y(), 0);
        clock.advance(Duration::from_millis(1100));
        game.tick();
        assert_eq!(game.active_block().y(), 1);
        // Soft drop speeds the descent up.
        game.set_gravity_interval(ActiveBlock::SOFT_DROP_INTERVAL);
        clock.advance(Duration::from_millis(150));
        game.tick();
        assert_eq!(game.active_block().y(), 2);
    }
}
