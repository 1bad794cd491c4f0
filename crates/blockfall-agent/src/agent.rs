use blockfall_engine::{Action, Observation};
use rand::{Rng as _, SeedableRng as _, rngs::StdRng};

use crate::{EpsilonGreedy, LinearQValue, QSnapshot, SnapshotShapeError};

/// The decision-making and training collaborator.
///
/// Owns the value function, the exploration schedule and the RNG. The two
/// entry points mirror the environment loop: [`select_action`] maps a state
/// to an action (reporting whether it was exploratory), and [`train`]
/// consumes one `(state, action, reward, next_state, done)` transition.
///
/// [`select_action`]: Self::select_action
/// [`train`]: Self::train
#[derive(Debug, Clone)]
pub struct TdAgent {
    q: LinearQValue,
    policy: EpsilonGreedy,
    gamma: f32,
    learning_rate: f32,
    rng: StdRng,
}

impl Default for TdAgent {
    fn default() -> Self {
        Self::new()
    }
}

impl TdAgent {
    /// Discount factor of the TD target.
    pub const GAMMA: f32 = 0.9;
    /// Step size of the gradient updates.
    pub const LEARNING_RATE: f32 = 0.001;

    /// Creates a fresh agent with OS-seeded randomness.
    #[must_use]
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Like [`Self::new`], but deterministic.
    #[must_use]
    pub fn with_seed(seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let q = LinearQValue::new(&mut rng);
        Self::from_parts(q, rng)
    }

    /// Restores an agent from persisted parameters.
    pub fn from_snapshot(snapshot: QSnapshot) -> Result<Self, SnapshotShapeError> {
        let q = LinearQValue::from_snapshot(snapshot)?;
        Ok(Self::from_parts(q, StdRng::from_os_rng()))
    }

    fn from_parts(q: LinearQValue, rng: StdRng) -> Self {
        Self {
            q,
            policy: EpsilonGreedy::new(),
            gamma: Self::GAMMA,
            learning_rate: Self::LEARNING_RATE,
            rng,
        }
    }

    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.policy.epsilon()
    }

    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.policy.set_epsilon(epsilon);
    }

    /// Copies the value-function parameters into a serializable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> QSnapshot {
        self.q.snapshot()
    }

    /// Chooses an action for `state`. Returns the action and whether it was
    /// an exploratory draw rather than the greedy choice.
    pub fn select_action(&mut self, state: &Observation) -> (Action, bool) {
        if self.policy.should_explore(&mut self.rng) {
            (EpsilonGreedy::sample_action(&mut self.rng), true)
        } else {
            (self.q.best_action(state), false)
        }
    }

    /// One off-policy TD(0) update for the given transition.
    ///
    /// The target is `reward + γ · max_a' Q(next_state, a')`, with the
    /// bootstrap term dropped on terminal transitions.
    #[expect(clippy::cast_precision_loss)]
    pub fn train(
        &mut self,
        state: &Observation,
        action: Action,
        reward: i32,
        next_state: &Observation,
        done: bool,
    ) {
        let reward = reward as f32;
        let target = if done {
            reward
        } else {
            let next_best = self
                .q
                .q_values(next_state)
                .into_iter()
                .fold(f32::NEG_INFINITY, f32::max);
            self.gamma.mul_add(next_best, reward)
        };
        self.q.update(state, action, target, self.learning_rate);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use blockfall_engine::{ActiveBlock, Board, ShapeKind};

    use super::*;

    fn observation() -> Observation {
        Observation::capture(
            &Board::EMPTY,
            &ActiveBlock::spawn(ShapeKind::Tee, Duration::ZERO),
        )
    }

    fn next_observation() -> Observation {
        let mut board = Board::EMPTY;
        board.occupy(4, 19);
        Observation::capture(
            &board,
            &ActiveBlock::spawn(ShapeKind::Square, Duration::ZERO),
        )
    }

    #[test]
    fn test_greedy_when_epsilon_is_zero() {
        let mut agent = TdAgent::with_seed(0);
        agent.set_epsilon(0.0);
        let state = observation();
        let expected = agent.q.best_action(&state);
        for _ in 0..20 {
            let (action, exploratory) = agent.select_action(&state);
            assert_eq!(action, expected);
            assert!(!exploratory);
        }
    }

    #[test]
    fn test_exploratory_when_epsilon_is_high() {
        let mut agent = TdAgent::with_seed(1);
        agent.set_epsilon(1.0);
        let state = observation();
        let exploratory_moves = (0..50)
            .filter(|_| agent.select_action(&state).1)
            .count();
        // Epsilon stays close to 1.0, so essentially every move explores.
        assert!(exploratory_moves >= 45);
    }

    #[test]
    fn test_train_moves_value_toward_reward() {
        let mut agent = TdAgent::with_seed(2);
        let state = observation();
        let next = next_observation();
        let before = agent.q.q_values(&state)[Action::Rotate.index()];
        for _ in 0..100 {
            agent.train(&state, Action::Rotate, 100, &next, true);
        }
        let after = agent.q.q_values(&state)[Action::Rotate.index()];
        assert!((100.0 - after).abs() < (100.0 - before).abs());
    }

    #[test]
    fn test_done_drops_bootstrap_term() {
        let agent = TdAgent::with_seed(3);
        let state = observation();
        let next = next_observation();

        let mut terminal = agent.clone();
        terminal.train(&state, Action::Wait, 0, &next, true);
        let mut bootstrapped = agent.clone();
        bootstrapped.train(&state, Action::Wait, 0, &next, false);

        // With zero reward the terminal target is exactly 0, while the
        // non-terminal target bootstraps from the (noisy) next-state values.
        assert_ne!(
            terminal.q.q_values(&state)[Action::Wait.index()],
            bootstrapped.q.q_values(&state)[Action::Wait.index()],
        );
    }

    #[test]
    fn test_snapshot_round_trip_preserves_values() {
        let agent = TdAgent::with_seed(4);
        let restored = TdAgent::from_snapshot(agent.snapshot()).unwrap();
        let state = observation();
        assert_eq!(agent.q.q_values(&state), restored.q.q_values(&state));
    }

    #[test]
    fn test_epsilon_accessors() {
        let mut agent = TdAgent::with_seed(5);
        assert_eq!(agent.epsilon(), EpsilonGreedy::INITIAL_EPSILON);
        agent.set_epsilon(0.42);
        assert_eq!(agent.epsilon(), 0.42);
    }
}
