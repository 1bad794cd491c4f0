use blockfall_engine::Action;
use rand::Rng;

/// Biased draw used for exploratory moves: horizontal nudges and letting
/// the block fall dominate, rotation is rare.
const EXPLORATION_CHOICES: [Action; 9] = [
    Action::MoveLeft,
    Action::MoveLeft,
    Action::MoveRight,
    Action::MoveRight,
    Action::Rotate,
    Action::Wait,
    Action::Wait,
    Action::Wait,
    Action::Wait,
];

/// Epsilon-greedy exploration schedule.
///
/// Epsilon decays multiplicatively on every decision until it reaches the
/// floor, so exploration fades smoothly over the course of training.
#[derive(Debug, Clone)]
pub struct EpsilonGreedy {
    epsilon: f32,
}

impl Default for EpsilonGreedy {
    fn default() -> Self {
        Self::new()
    }
}

impl EpsilonGreedy {
    /// Exploration rate of a fresh agent.
    pub const INITIAL_EPSILON: f32 = 0.9;
    /// Exploration never decays below this rate.
    pub const MIN_EPSILON: f32 = 0.1;
    /// Multiplicative decay applied per decision.
    pub const DECAY: f32 = 0.999_99;

    #[must_use]
    pub fn new() -> Self {
        Self::with_epsilon(Self::INITIAL_EPSILON)
    }

    #[must_use]
    pub fn with_epsilon(epsilon: f32) -> Self {
        Self { epsilon }
    }

    #[must_use]
    pub fn epsilon(&self) -> f32 {
        self.epsilon
    }

    pub fn set_epsilon(&mut self, epsilon: f32) {
        self.epsilon = epsilon;
    }

    /// Decays epsilon one notch, then decides whether this move explores.
    pub fn should_explore<R: Rng + ?Sized>(&mut self, rng: &mut R) -> bool {
        if self.epsilon > Self::MIN_EPSILON {
            self.epsilon *= Self::DECAY;
        }
        rng.random::<f32>() < self.epsilon
    }

    /// Draws an exploratory action from the biased distribution.
    pub fn sample_action<R: Rng + ?Sized>(rng: &mut R) -> Action {
        EXPLORATION_CHOICES[rng.random_range(0..EXPLORATION_CHOICES.len())]
    }
}
