use blockfall_engine::{Action, Observation};
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};

use crate::SnapshotShapeError;

/// Linear action-value function over the observation vector.
///
/// One weight row and one bias per action: `Q(s, a) = w_a · s + b_a`.
/// [`update`](Self::update) performs a stochastic gradient step on the
/// squared error against a supplied target value.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearQValue {
    weights: Vec<Vec<f32>>,
    biases: Vec<f32>,
}

impl LinearQValue {
    /// Creates a value function with small Gaussian-initialized weights.
    ///
    /// Zero weights would make every early greedy decision a tie resolved
    /// to the first action; a little noise breaks the ties without biasing
    /// play in any useful direction.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let normal = Normal::new(0.0, 0.01).unwrap();
        let weights = (0..Action::COUNT)
            .map(|_| (0..Observation::LEN).map(|_| rng.sample(normal)).collect())
            .collect();
        let biases = vec![0.0; Action::COUNT];
        Self { weights, biases }
    }

    /// Returns Q(s, a) for every action.
    #[must_use]
    pub fn q_values(&self, state: &Observation) -> [f32; Action::COUNT] {
        let mut values = [0.0; Action::COUNT];
        for (i, value) in values.iter_mut().enumerate() {
            *value = dot(&self.weights[i], state.as_slice()) + self.biases[i];
        }
        values
    }

    /// Returns the action with the highest value; ties resolve to the
    /// lowest action index.
    #[must_use]
    pub fn best_action(&self, state: &Observation) -> Action {
        let values = self.q_values(state);
        let mut best = Action::ALL[0];
        for action in Action::ALL {
            if values[action.index()] > values[best.index()] {
                best = action;
            }
        }
        best
    }

    /// One gradient step moving Q(s, a) toward `target`.
    pub fn update(&mut self, state: &Observation, action: Action, target: f32, learning_rate: f32) {
        let a = action.index();
        let error = target - (dot(&self.weights[a], state.as_slice()) + self.biases[a]);
        let scale = learning_rate * error;
        for (w, x) in self.weights[a].iter_mut().zip(state.as_slice()) {
            *w += scale * x;
        }
        self.biases[a] += scale;
    }

    /// Copies the parameters into a serializable snapshot.
    #[must_use]
    pub fn snapshot(&self) -> QSnapshot {
        QSnapshot {
            weights: self.weights.clone(),
            biases: self.biases.clone(),
        }
    }

    /// Rebuilds the value function from a snapshot, verifying that the
    /// stored dimensions still match the observation contract.
    pub fn from_snapshot(snapshot: QSnapshot) -> Result<Self, SnapshotShapeError> {
        let QSnapshot { weights, biases } = snapshot;
        if weights.len() != Action::COUNT
            || biases.len() != Action::COUNT
            || weights.iter().any(|row| row.len() != Observation::LEN)
        {
            return Err(SnapshotShapeError);
        }
        Ok(Self { weights, biases })
    }
}

/// Serializable parameters of a [`LinearQValue`].
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QSnapshot {
    pub weights: Vec<Vec<f32>>,
    pub biases: Vec<f32>,
}

fn dot(weights: &[f32], values: &[f32]) -> f32 {
    weights.iter().zip(values).map(|(w, x)| w * x).sum()
}
