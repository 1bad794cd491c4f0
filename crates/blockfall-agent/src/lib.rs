//! Temporal-difference learning agent for the blockfall environment.
//!
//! The agent is a generic function approximator trained by one-step TD
//! (Q-learning) updates against the environment contract exposed by
//! `blockfall-engine`:
//!
//! 1. **Observe** - the environment produces a 214-element state vector
//! 2. **Select** - [`TdAgent::select_action`] picks an action, either
//!    greedily from the value function or by a biased exploratory draw
//! 3. **Step** - the environment returns (next state, reward, done)
//! 4. **Train** - [`TdAgent::train`] performs one off-policy update toward
//!    `reward + γ · max_a' Q(s', a')`, dropping the bootstrap term on
//!    terminal transitions
//!
//! # Components
//!
//! - [`LinearQValue`] - linear action-value function, one weight row and
//!   bias per action
//! - [`EpsilonGreedy`] - exploration schedule with multiplicative decay
//! - [`TdAgent`] - ties both together and owns the RNG
//!
//! The agent's parameters round-trip through [`QSnapshot`], which the cli
//! persists as JSON keyed by a filesystem path. The approximator is
//! deliberately simple; anything that maps the state vector to one value
//! per action and supports gradient-style updates would satisfy the same
//! contract.

pub use self::{agent::*, linear::*, policy::*};

mod agent;
mod linear;
mod policy;

/// A persisted parameter snapshot does not match the observation contract.
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("snapshot dimensions do not match the observation contract")]
pub struct SnapshotShapeError;
