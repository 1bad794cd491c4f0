//! Game logic orchestrating the core data structures.
//!
//! - [`ActiveBlock`] - The currently controllable falling piece
//! - [`Game`] - Board + block across discrete steps; the environment
//!   contract (`step`) and the interactive surface (`tick`, moves)
//! - [`Observation`] - Flat state vector consumed by the learning agent
//! - [`TimeSource`] - Injectable monotonic clock driving gravity
//!
//! # Environment loop
//!
//! ```
//! use blockfall_engine::{Action, Game};
//!
//! let mut game = Game::with_seed(42);
//! let outcome = game.step(Action::MoveLeft);
//! assert_eq!(outcome.state.as_slice().len(), 214);
//! ```

pub use self::{active_block::*, clock::*, game::*, observation::*};

mod active_block;
mod clock;
mod game;
mod observation;
