use std::path::Path;

use blockfall_agent::EpsilonGreedy;
use serde::{Deserialize, Serialize};

use crate::util;

/// Persisted run statistics, loaded at process start and saved at the end
/// of every episode.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub(crate) struct RunStats {
    pub episodes: u64,
    pub exploratory_moves: u64,
    pub greedy_moves: u64,
    pub epsilon: f32,
    pub best_score: usize,
}

impl Default for RunStats {
    fn default() -> Self {
        Self {
            episodes: 0,
            exploratory_moves: 0,
            greedy_moves: 0,
            epsilon: EpsilonGreedy::INITIAL_EPSILON,
            best_score: 0,
        }
    }
}

impl RunStats {
    /// Loads the statistics file, falling back to deterministic defaults
    /// (a fresh run at the initial exploration rate) when it does not
    /// exist yet.
    pub fn load_or_default<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        if !path.as_ref().exists() {
            return Ok(Self::default());
        }
        util::read_json_file("run statistics", path)
    }

    pub fn save<P>(&self, path: P) -> anyhow::Result<()>
    where
        P: AsRef<Path>,
    {
        util::write_json_file("run statistics", path, self)
    }
}
