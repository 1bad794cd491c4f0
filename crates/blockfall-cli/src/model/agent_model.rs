use std::path::Path;

use anyhow::Context as _;
use blockfall_agent::{QSnapshot, TdAgent};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::util;

/// Persisted agent parameters, keyed by a filesystem path.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub(crate) struct AgentModel {
    pub trained_at: DateTime<Utc>,
    pub q: QSnapshot,
}

impl AgentModel {
    pub fn from_agent(agent: &TdAgent) -> Self {
        Self {
            trained_at: Utc::now(),
            q: agent.snapshot(),
        }
    }

    pub fn open<P>(path: P) -> anyhow::Result<Self>
    where
        P: AsRef<Path>,
    {
        util::read_json_file("agent model", path)
    }

    pub fn save<P>(&self, path: P) -> anyhow::Result<()>
    where
        P: AsRef<Path>,
    {
        util::write_json_file("agent model", path, self)
    }

    pub fn into_agent(self) -> anyhow::Result<TdAgent> {
        TdAgent::from_snapshot(self.q)
            .context("Model file does not match the observation contract")
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, path::PathBuf, time::Duration};

    use blockfall_engine::{ActiveBlock, Board, Observation, ShapeKind};

    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("blockfall-{}-{name}.json", std::process::id()))
    }

    #[test]
    fn test_model_round_trip() {
        let path = temp_path("model-round-trip");
        let agent = TdAgent::with_seed(11);

        AgentModel::from_agent(&agent).save(&path).unwrap();
        let restored = AgentModel::open(&path).unwrap().into_agent().unwrap();
        fs::remove_file(&path).unwrap();

        // The restored value function makes the same greedy decisions.
        let state = Observation::capture(
            &Board::EMPTY,
            &ActiveBlock::spawn(ShapeKind::Bar, Duration::ZERO),
        );
        assert_eq!(agent.snapshot(), restored.snapshot());
        let mut a = agent;
        let mut b = restored;
        a.set_epsilon(0.0);
        b.set_epsilon(0.0);
        assert_eq!(a.select_action(&state).0, b.select_action(&state).0);
    }

    #[test]
    fn test_open_missing_file_fails() {
        assert!(AgentModel::open(temp_path("model-missing")).is_err());
    }
}
