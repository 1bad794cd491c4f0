use std::{
    fs::{File, OpenOptions},
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
    rc::Rc,
    time::Duration,
};

use anyhow::Context as _;
use blockfall_agent::TdAgent;
use blockfall_engine::{Board, Game, ManualTimeSource};
use rand::Rng as _;
use serde::Serialize;

use crate::model::{agent_model::AgentModel, run_stats::RunStats};

/// Virtual time advanced per environment step: one ~60 fps frame, which
/// always exceeds the instant-drop gravity interval.
const STEP_PERIOD: Duration = Duration::from_millis(17);

/// Hard cap on steps per episode, against an agent that never tops out.
const STEP_LIMIT: u64 = 100_000;

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct TrainArg {
    /// Number of episodes to run
    #[clap(long, default_value_t = 1000)]
    episodes: u64,
    /// Model checkpoint path
    #[clap(long, default_value = "data/model.json")]
    model: PathBuf,
    /// Run statistics path
    #[clap(long, default_value = "data/stats.json")]
    stats: PathBuf,
    /// Save a model checkpoint every N episodes
    #[clap(long, default_value_t = 10)]
    checkpoint_every: u64,
    /// Append one JSON line per finished episode to this file
    #[clap(long)]
    episode_log: Option<PathBuf>,
    /// Base seed for the shape sequences (random when omitted)
    #[clap(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &TrainArg) -> anyhow::Result<()> {
    let mut stats = RunStats::load_or_default(&arg.stats)?;
    let mut agent = if arg.model.exists() {
        eprintln!("Resuming training from {}", arg.model.display());
        AgentModel::open(&arg.model)?.into_agent()?
    } else {
        TdAgent::new()
    };
    agent.set_epsilon(stats.epsilon);

    let mut episode_log = arg.episode_log.as_deref().map(EpisodeLog::open).transpose()?;

    for episode in 0..arg.episodes {
        let seed = match arg.seed {
            Some(base) => base.wrapping_add(episode),
            None => rand::rng().random(),
        };
        let clock = Rc::new(ManualTimeSource::new());
        let mut game = Game::with_time_source(seed, clock.clone());

        let mut state = game.observe();
        let mut episode_reward = 0_i64;
        let mut steps = 0_u64;
        loop {
            clock.advance(STEP_PERIOD);
            let (action, exploratory) = agent.select_action(&state);
            let outcome = game.step(action);
            agent.train(&state, action, outcome.reward, &outcome.state, outcome.done);

            episode_reward += i64::from(outcome.reward);
            steps += 1;
            if exploratory {
                stats.exploratory_moves += 1;
            } else {
                stats.greedy_moves += 1;
            }

            let done = outcome.done;
            state = outcome.state;
            if done || steps >= STEP_LIMIT {
                break;
            }
        }

        stats.episodes += 1;
        stats.best_score = stats.best_score.max(game.score());
        stats.epsilon = agent.epsilon();
        stats.save(&arg.stats)?;

        if let Some(log) = &mut episode_log {
            log.append(&EpisodeRecord {
                episode: stats.episodes,
                steps,
                score: game.score(),
                reward: episode_reward,
                final_board: game.board(),
            })?;
        }

        if (episode + 1) % arg.checkpoint_every == 0 {
            AgentModel::from_agent(&agent).save(&arg.model)?;
        }

        eprintln!(
            "Episode #{}: score {}, reward {}, steps {} (epsilon {:.3})",
            stats.episodes,
            game.score(),
            episode_reward,
            steps,
            agent.epsilon(),
        );
    }

    AgentModel::from_agent(&agent).save(&arg.model)?;

    eprintln!();
    eprintln!("Training completed");
    eprintln!("  Model: {}", arg.model.display());
    eprintln!("  Episodes: {}", stats.episodes);
    eprintln!("  Best score: {}", stats.best_score);
    Ok(())
}

/// One line of the optional episode log.
#[derive(Debug, Serialize)]
struct EpisodeRecord<'a> {
    episode: u64,
    steps: u64,
    score: usize,
    reward: i64,
    final_board: &'a Board,
}

#[derive(Debug)]
struct EpisodeLog {
    writer: BufWriter<File>,
}

impl EpisodeLog {
    fn open(path: &Path) -> anyhow::Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open episode log: {}", path.display()))?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    fn append(&mut self, record: &EpisodeRecord<'_>) -> anyhow::Result<()> {
        serde_json::to_writer(&mut self.writer, record)
            .context("Failed to write episode record")?;
        writeln!(&mut self.writer).context("Failed to write episode record")?;
        self.writer.flush().context("Failed to flush episode log")?;
        Ok(())
    }
}
