use clap::{Parser, Subcommand};

use self::{play::PlayArg, train::TrainArg, watch::WatchArg};

mod play;
mod train;
mod watch;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play interactively in the terminal
    Play(#[clap(flatten)] PlayArg),
    /// Watch a trained agent play
    Watch(#[clap(flatten)] WatchArg),
    /// Train the agent headlessly
    Train(#[clap(flatten)] TrainArg),
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Watch(arg) => watch::run(&arg)?,
        Mode::Train(arg) => train::run(&arg)?,
    }
    Ok(())
}
