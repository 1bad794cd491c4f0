use std::{
    path::PathBuf,
    time::{Duration, Instant},
};

use blockfall_agent::TdAgent;
use blockfall_engine::Game;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Flex, Layout},
    style::{Color, Style},
    text::Text,
    widgets::Block as BlockWidget,
};

use crate::{model::agent_model::AgentModel, ui::BoardDisplay};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Debug, Clone, clap::Args)]
pub(crate) struct WatchArg {
    /// Path to the trained model file
    #[clap(long, default_value = "data/model.json")]
    model: PathBuf,
    /// Seed for the shape sequence (random when omitted)
    #[clap(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &WatchArg) -> anyhow::Result<()> {
    let mut agent = AgentModel::open(&arg.model)?.into_agent()?;
    // Watching is pure exploitation.
    agent.set_epsilon(0.0);
    let game = match arg.seed {
        Some(seed) => Game::with_seed(seed),
        None => Game::new(),
    };
    let mut screen = WatchScreen::new(game, agent);

    let mut terminal = ratatui::init();
    let result = screen.run(&mut terminal);
    ratatui::restore();
    result
}

#[derive(Debug)]
struct WatchScreen {
    game: Game,
    agent: TdAgent,
    episodes: u64,
    last_reward: i32,
    best_score: usize,
    exiting: bool,
}

impl WatchScreen {
    fn new(game: Game, agent: TdAgent) -> Self {
        Self {
            game,
            agent,
            episodes: 0,
            last_reward: 0,
            best_score: 0,
            exiting: false,
        }
    }

    fn run(&mut self, terminal: &mut DefaultTerminal) -> anyhow::Result<()> {
        let mut last_frame = Instant::now();
        while !self.exiting {
            let timeout = FRAME_INTERVAL.saturating_sub(last_frame.elapsed());
            if event::poll(timeout)? {
                let event = event::read()?;
                self.handle_event(&event);
                continue;
            }
            last_frame = Instant::now();
            self.advance();
            terminal.draw(|frame| self.draw(frame))?;
        }
        Ok(())
    }

    /// One environment step driven by the greedy agent; a finished episode
    /// rolls straight into the next one.
    fn advance(&mut self) {
        let state = self.game.observe();
        let (action, _) = self.agent.select_action(&state);
        let outcome = self.game.step(action);
        self.last_reward = outcome.reward;
        if outcome.done {
            self.episodes += 1;
            self.best_score = self.best_score.max(self.game.score());
            self.game.restart();
        }
    }

    fn handle_event(&mut self, event: &Event) {
        let Event::Key(key) = event else { return };
        if key.kind == KeyEventKind::Release {
            return;
        }
        if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
            self.exiting = true;
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [board_area, status_area, help_area] = Layout::vertical([
            Constraint::Length(BoardDisplay::height() + 2),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas::<3>(frame.area());
        let [board_area] = Layout::horizontal([Constraint::Length(BoardDisplay::width() + 2)])
            .flex(Flex::Center)
            .areas::<1>(board_area);

        let border = BlockWidget::bordered();
        let inner = border.inner(board_area);
        frame.render_widget(border, board_area);
        frame.render_widget(
            BoardDisplay::new(self.game.board()).active_block(self.game.active_block()),
            inner,
        );

        let status = format!(
            "Episode: {} | Score: {} | Best: {} | Reward: {}",
            self.episodes + 1,
            self.game.score(),
            self.best_score,
            self.last_reward,
        );
        frame.render_widget(Text::from(status).centered(), status_area);

        let help = Text::from("Controls: q (Quit)")
            .style(Style::default().fg(Color::DarkGray))
            .centered();
        frame.render_widget(help, help_area);
    }
}
