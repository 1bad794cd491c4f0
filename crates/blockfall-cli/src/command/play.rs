use std::time::{Duration, Instant};

use blockfall_engine::{ActiveBlock, Game};
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use ratatui::{
    DefaultTerminal, Frame,
    layout::{Constraint, Flex, Layout},
    style::{Color, Style},
    text::Text,
    widgets::Block as BlockWidget,
};

use crate::ui::BoardDisplay;

const FRAME_INTERVAL: Duration = Duration::from_millis(16);

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    /// Seed for the shape sequence (random when omitted)
    #[clap(long)]
    seed: Option<u64>,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let game = match arg.seed {
        Some(seed) => Game::with_seed(seed),
        None => Game::new(),
    };
    let mut screen = PlayScreen::new(game);

    let mut terminal = ratatui::init();
    let result = screen.run(&mut terminal);
    ratatui::restore();
    result
}

#[derive(Debug)]
struct PlayScreen {
    game: Game,
    exiting: bool,
}

impl PlayScreen {
    fn new(game: Game) -> Self {
        Self {
            game,
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
            self.game.tick();
            terminal.draw(|frame| self.draw(frame))?;
        }
        Ok(())
    }

    fn handle_event(&mut self, event: &Event) {
        let Event::Key(key) = event else { return };
        if key.kind == KeyEventKind::Release {
            return;
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('a') => self.game.move_left(),
            KeyCode::Right | KeyCode::Char('d') => self.game.move_right(),
            KeyCode::Char('r') => self.game.rotate(),
            KeyCode::Down | KeyCode::Char('s') => self
                .game
                .set_gravity_interval(ActiveBlock::SOFT_DROP_INTERVAL),
            KeyCode::Char(' ') => self
                .game
                .set_gravity_interval(ActiveBlock::INSTANT_DROP_INTERVAL),
            KeyCode::Char('c') => self.game.restart(),
            KeyCode::Char('q') | KeyCode::Esc => self.exiting = true,
            _ => {}
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

        let status = if self.game.phase().is_lost() {
            format!("Game over! Score: {}", self.game.score())
        } else {
            format!("Score: {}", self.game.score())
        };
        frame.render_widget(Text::from(status).centered(), status_area);

        let help =
            "Controls: ← → (Move) | r (Rotate) | ↓ (Soft Drop) | Space (Drop) | c (Restart) | q (Quit)";
        let help = Text::from(help)
            .style(Style::default().fg(Color::DarkGray))
            .centered();
        frame.render_widget(help, help_area);
    }
}
