use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use crossterm::style::Color;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::clock::SystemClock;
use crate::config::Config;
use crate::engine::World;
use crate::session::{Cue, Phase, SessionController, SessionEvent};
use crate::snake::Direction::{self, *};
use crate::store::{HighScoreStore, JsonFileStore, MemoryStore};
use crate::term::{TermManager, TermPos};
use crate::{Coords, GridInt, Result, SnakeError};

/// Terminal columns per grid cell, so cells come out roughly square
const CELL_WIDTH: u16 = 2;

/// Upper bound on how long to wait for input between timer checks
const MAX_POLL: Duration = Duration::from_millis(50);

const SNAKE_BODY_CHAR: char = '█';
const APPLE_CHAR: char = 'O';
const DEAD_SNAKE_CHAR: char = 'X';

const SNAKE_COLOR: Color = Color::Green;
const APPLE_COLOR: Color = Color::Red;
const HIGHLIGHT_COLOR: Color = Color::Yellow;

type Session = SessionController<SystemClock, Box<dyn HighScoreStore>, StdRng>;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Turn(Direction),
    /// Start from idle, or play again after game over
    Confirm,
    Quit,
}

pub fn command_for(ev: &KeyEvent) -> Option<Command> {
    if is_ctrl_c(ev) {
        return Some(Command::Quit);
    }

    match ev.code {
        KeyCode::Char('w') | KeyCode::Up => Some(Command::Turn(Up)),
        KeyCode::Char('a') | KeyCode::Left => Some(Command::Turn(Left)),
        KeyCode::Char('s') | KeyCode::Down => Some(Command::Turn(Down)),
        KeyCode::Char('d') | KeyCode::Right => Some(Command::Turn(Right)),
        KeyCode::Enter | KeyCode::Char(' ') => Some(Command::Confirm),
        KeyCode::Char('q') | KeyCode::Esc => Some(Command::Quit),
        _ => None,
    }
}

fn is_ctrl_c(ev: &KeyEvent) -> bool {
    matches!(ev, KeyEvent { code: KeyCode::Char('c'), modifiers: KeyModifiers::CONTROL })
}

/// Where the board sits on screen.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Top-left corner of the border
    pub origin: TermPos,
    /// Border size, both corners included
    pub board: TermPos,
}

impl Layout {
    /// Centres a board of `grid_size` cells, with one status line under it.
    pub fn fit(term_size: TermPos, grid_size: GridInt) -> Result<Self> {
        let board = (grid_size * CELL_WIDTH + 2, grid_size + 2);
        let need = (board.0, board.1 + 1);

        if term_size.0 < need.0 || term_size.1 < need.1 {
            return Err(SnakeError::TerminalTooSmall { have: term_size, need });
        }

        let origin = ((term_size.0 - need.0) / 2, (term_size.1 - need.1) / 2);
        Ok(Layout { origin, board })
    }

    pub fn cell(&self, pos: Coords) -> TermPos {
        (self.origin.0 + 1 + pos.x * CELL_WIDTH, self.origin.1 + 1 + pos.y)
    }

    pub fn status_line(&self) -> TermPos {
        (self.origin.0, self.origin.1 + self.board.1)
    }
}

pub struct TerminalGame {
    term: TermManager,
    session: Session,
    layout: Layout,
    sound: bool,
}

impl TerminalGame {
    pub fn new(config: Config) -> Result<Self> {
        let store: Box<dyn HighScoreStore> = match &config.high_score_path {
            Some(path) => Box::new(JsonFileStore::new(path.clone())),
            None => Box::new(MemoryStore::new()),
        };
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let term = TermManager::new()?;
        let layout = Layout::fit(term.size(), config.grid_size)?;
        let sound = config.sound;
        let session = SessionController::new(config, SystemClock::new(), store, rng)?;

        Ok(TerminalGame { term, session, layout, sound })
    }

    /// Plays until the user quits. The terminal is restored on every exit path.
    pub fn run(&mut self) -> Result<()> {
        self.term.setup()?;
        let res = self.play();
        let restored = self.term.restore();
        res.and(restored)
    }

    ///////////////////////////////////////////////////////////////////////////

    fn play(&mut self) -> Result<()> {
        self.term.clear()?;
        self.draw_frame()?;
        self.show_intro()?;

        loop {
            let timeout = self.session.time_to_next_timer().map_or(MAX_POLL, |t| t.min(MAX_POLL));

            for key_ev in self.term.read_key_events(timeout)? {
                match command_for(&key_ev) {
                    Some(Command::Quit) => {
                        info!("quit requested");
                        return Ok(());
                    }
                    Some(Command::Turn(dir)) => {
                        self.session.turn(dir);
                    }
                    Some(Command::Confirm) => self.confirm()?,
                    None => {}
                }
            }

            let events = self.session.advance();
            self.handle(events)?;
        }
    }

    fn confirm(&mut self) -> Result<()> {
        let events = match self.session.phase() {
            Phase::Idle => self.session.start()?,
            Phase::GameOver => self.session.restart()?,
            Phase::Running => return Ok(()),
        };

        self.term.hide_message()?;
        self.handle(events)
    }

    fn handle(&mut self, events: Vec<SessionEvent>) -> Result<()> {
        if events.is_empty() {
            return Ok(());
        }

        for ev in events {
            match ev {
                SessionEvent::Render => self.draw_frame()?,
                SessionEvent::Sound(cue) => self.play_cue(cue)?,
                SessionEvent::GameOver { score, new_high_score, cleared, .. } => {
                    self.game_over(score, new_high_score, cleared)?
                }
                SessionEvent::Started | SessionEvent::Ate { .. } | SessionEvent::SpeedChanged { .. } => {}
            }
        }

        self.term.flush()
    }

    fn show_intro(&mut self) -> Result<()> {
        self.term.show_message(&[
            "Arrow keys or WASD to move",
            "q, Esc or CTRL+C to quit",
            "",
            "Press Enter or Space to begin",
        ])
    }

    fn game_over(&mut self, score: u32, new_high_score: bool, cleared: bool) -> Result<()> {
        if !cleared {
            if let Some(world) = self.session.state().world.clone() {
                for pos in world.snake().body() {
                    self.fill_cell(*pos, DEAD_SNAKE_CHAR, SNAKE_COLOR)?;
                }
            }
        }

        // The record may have just changed
        self.draw_status()?;

        let title = if cleared {"You filled the board!"} else {"Game over!"};
        let score_line = format!("Score: {}", score);
        let record_line = if new_high_score {"New high score!"} else {""};

        self.term.show_message(&[
            title,
            &score_line,
            record_line,
            "Press Enter to play again,",
            "or q to quit.",
        ])
    }

    fn draw_frame(&mut self) -> Result<()> {
        let layout = self.layout;
        self.term.draw_box(layout.origin, layout.board)?;

        // Full redraw: blank the inside, then paint the current state
        let inner = layout.board.0 - 2;
        let blank = " ".repeat(inner as usize);
        for y in 1..layout.board.1 - 1 {
            self.term.print_str_at((layout.origin.0 + 1, layout.origin.1 + y), &blank, None)?;
        }

        if let Some(world) = self.session.state().world.clone() {
            self.draw_world(&world)?;
        }

        self.draw_status()
    }

    fn draw_world(&mut self, world: &World) -> Result<()> {
        self.fill_cell(world.food().pos(), APPLE_CHAR, APPLE_COLOR)?;

        let snake = world.snake();
        let head_char = snake.head_char();
        for (i, pos) in snake.body().enumerate() {
            let ch = if i == 0 {head_char} else {SNAKE_BODY_CHAR};
            self.fill_cell(*pos, ch, SNAKE_COLOR)?;
        }

        Ok(())
    }

    fn draw_status(&mut self) -> Result<()> {
        let state = self.session.state();
        let score = format!("Score: {}", state.score());
        let high = format!("High score: {}", state.high_score);
        let highlight = if state.new_high_score {Some(HIGHLIGHT_COLOR)} else {None};

        let pos = self.layout.status_line();
        let width = self.layout.board.0 as usize;
        self.term.print_str_at(pos, &" ".repeat(width), None)?;
        self.term.print_str_at(pos, &score, None)?;

        let high_x = (pos.0 + self.layout.board.0).saturating_sub(high.chars().count() as u16);
        self.term.print_str_at((high_x, pos.1), &high, highlight)
    }

    fn fill_cell(&mut self, pos: Coords, ch: char, color: Color) -> Result<()> {
        let (x, y) = self.layout.cell(pos);
        for dx in 0..CELL_WIDTH {
            self.term.print_at((x + dx, y), ch, Some(color))?;
        }

        Ok(())
    }

    fn play_cue(&mut self, cue: Cue) -> Result<()> {
        match cue {
            Cue::Eat | Cue::GameOver if self.sound => self.term.bell(),
            Cue::MusicStart | Cue::MusicStop => {
                debug!("no background music in a terminal ({:?})", cue);
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
