use std::io::{stdout, Stdout, Write};
use std::time::Duration;

use crossterm::event::{poll, read, Event, KeyEvent};
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{ClearType, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{cursor, execute, queue, terminal};

use crate::Result;

pub type TermPos = (u16, u16);

#[derive(Copy, Clone, Debug, PartialEq)]
struct Cell {
    ch: char,
    color: Option<Color>,
}

const BLANK: Cell = Cell { ch: ' ', color: None };

pub struct TermManager {
    width: u16,
    height: u16,
    stdout: Stdout,
    screen: Vec<Cell>,
    current_msg: Option<Message>,
}

struct Message {
    top_left: TermPos,
    width: u16,
    height: u16,
}

impl TermManager {
    pub fn new() -> Result<Self> {
        let (width, height) = terminal::size()?;
        let screen = vec![BLANK; width as usize * height as usize];
        Ok(TermManager { width, height, stdout: stdout(), screen, current_msg: None })
    }

    pub fn setup(&mut self) -> Result<()> {
        execute!(self.stdout, EnterAlternateScreen)?;
        terminal::enable_raw_mode()?;
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;
        Ok(())
    }

    pub fn restore(&mut self) -> Result<()> {
        terminal::disable_raw_mode()?;
        execute!(self.stdout, ResetColor, cursor::Show, cursor::EnableBlinking, LeaveAlternateScreen)?;
        Ok(())
    }

    /// Waits up to `timeout` for input, then drains whatever else is queued.
    pub fn read_key_events(&self, timeout: Duration) -> Result<Vec<KeyEvent>> {
        let mut events = vec![];
        let mut wait = timeout;

        while poll(wait)? {
            if let Event::Key(ev) = read()? {
                events.push(ev);
            }
            wait = Duration::from_millis(0);
        }

        Ok(events)
    }

    pub fn size(&self) -> TermPos {
        (self.width, self.height)
    }

    /// Draws a frame whose outer corners are `top_left` and `top_left + size - 1`.
    pub fn draw_box(&mut self, top_left: TermPos, size: TermPos) -> Result<()> {
        let (width, height) = size;
        let (x0, y0) = top_left;
        let end_x = x0 + width - 1;
        let end_y = y0 + height - 1;

        for x in x0..=end_x {
            let ch = if x == x0 || x == end_x {'+'} else {'-'};
            self.print_at((x, y0), ch, None)?;
            self.print_at((x, end_y), ch, None)?;
        }

        for y in y0 + 1..end_y {
            self.print_at((x0, y), '|', None)?;
            self.print_at((end_x, y), '|', None)?;
        }

        Ok(())
    }

    pub fn show_message(&mut self, lines: &[&str]) -> Result<()> {
        if self.has_message() {
            self.hide_message()?;
        }

        let msg_height = (lines.len() + 2) as u16;
        let msg_width = (lines.iter().map(|x| x.chars().count()).max().unwrap_or(0) + 2) as u16;
        let center = (self.width / 2, self.height / 2);
        let top_left = (
            center.0.saturating_sub(msg_width / 2),
            center.1.saturating_sub(msg_height / 2),
        );

        // Blank top and bottom rows
        for y in [top_left.1, top_left.1 + msg_height - 1].iter() {
            for x_diff in 0..msg_width {
                self.print_at_no_save((top_left.0 + x_diff, *y), ' ')?;
            }
        }

        for (i, line) in lines.iter().enumerate() {
            let padded_line = format!("{line: ^width$}", line = line, width = msg_width as usize);
            let y = top_left.1 + i as u16 + 1;
            for (x_diff, ch) in padded_line.chars().enumerate() {
                self.print_at_no_save((top_left.0 + x_diff as u16, y), ch)?;
            }
        }

        self.current_msg = Some(Message { width: msg_width, height: msg_height, top_left });
        self.flush()
    }

    pub fn hide_message(&mut self) -> Result<()> {
        let msg = match self.current_msg.take() {
            Some(msg) => msg,
            None => return Ok(()),
        };

        // Put back what the message was covering
        for y_diff in 0..msg.height {
            for x_diff in 0..msg.width {
                let pos = (msg.top_left.0 + x_diff, msg.top_left.1 + y_diff);
                if let Some(cell) = self.index(pos).map(|i| self.screen[i]) {
                    self.queue_cell(pos, cell)?;
                }
            }
        }

        self.flush()
    }

    pub fn has_message(&self) -> bool {
        self.current_msg.is_some()
    }

    pub fn print_at(&mut self, pos: TermPos, ch: char, color: Option<Color>) -> Result<()> {
        if let Some(i) = self.index(pos) {
            let cell = Cell { ch, color };
            self.screen[i] = cell;
            if self.current_msg.as_ref().map_or(true, |msg| !msg.covers(pos)) {
                self.queue_cell(pos, cell)?;
            }
        }

        Ok(())
    }

    pub fn print_str_at(&mut self, pos: TermPos, text: &str, color: Option<Color>) -> Result<()> {
        for (i, ch) in text.chars().enumerate() {
            self.print_at((pos.0 + i as u16, pos.1), ch, color)?;
        }

        Ok(())
    }

    pub fn clear(&mut self) -> Result<()> {
        execute!(self.stdout, terminal::Clear(ClearType::All))?;
        self.screen = vec![BLANK; self.width as usize * self.height as usize];
        self.current_msg = None;
        Ok(())
    }

    pub fn bell(&mut self) -> Result<()> {
        queue!(self.stdout, Print('\x07'))?;
        Ok(())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.stdout.flush()?;
        Ok(())
    }

    ///////////////////////////////////////////////////////////////////////////

    fn index(&self, pos: TermPos) -> Option<usize> {
        if pos.0 < self.width && pos.1 < self.height {
            Some(self.width as usize * pos.1 as usize + pos.0 as usize)
        } else {
            None
        }
    }

    fn print_at_no_save(&mut self, pos: TermPos, ch: char) -> Result<()> {
        // Messages skip the screen buffer so hiding them can restore what was there
        if self.index(pos).is_some() {
            self.queue_cell(pos, Cell { ch, color: None })?;
        }

        Ok(())
    }

    fn queue_cell(&mut self, pos: TermPos, cell: Cell) -> Result<()> {
        let res = match cell.color {
            Some(color) => queue!(
                self.stdout,
                cursor::MoveTo(pos.0, pos.1),
                SetForegroundColor(color),
                Print(cell.ch),
                ResetColor
            ),
            None => queue!(self.stdout, cursor::MoveTo(pos.0, pos.1), Print(cell.ch)),
        };

        Ok(res?)
    }
}

impl Message {
    fn covers(&self, pos: TermPos) -> bool {
        pos.0 >= self.top_left.0
            && pos.0 < self.top_left.0 + self.width
            && pos.1 >= self.top_left.1
            && pos.1 < self.top_left.1 + self.height
    }
}
