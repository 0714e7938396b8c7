use std::io;

use thiserror::Error;

use crate::session::Phase;

#[derive(Error, Debug)]
pub enum SnakeError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("high score file is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("terminal error: {0}")]
    Terminal(#[from] crossterm::ErrorKind),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("cannot {action} while the session is {from:?}")]
    InvalidTransition { from: Phase, action: &'static str },

    #[error("a snake needs at least one segment")]
    EmptySnake,

    #[error("terminal is {have:?} but the board needs at least {need:?}")]
    TerminalTooSmall { have: (u16, u16), need: (u16, u16) },
}

pub type Result<T> = std::result::Result<T, SnakeError>;
