//! Snake on a toroidal grid.
//!
//! The simulation core ([`engine::World`]) advances one cell per tick and knows
//! nothing about time or terminals. [`session::SessionController`] drives it
//! from a [`clock::Scheduler`] fed by an injectable [`clock::Clock`], so whole
//! sessions can be replayed in tests without waiting on a wall clock. The
//! terminal front end lives in [`game`] and [`term`].

pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod food;
pub mod game;
pub mod session;
pub mod snake;
pub mod store;
pub mod term;

pub use error::{Result, SnakeError};

use crate::snake::Direction::{self, *};

pub type GridInt = u16;

/// A cell of the play field. Both axes stay in `[0, grid_size)`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coords {
    pub x: GridInt,
    pub y: GridInt,
}

impl Coords {
    pub fn new(x: GridInt, y: GridInt) -> Self {
        Coords { x, y }
    }

    /// The neighbouring cell in `direction`, wrapping around the edges.
    /// `grid_size` must be at least 1.
    pub fn step(self, direction: Direction, grid_size: GridInt) -> Coords {
        debug_assert!(grid_size > 0, "grid size must be positive");

        // Widened so `n + size - 1` cannot overflow on large grids
        let n = u32::from(grid_size.max(1));
        let (x, y) = (u32::from(self.x) % n, u32::from(self.y) % n);

        let (x, y) = match direction {
            Up => (x, (y + n - 1) % n),
            Down => (x, (y + 1) % n),
            Left => ((x + n - 1) % n, y),
            Right => ((x + 1) % n, y),
        };

        // Both are below `n`, which came from a GridInt
        Coords::new(x as GridInt, y as GridInt)
    }
}

impl From<(GridInt, GridInt)> for Coords {
    fn from((x, y): (GridInt, GridInt)) -> Self {
        Coords::new(x, y)
    }
}
