use std::path::PathBuf;
use std::time::Duration;

use crate::{GridInt, Result, SnakeError};

pub const MIN_GRID_SIZE: GridInt = 3;
pub const MAX_GRID_SIZE: GridInt = 64;

#[derive(Clone, Debug, PartialEq)]
pub struct Config {
    /// Cells per side of the square board
    pub grid_size: GridInt,

    /// Tick interval at the start of every session
    pub initial_speed: Duration,

    /// How much the tick interval shrinks on each ramp step
    pub speed_step: Duration,

    /// Wall-clock time between ramp steps
    pub ramp_period: Duration,

    /// The ramp never goes below this interval
    pub min_speed: Duration,

    /// Seed for food placement. Random when `None`.
    pub seed: Option<u64>,

    /// Where the high score is kept. `None` keeps it in memory only.
    pub high_score_path: Option<PathBuf>,

    pub sound: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            grid_size: 20,
            initial_speed: Duration::from_millis(100),
            speed_step: Duration::from_millis(10),
            ramp_period: Duration::from_secs(30),
            min_speed: Duration::from_millis(20),
            seed: None,
            high_score_path: Some(PathBuf::from(".snake-highscore.json")),
            sound: true,
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        if self.grid_size < MIN_GRID_SIZE || self.grid_size > MAX_GRID_SIZE {
            return Err(invalid(format!(
                "grid size must be between {} and {}, got {}",
                MIN_GRID_SIZE, MAX_GRID_SIZE, self.grid_size
            )));
        }

        if self.initial_speed.is_zero() || self.min_speed.is_zero() {
            return Err(invalid("tick interval must be greater than zero".to_string()));
        }

        if self.min_speed > self.initial_speed {
            return Err(invalid(format!(
                "minimum interval {:?} is slower than the starting interval {:?}",
                self.min_speed, self.initial_speed
            )));
        }

        if self.ramp_period.is_zero() {
            return Err(invalid("speed ramp period must be greater than zero".to_string()));
        }

        Ok(())
    }
}

fn invalid(msg: String) -> SnakeError {
    SnakeError::InvalidConfig(msg)
}
