use std::fs::File;
use std::path::PathBuf;
use std::process::exit;
use std::sync::Mutex;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::filter::LevelFilter;

use snake::config::Config;
use snake::game::TerminalGame;
use snake::GridInt;

#[derive(Parser, Debug)]
#[command(name = "snake", about = "Snake on a wrap-around board")]
struct Cli {
    /// Cells per side of the board
    #[arg(short = 'g', long, default_value_t = 20)]
    grid_size: GridInt,

    /// Starting tick interval in milliseconds
    #[arg(short = 's', long, default_value_t = 100)]
    speed: u64,

    /// Milliseconds taken off the tick interval at each ramp step
    #[arg(long, default_value_t = 10)]
    speed_step: u64,

    /// Seconds between ramp steps
    #[arg(long, default_value_t = 30)]
    ramp_every: u64,

    /// Fastest tick interval the ramp may reach, in milliseconds
    #[arg(long, default_value_t = 20)]
    min_speed: u64,

    /// Seed for food placement
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, default_value = ".snake-highscore.json")]
    high_score_file: PathBuf,

    /// Keep the high score in memory only
    #[arg(long)]
    no_persist: bool,

    /// No terminal bell
    #[arg(long)]
    mute: bool,

    /// Write logs to this file
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Log debug output too
    #[arg(short = 'v', long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> Config {
        Config {
            grid_size: self.grid_size,
            initial_speed: Duration::from_millis(self.speed),
            speed_step: Duration::from_millis(self.speed_step),
            ramp_period: Duration::from_secs(self.ramp_every),
            min_speed: Duration::from_millis(self.min_speed),
            seed: self.seed,
            high_score_path: if self.no_persist {None} else {Some(self.high_score_file.clone())},
            sound: !self.mute,
        }
    }
}

fn init_logging(cli: &Cli) -> std::io::Result<()> {
    // The screen belongs to the game, so logs only go to a file
    if let Some(path) = &cli.log_file {
        let level = if cli.verbose {LevelFilter::DEBUG} else {LevelFilter::INFO};
        tracing_subscriber::fmt()
            .with_writer(Mutex::new(File::create(path)?))
            .with_ansi(false)
            .with_max_level(level)
            .init();
    }

    Ok(())
}

fn main() {
    let cli = Cli::parse();

    if let Err(err) = init_logging(&cli) {
        eprintln!("snake: cannot open log file: {}", err);
        exit(1);
    }

    let res = TerminalGame::new(cli.config()).and_then(|mut game| game.run());

    if let Err(err) = res {
        log::error!("{}", err);
        eprintln!("snake: {}", err);
        exit(1);
    }
}
