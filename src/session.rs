use std::time::Duration;

use log::{debug, info, warn};
use rand::Rng;

use crate::clock::{Clock, Scheduler, TimerId, TimerKind};
use crate::config::Config;
use crate::engine::{TickOutcome, World};
use crate::snake::Direction;
use crate::store::HighScoreStore;
use crate::{Result, SnakeError};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    GameOver,
}

/// Sound hooks for whoever is listening. `MusicStart`/`MusicStop` bracket a
/// running session.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Cue {
    Start,
    Eat,
    GameOver,
    MusicStart,
    MusicStop,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    Started,
    Render,
    Ate { score: u32 },
    SpeedChanged { interval: Duration },
    GameOver { score: u32, high_score: u32, new_high_score: bool, cleared: bool },
    Sound(Cue),
}

#[derive(Clone, Debug)]
pub struct SessionState {
    pub phase: Phase,
    /// `None` until the first session starts. Kept after game over.
    pub world: Option<World>,
    pub speed: Duration,
    pub high_score: u32,
    /// Set when the last finished session beat the previous high score. Stays
    /// up through the following session until its game over decides again.
    pub new_high_score: bool,
}

impl SessionState {
    pub fn score(&self) -> u32 {
        self.world.as_ref().map_or(0, |w| w.score())
    }
}

pub struct SessionController<C, S, R> {
    config: Config,
    clock: C,
    store: S,
    rng: R,
    scheduler: Scheduler,
    tick_timer: Option<TimerId>,
    state: SessionState,
}

impl<C: Clock, S: HighScoreStore, R: Rng> SessionController<C, S, R> {
    pub fn new(config: Config, clock: C, mut store: S, rng: R) -> Result<Self> {
        config.validate()?;

        let high_score = store.load()?.unwrap_or(0);
        info!("loaded high score {}", high_score);

        let state = SessionState {
            phase: Phase::Idle,
            world: None,
            speed: config.initial_speed,
            high_score,
            new_high_score: false,
        };

        Ok(SessionController {
            config,
            clock,
            store,
            rng,
            scheduler: Scheduler::new(),
            tick_timer: None,
            state,
        })
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// Time left until the next timer fires, if any is running.
    pub fn time_to_next_timer(&self) -> Option<Duration> {
        let now = self.clock.now();
        self.scheduler
            .next_deadline()
            .map(|due| due.checked_sub(now).unwrap_or_default())
    }

    pub fn start(&mut self) -> Result<Vec<SessionEvent>> {
        if self.state.phase != Phase::Idle {
            return Err(SnakeError::InvalidTransition { from: self.state.phase, action: "start" });
        }

        let world = World::new(self.config.grid_size, &mut self.rng);
        self.start_from(world)
    }

    /// Like `start`, but plays on a prepared world instead of a fresh one.
    pub fn start_from(&mut self, world: World) -> Result<Vec<SessionEvent>> {
        if self.state.phase != Phase::Idle {
            return Err(SnakeError::InvalidTransition { from: self.state.phase, action: "start" });
        }
        self.check_fits(&world)?;

        let mut events = vec![SessionEvent::Sound(Cue::Start)];
        self.reset(world, &mut events);
        Ok(events)
    }

    pub fn restart(&mut self) -> Result<Vec<SessionEvent>> {
        if self.state.phase != Phase::GameOver {
            return Err(SnakeError::InvalidTransition { from: self.state.phase, action: "restart" });
        }

        let world = World::new(self.config.grid_size, &mut self.rng);
        self.restart_from(world)
    }

    /// Like `restart`, but plays on a prepared world instead of a fresh one.
    pub fn restart_from(&mut self, world: World) -> Result<Vec<SessionEvent>> {
        if self.state.phase != Phase::GameOver {
            return Err(SnakeError::InvalidTransition { from: self.state.phase, action: "restart" });
        }
        self.check_fits(&world)?;

        let mut events = vec![];
        self.reset(world, &mut events);
        Ok(events)
    }

    /// Queues a turn. Ignored unless a session is running.
    pub fn turn(&mut self, direction: Direction) -> bool {
        match (&self.state.phase, self.state.world.as_mut()) {
            (Phase::Running, Some(world)) => world.turn(direction),
            _ => false,
        }
    }

    /// Runs every timer that is due, oldest deadline first.
    pub fn advance(&mut self) -> Vec<SessionEvent> {
        let now = self.clock.now();
        let mut events = vec![];

        while let Some((_, kind)) = self.scheduler.pop_due(now) {
            match kind {
                TimerKind::Tick => self.on_tick(&mut events),
                TimerKind::Ramp => self.on_ramp(&mut events),
            }
        }

        events
    }

    ///////////////////////////////////////////////////////////////////////////

    fn check_fits(&self, world: &World) -> Result<()> {
        if world.grid_size() != self.config.grid_size {
            return Err(SnakeError::InvalidConfig(format!(
                "world is {} cells wide but the board is {}",
                world.grid_size(),
                self.config.grid_size
            )));
        }

        Ok(())
    }

    fn reset(&mut self, world: World, events: &mut Vec<SessionEvent>) {
        // Leftover timers would make two loops run side by side
        self.scheduler.cancel_all();

        let now = self.clock.now();
        self.state.world = Some(world);
        self.state.speed = self.config.initial_speed;
        self.state.phase = Phase::Running;

        self.tick_timer = Some(self.scheduler.every(TimerKind::Tick, self.state.speed, now));
        self.scheduler.every(TimerKind::Ramp, self.config.ramp_period, now);

        info!("session started, tick every {:?}", self.state.speed);

        events.push(SessionEvent::Sound(Cue::MusicStart));
        events.push(SessionEvent::Started);
        events.push(SessionEvent::Render);
    }

    fn on_tick(&mut self, events: &mut Vec<SessionEvent>) {
        let world = match self.state.world.as_mut() {
            Some(world) if self.state.phase == Phase::Running => world,
            _ => return,
        };

        match world.tick(&mut self.rng) {
            TickOutcome::Moved { ate } => {
                if ate {
                    events.push(SessionEvent::Ate { score: world.score() });
                    events.push(SessionEvent::Sound(Cue::Eat));
                }
                events.push(SessionEvent::Render);
            }
            TickOutcome::Collided { score } => self.end(score, false, events),
            TickOutcome::Filled { score } => {
                events.push(SessionEvent::Sound(Cue::Eat));
                events.push(SessionEvent::Render);
                self.end(score, true, events);
            }
        }
    }

    fn on_ramp(&mut self, events: &mut Vec<SessionEvent>) {
        let faster = self
            .state
            .speed
            .checked_sub(self.config.speed_step)
            .unwrap_or_default()
            .max(self.config.min_speed);

        if faster == self.state.speed {
            return;
        }

        self.state.speed = faster;
        if let Some(id) = self.tick_timer {
            self.scheduler.set_period(id, faster);
        }

        debug!("tick interval now {:?}", faster);
        events.push(SessionEvent::SpeedChanged { interval: faster });
    }

    fn end(&mut self, score: u32, cleared: bool, events: &mut Vec<SessionEvent>) {
        self.scheduler.cancel_all();
        self.tick_timer = None;
        self.state.phase = Phase::GameOver;

        let new_high_score = score > self.state.high_score;
        if new_high_score {
            self.state.high_score = score;
            if let Err(err) = self.store.save(score) {
                warn!("could not persist high score {}: {}", score, err);
            }
        }
        self.state.new_high_score = new_high_score;

        info!("game over, score {} (high score {})", score, self.state.high_score);

        events.push(SessionEvent::Sound(Cue::MusicStop));
        events.push(SessionEvent::Sound(Cue::GameOver));
        events.push(SessionEvent::GameOver {
            score,
            high_score: self.state.high_score,
            new_high_score,
            cleared,
        });
    }
}
