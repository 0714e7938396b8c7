use std::cell::Cell;
use std::time::{Duration, Instant};

const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Time source for the scheduler, measured from an arbitrary origin.
pub trait Clock {
    fn now(&self) -> Duration;
}

pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock { origin: Instant::now() }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        SystemClock::new()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Virtual clock that only moves when told to.
#[derive(Default)]
pub struct ManualClock {
    now: Cell<Duration>,
}

impl ManualClock {
    pub fn new() -> Self {
        ManualClock::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    pub fn set(&self, to: Duration) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> Duration {
        (**self).now()
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimerKind {
    Tick,
    Ramp,
}

#[derive(Debug)]
struct Timer {
    id: TimerId,
    kind: TimerKind,
    period: Duration,
    due: Duration,
}

/// Periodic timers sharing one thread. Nothing runs on its own: the owner
/// polls `pop_due` and handles one firing at a time.
#[derive(Debug, Default)]
pub struct Scheduler {
    timers: Vec<Timer>,
    next_id: u64,
}

impl Scheduler {
    pub fn new() -> Self {
        Scheduler::default()
    }

    /// Starts a timer that first fires one `period` after `now`.
    pub fn every(&mut self, kind: TimerKind, period: Duration, now: Duration) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;

        let period = period.max(MIN_PERIOD);
        self.timers.push(Timer { id, kind, period, due: now + period });
        id
    }

    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.timers.len();
        self.timers.retain(|t| t.id != id);
        self.timers.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.timers.clear();
    }

    /// Changes the period used the next time the timer is rescheduled. The
    /// currently pending deadline is kept.
    pub fn set_period(&mut self, id: TimerId, period: Duration) -> bool {
        match self.timers.iter_mut().find(|t| t.id == id) {
            Some(timer) => {
                timer.period = period.max(MIN_PERIOD);
                true
            }
            None => false,
        }
    }

    /// Earliest timer due at or before `now`, rescheduled one period later.
    /// Ties go to the timer created first.
    pub fn pop_due(&mut self, now: Duration) -> Option<(TimerId, TimerKind)> {
        // Vec keeps creation order, so min_by_key returns the oldest on ties
        let timer = self
            .timers
            .iter_mut()
            .filter(|t| t.due <= now)
            .min_by_key(|t| t.due)?;

        timer.due += timer.period;
        Some((timer.id, timer.kind))
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.timers.iter().map(|t| t.due).min()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    fn drain(s: &mut Scheduler, now: Duration) -> Vec<TimerKind> {
        let mut fired = vec![];
        while let Some((_, kind)) = s.pop_due(now) {
            fired.push(kind);
        }
        fired
    }

    #[test]
    fn manual_clock_only_moves_when_advanced() {
        let clock = ManualClock::new();
        assert_eq!(clock.now(), ms(0));
        clock.advance(ms(150));
        clock.advance(ms(50));
        assert_eq!(clock.now(), ms(200));
        clock.set(ms(10));
        assert_eq!((&clock).now(), ms(10));
    }

    #[test]
    fn nothing_fires_before_first_period() {
        let mut s = Scheduler::new();
        s.every(TimerKind::Tick, ms(100), ms(0));
        assert!(s.pop_due(ms(99)).is_none());
        assert_eq!(s.pop_due(ms(100)).map(|(_, k)| k), Some(TimerKind::Tick));
        assert_eq!(s.next_deadline(), Some(ms(200)));
    }

    #[test]
    fn late_poll_catches_up_in_deadline_order() {
        let mut s = Scheduler::new();
        s.every(TimerKind::Tick, ms(100), ms(0));
        s.every(TimerKind::Ramp, ms(250), ms(0));

        use crate::clock::TimerKind::*;
        assert_eq!(drain(&mut s, ms(300)), vec![Tick, Tick, Ramp, Tick]);
    }

    #[test]
    fn ties_go_to_older_timer() {
        let mut s = Scheduler::new();
        s.every(TimerKind::Ramp, ms(50), ms(0));
        s.every(TimerKind::Tick, ms(50), ms(0));
        assert_eq!(drain(&mut s, ms(50)), vec![TimerKind::Ramp, TimerKind::Tick]);
    }

    #[test]
    fn period_change_applies_after_next_firing() {
        let mut s = Scheduler::new();
        let id = s.every(TimerKind::Tick, ms(100), ms(0));
        assert!(s.set_period(id, ms(40)));
        assert_eq!(s.next_deadline(), Some(ms(100)));
        s.pop_due(ms(100));
        assert_eq!(s.next_deadline(), Some(ms(140)));
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let mut s = Scheduler::new();
        let tick = s.every(TimerKind::Tick, ms(10), ms(0));
        s.every(TimerKind::Ramp, ms(10), ms(0));

        assert!(s.cancel(tick));
        assert!(!s.cancel(tick));
        assert!(!s.set_period(tick, ms(5)));
        assert_eq!(drain(&mut s, ms(10)), vec![TimerKind::Ramp]);

        s.cancel_all();
        assert!(s.is_empty());
        assert!(s.pop_due(ms(1_000)).is_none());
        assert_eq!(s.next_deadline(), None);
    }

    #[test]
    fn zero_period_is_clamped() {
        let mut s = Scheduler::new();
        s.every(TimerKind::Tick, ms(0), ms(0));
        assert_eq!(drain(&mut s, ms(3)).len(), 3);
    }
}
