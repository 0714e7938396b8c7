// End-to-end sessions driven by a virtual clock

use std::time::Duration;

use rand::rngs::StdRng;
use rand::SeedableRng;

use snake::clock::{Clock, ManualClock};
use snake::config::Config;
use snake::engine::World;
use snake::food::Food;
use snake::session::{Cue, Phase, SessionController, SessionEvent};
use snake::snake::Direction::{self, *};
use snake::snake::Snake;
use snake::store::{HighScoreStore, JsonFileStore, MemoryStore};
use snake::{Coords, GridInt};

fn world(body: &[(GridInt, GridInt)], dir: Direction, food: (GridInt, GridInt)) -> World {
    let snake = Snake::from_body(body.iter().map(|&c| Coords::from(c)), dir).unwrap();
    World::from_parts(20, snake, Food::at(food.into()))
}

fn next<S, R>(session: &mut SessionController<&ManualClock, S, R>, clock: &ManualClock) -> Vec<SessionEvent>
where
    S: HighScoreStore,
    R: rand::Rng,
{
    clock.advance(session.time_to_next_timer().expect("no timer running"));
    session.advance()
}

fn body(session: &SessionController<&ManualClock, MemoryStore, StdRng>) -> Vec<(GridInt, GridInt)> {
    let world = session.state().world.as_ref().unwrap();
    world.snake().body().map(|c| (c.x, c.y)).collect()
}

#[test]
fn test_first_tick_from_starting_position() {
    let clock = ManualClock::new();
    let mut session =
        SessionController::new(Config::default(), &clock, MemoryStore::new(), StdRng::seed_from_u64(11)).unwrap();

    session.start_from(world(&[(10, 10), (10, 11), (10, 12)], Right, (3, 3))).unwrap();
    let events = next(&mut session, &clock);

    assert_eq!(events, vec![SessionEvent::Render]);
    assert_eq!(body(&session), vec![(11, 10), (10, 10), (10, 11)]);
    assert_eq!(session.state().score(), 0);
    assert_eq!(clock.now(), Duration::from_millis(100));
}

#[test]
fn test_reversal_is_ignored_mid_session() {
    let clock = ManualClock::new();
    let mut session =
        SessionController::new(Config::default(), &clock, MemoryStore::new(), StdRng::seed_from_u64(11)).unwrap();

    session.start_from(world(&[(10, 10), (10, 11), (10, 12)], Right, (3, 3))).unwrap();
    assert!(!session.turn(Left));
    next(&mut session, &clock);

    assert_eq!(session.state().world.as_ref().unwrap().snake().direction(), Right);
    assert_eq!(body(&session)[0], (11, 10));
}

#[test]
fn test_eat_grow_then_crash() {
    let clock = ManualClock::new();
    let mut session =
        SessionController::new(Config::default(), &clock, MemoryStore::with_value(0), StdRng::seed_from_u64(5)).unwrap();

    // Food right in front of the head
    session.start_from(world(&[(10, 10), (9, 10), (8, 10)], Right, (11, 10))).unwrap();

    let events = next(&mut session, &clock);
    assert!(events.contains(&SessionEvent::Ate { score: 1 }));
    assert!(events.contains(&SessionEvent::Sound(Cue::Eat)));
    assert_eq!(body(&session).len(), 4);

    let food = session.state().world.as_ref().unwrap().food().pos();
    assert_ne!(food, Coords::new(11, 10));
    assert!(!session.state().world.as_ref().unwrap().snake().occupies(food));

    // Curl back into the body: down, left, up
    for &dir in [Down, Left, Up].iter() {
        assert!(session.turn(dir));
        let events = next(&mut session, &clock);
        if session.phase() == Phase::GameOver {
            assert!(events.iter().any(|e| matches!(e, SessionEvent::GameOver { .. })));
            break;
        }
    }

    assert_eq!(session.phase(), Phase::GameOver);
    assert!(session.state().high_score >= 1);
    assert_eq!(session.store().value(), Some(session.state().high_score));
}

#[test]
fn test_same_seed_replays_identically() {
    fn play(seed: u64) -> (Vec<SessionEvent>, Vec<(GridInt, GridInt)>) {
        let clock = ManualClock::new();
        let mut session =
            SessionController::new(Config::default(), &clock, MemoryStore::new(), StdRng::seed_from_u64(seed)).unwrap();

        let mut events = session.start().unwrap();
        let turns = [Up, Left, Down, Right];
        for i in 0..200 {
            if session.phase() != Phase::Running {
                break;
            }
            session.turn(turns[(i / 3) % 4]);
            events.extend(next(&mut session, &clock));
        }

        let world = session.state().world.as_ref().unwrap();
        let food = world.food().pos();
        let cells = world.snake().body().map(|c| (c.x, c.y)).chain(Some((food.x, food.y))).collect();
        (events, cells)
    }

    assert_eq!(play(1234), play(1234));
}

#[test]
fn test_high_score_survives_restart_of_the_process() {
    let path = std::env::temp_dir().join(format!("snake-flow-{}.json", std::process::id()));
    let _ = std::fs::remove_file(&path);

    {
        let clock = ManualClock::new();
        let mut session = SessionController::new(
            Config::default(),
            &clock,
            JsonFileStore::new(&path),
            StdRng::seed_from_u64(0),
        ).unwrap();
        assert_eq!(session.state().high_score, 0);

        // Eat once, then turn down into the grown body
        let body = [(5, 5), (4, 5), (4, 6), (5, 6), (6, 6)];
        session.start_from(world(&body, Right, (6, 5))).unwrap();
        next(&mut session, &clock);
        session.turn(Down);
        let events = next(&mut session, &clock);

        assert!(events.contains(&SessionEvent::GameOver {
            score: 1,
            high_score: 1,
            new_high_score: true,
            cleared: false,
        }));
    }

    let clock = ManualClock::new();
    let session = SessionController::new(
        Config::default(),
        &clock,
        JsonFileStore::new(&path),
        StdRng::seed_from_u64(0),
    ).unwrap();
    assert_eq!(session.state().high_score, 1);

    std::fs::remove_file(&path).unwrap();
}

#[test]
fn test_restart_never_doubles_the_tick_rate() {
    let clock = ManualClock::new();
    let mut session =
        SessionController::new(Config::default(), &clock, MemoryStore::new(), StdRng::seed_from_u64(8)).unwrap();

    let body = [(5, 5), (4, 5), (4, 6), (5, 6), (6, 6)];
    session.start_from(world(&body, Down, (0, 0))).unwrap();
    next(&mut session, &clock);
    assert_eq!(session.phase(), Phase::GameOver);

    session.restart().unwrap();
    assert_eq!(session.scheduler().len(), 2);

    // A fresh snake heads right from the centre of its own column, so ten
    // straight steps can never reach its body whatever food it picks up
    let head = session.state().world.as_ref().unwrap().snake().head();
    assert_eq!(head, Coords::new(10, 10));

    // One second at 100ms per tick is ten renders, not twenty
    clock.advance(Duration::from_secs(1));
    let renders = session
        .advance()
        .into_iter()
        .filter(|e| *e == SessionEvent::Render)
        .count();
    assert_eq!(renders, 10);
    assert_eq!(session.phase(), Phase::Running);
    assert_eq!(session.state().world.as_ref().unwrap().snake().head(), Coords::new(0, 10));
}
