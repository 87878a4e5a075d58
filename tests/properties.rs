use std::time::Duration;

use bonus_snake::config::{BonusTiming, SimConfig};
use bonus_snake::game::{GameSession, SessionEvent, SessionState};
use bonus_snake::grid::{Cell, GridSize};
use bonus_snake::input::Direction;
use bonus_snake::score::MemoryScoreStore;
use proptest::prelude::*;

const TICK: Duration = Duration::from_millis(200);

fn direction() -> impl Strategy<Value = Direction> {
    prop_oneof![
        Just(Direction::Up),
        Just(Direction::Down),
        Just(Direction::Left),
        Just(Direction::Right),
    ]
}

proptest! {
    #[test]
    fn head_is_spawn_plus_applied_deltas(
        inputs in prop::collection::vec(prop::option::of(direction()), 0..60),
        seed in any::<u64>(),
    ) {
        // Food and bonus are out of reach, so the snake stays one cell long
        // and every requested direction is applied.
        let config = SimConfig {
            grid: GridSize::new(200, 200),
            spawn: Cell::new(100, 100),
            first_food: Cell::new(0, 0),
            bonus: BonusTiming {
                min_delay_ms: 100_000_000,
                ..BonusTiming::default()
            },
            ..SimConfig::default()
        };
        let mut session = GameSession::new_with_seed(config, MemoryScoreStore::default(), seed)
            .expect("config is valid");
        session.on_any_key_start();

        let mut expected = Cell::new(100, 100);
        let mut last = Direction::Right;
        for input in inputs {
            if let Some(direction) = input {
                session.set_direction(direction);
                last = direction;
            }
            session.advance(TICK);
            expected = expected.step(last);
        }

        prop_assert_eq!(session.state(), SessionState::Running);
        prop_assert_eq!(session.snake.head(), expected);
        prop_assert_eq!(session.snake.len(), 1);
    }

    #[test]
    fn length_grows_by_one_exactly_on_pickup(
        inputs in prop::collection::vec(prop::option::of(direction()), 1..200),
        seed in any::<u64>(),
    ) {
        let config = SimConfig {
            grid: GridSize::new(6, 6),
            spawn: Cell::new(2, 2),
            first_food: Cell::new(2, 3),
            ..SimConfig::default()
        };
        let mut session = GameSession::new_with_seed(config, MemoryScoreStore::default(), seed)
            .expect("config is valid");
        session.on_any_key_start();

        let mut pickups = 0;
        for input in inputs {
            if session.state() != SessionState::Running {
                break;
            }
            if let Some(direction) = input {
                session.set_direction(direction);
            }

            let before = session.snake.len();
            let events = session.advance(TICK);
            let ate = events
                .iter()
                .filter(|event| matches!(event, SessionEvent::Ate { .. }))
                .count();
            let after = session.snake.len();

            prop_assert!(ate <= 1);
            prop_assert_eq!(after, before + ate);
            prop_assert!(session.snake.is_contiguous());
            pickups += ate;
        }

        prop_assert_eq!(session.snake.len(), 1 + pickups);
    }
}
