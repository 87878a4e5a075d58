use std::time::Duration;

use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::clock::{SimulationClock, TimerEvent, TimerId};
use crate::config::{ConfigError, SimConfig};
use crate::food::{BonusPhase, FoodKind, FoodSpawner};
use crate::grid::{Cell, GridSize};
use crate::input::Direction;
use crate::score::HighScoreStore;
use crate::snake::Snake;

/// Direction the snake travels when a session starts.
pub const START_DIRECTION: Direction = Direction::Right;

/// Current high-level session state.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SessionState {
    /// Waiting for the first key press.
    NotStarted,
    Running,
    Over,
}

/// Reason a session ended.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum DeathReason {
    WallCollision,
    SelfCollision,
}

/// Notifications produced while processing input and timers.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum SessionEvent {
    Started,
    Ate { kind: FoodKind, at: Cell },
    BonusAppeared(Cell),
    BonusExpired,
    GameOver {
        score: u32,
        high_score: u32,
        new_record: bool,
        reason: DeathReason,
    },
}

/// Read-only view of one committed tick or state transition.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Snapshot {
    pub grid: GridSize,
    /// Snake cells from head to tail.
    pub snake: Vec<Cell>,
    pub food: Cell,
    pub bonus: Option<Cell>,
    pub score: u32,
    pub high_score: u32,
    pub state: SessionState,
    pub death_reason: Option<DeathReason>,
}

/// One game from first key press to game over, and every restart after it.
///
/// All mutation goes through [`GameSession::advance`] or the input methods,
/// which handle timers one at a time in deadline order.
#[derive(Debug)]
pub struct GameSession<S> {
    pub snake: Snake,
    pub spawner: FoodSpawner,
    pub score: u32,
    config: SimConfig,
    state: SessionState,
    direction: Direction,
    pending_direction: Option<Direction>,
    high_score: u32,
    death_reason: Option<DeathReason>,
    tick_timer: Option<TimerId>,
    clock: SimulationClock,
    rng: StdRng,
    store: S,
    snapshot: Snapshot,
}

impl<S: HighScoreStore> GameSession<S> {
    /// Creates a session seeded from system entropy.
    pub fn new(config: SimConfig, store: S) -> Result<Self, ConfigError> {
        Self::with_rng(config, store, StdRng::from_entropy())
    }

    /// Creates a deterministic session for tests and reproducible runs.
    pub fn new_with_seed(config: SimConfig, store: S, seed: u64) -> Result<Self, ConfigError> {
        Self::with_rng(config, store, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: SimConfig, store: S, rng: StdRng) -> Result<Self, ConfigError> {
        config.validate()?;

        let snake = Snake::new(config.spawn);
        let spawner = FoodSpawner::new(config.grid, config.first_food, config.bonus);
        let high_score = store.load_high_score();
        let snapshot = Snapshot {
            grid: config.grid,
            snake: vec![config.spawn],
            food: config.first_food,
            bonus: None,
            score: 0,
            high_score,
            state: SessionState::NotStarted,
            death_reason: None,
        };

        Ok(Self {
            snake,
            spawner,
            score: 0,
            config,
            state: SessionState::NotStarted,
            direction: START_DIRECTION,
            pending_direction: None,
            high_score,
            death_reason: None,
            tick_timer: None,
            clock: SimulationClock::new(),
            rng,
            store,
            snapshot,
        })
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Direction applied on the most recent tick.
    #[must_use]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[must_use]
    pub fn high_score(&self) -> u32 {
        self.high_score
    }

    #[must_use]
    pub fn death_reason(&self) -> Option<DeathReason> {
        self.death_reason
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn clock(&self) -> &SimulationClock {
        &self.clock
    }

    /// Returns true while the fixed tick timer is armed.
    #[must_use]
    pub fn is_ticking(&self) -> bool {
        self.tick_timer
            .is_some_and(|id| self.clock.is_pending(id))
    }

    #[must_use]
    pub fn bonus_phase(&self) -> BonusPhase {
        self.spawner.phase()
    }

    /// Latest committed view for the renderer.
    #[must_use]
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Records a direction intent for the next tick. Accepted in any state.
    pub fn set_direction(&mut self, direction: Direction) {
        self.pending_direction = Some(direction);
    }

    /// Direction key press: records the intent and starts a waiting session.
    pub fn on_direction(&mut self, direction: Direction) -> Vec<SessionEvent> {
        self.set_direction(direction);
        self.on_any_key_start()
    }

    /// Generic start signal; only has an effect before the first tick.
    pub fn on_any_key_start(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        if self.state == SessionState::NotStarted {
            self.start(&mut events);
        }
        events
    }

    /// Resets a finished session so it waits for the next key press.
    ///
    /// Returns false when the session is not over.
    pub fn restart(&mut self) -> bool {
        if self.state != SessionState::Over {
            return false;
        }

        self.stop_timers();
        self.spawner.reset(self.config.first_food, &mut self.clock);
        self.snake = Snake::new(self.config.spawn);
        self.score = 0;
        self.direction = START_DIRECTION;
        self.pending_direction = None;
        self.death_reason = None;
        self.state = SessionState::NotStarted;
        info!("session restarted");

        self.publish();
        true
    }

    /// Moves session time forward by `elapsed`, firing every timer that
    /// falls due in deadline order.
    pub fn advance(&mut self, elapsed: Duration) -> Vec<SessionEvent> {
        let until = self.clock.now() + elapsed;
        let mut events = Vec::new();

        while let Some((id, event)) = self.clock.pop_due(until) {
            match event {
                TimerEvent::Tick => self.on_tick_timer(id, &mut events),
                TimerEvent::BonusAppear => {
                    if let Some(cell) = self.spawner.on_appear(id, &mut self.clock, &mut self.rng)
                    {
                        events.push(SessionEvent::BonusAppeared(cell));
                        self.publish();
                    }
                }
                TimerEvent::BonusExpire => {
                    if self.spawner.on_expire(id, &mut self.clock, &mut self.rng) {
                        debug!("bonus expired");
                        events.push(SessionEvent::BonusExpired);
                        self.publish();
                    }
                }
            }
        }

        self.clock.settle(until);
        events
    }

    /// Runs one simulation step immediately. Ignored unless running.
    pub fn tick(&mut self) -> Vec<SessionEvent> {
        let mut events = Vec::new();
        self.step(&mut events);
        events
    }

    fn on_tick_timer(&mut self, id: TimerId, events: &mut Vec<SessionEvent>) {
        if self.tick_timer != Some(id) {
            return;
        }

        self.tick_timer = None;
        self.step(events);

        if self.state == SessionState::Running {
            self.tick_timer = Some(
                self.clock
                    .schedule_in(self.config.tick_interval(), TimerEvent::Tick),
            );
        }
    }

    fn start(&mut self, events: &mut Vec<SessionEvent>) {
        self.state = SessionState::Running;
        self.tick_timer = Some(
            self.clock
                .schedule_in(self.config.tick_interval(), TimerEvent::Tick),
        );
        self.spawner.arm(&mut self.clock, &mut self.rng);
        info!("session started");

        events.push(SessionEvent::Started);
        self.publish();
    }

    fn step(&mut self, events: &mut Vec<SessionEvent>) {
        if self.state != SessionState::Running {
            return;
        }

        self.direction = self.resolve_direction();

        // Checked against the current body so a failed step leaves the
        // snake where it was. The new head never equals the old one.
        let head = self.snake.head().step(self.direction);
        if !self.config.grid.contains(head) {
            self.finish(DeathReason::WallCollision, events);
            return;
        }
        if self.snake.collides_with_self(head) {
            self.finish(DeathReason::SelfCollision, events);
            return;
        }

        self.snake.advance(self.direction);

        if head == self.spawner.food().position {
            self.spawner.relocate_food(&mut self.rng);
            self.score += FoodKind::Normal.points();
            events.push(SessionEvent::Ate {
                kind: FoodKind::Normal,
                at: head,
            });
        } else if self
            .spawner
            .bonus()
            .is_some_and(|bonus| bonus.position == head)
        {
            self.spawner.take_bonus(&mut self.clock, &mut self.rng);
            self.score += FoodKind::Bonus.points();
            events.push(SessionEvent::Ate {
                kind: FoodKind::Bonus,
                at: head,
            });
        } else {
            self.snake.shrink();
        }

        self.publish();
    }

    /// Takes the pending intent unless it would turn back through the neck.
    fn resolve_direction(&mut self) -> Direction {
        let Some(requested) = self.pending_direction.take() else {
            return self.direction;
        };

        let reverses_into_neck = self
            .snake
            .neck()
            .is_some_and(|neck| self.snake.head().step(requested) == neck);
        if reverses_into_neck {
            debug!("ignored reversal {requested:?} through the neck");
            return self.direction;
        }

        requested
    }

    fn finish(&mut self, reason: DeathReason, events: &mut Vec<SessionEvent>) {
        self.state = SessionState::Over;
        self.death_reason = Some(reason);
        self.stop_timers();

        let new_record = self.score > self.high_score;
        if new_record {
            self.high_score = self.score;
            if let Err(error) = self.store.save_high_score(self.score) {
                warn!("failed to save high score: {error}");
            }
        }
        info!(
            "game over ({reason:?}) score={} high_score={}",
            self.score, self.high_score
        );

        events.push(SessionEvent::GameOver {
            score: self.score,
            high_score: self.high_score,
            new_record,
            reason,
        });
        self.publish();
    }

    fn stop_timers(&mut self) {
        if let Some(id) = self.tick_timer.take() {
            self.clock.cancel(id);
        }
        self.spawner.disarm(&mut self.clock);
    }

    fn publish(&mut self) {
        self.snapshot = Snapshot {
            grid: self.config.grid,
            snake: self.snake.segments().copied().collect(),
            food: self.spawner.food().position,
            bonus: self.spawner.bonus().map(|bonus| bonus.position),
            score: self.score,
            high_score: self.high_score,
            state: self.state,
            death_reason: self.death_reason,
        };
    }
}
