use std::time::Duration;

use log::debug;
use rand::Rng;

use crate::clock::{SimulationClock, TimerEvent, TimerId};
use crate::config::{BonusTiming, BONUS_POINTS, FOOD_POINTS};
use crate::grid::{Cell, GridSize};

/// Food type and associated metadata.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum FoodKind {
    /// Always on the board; relocates when eaten.
    Normal,
    /// Appears on a timer and disappears again if not eaten.
    Bonus,
}

impl FoodKind {
    /// Returns the score value granted when eaten.
    #[must_use]
    pub fn points(self) -> u32 {
        match self {
            Self::Normal => FOOD_POINTS,
            Self::Bonus => BONUS_POINTS,
        }
    }
}

/// Food entity currently active on the board.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Food {
    pub position: Cell,
    pub kind: FoodKind,
    /// Session time at which a bonus vanishes. Always `None` for normal food.
    pub expires_at: Option<Duration>,
}

impl Food {
    /// Creates a normal food at `position`.
    #[must_use]
    pub fn normal(position: Cell) -> Self {
        Self {
            position,
            kind: FoodKind::Normal,
            expires_at: None,
        }
    }

    /// Creates a bonus food at `position` that expires at `expires_at`.
    #[must_use]
    pub fn bonus(position: Cell, expires_at: Duration) -> Self {
        Self {
            position,
            kind: FoodKind::Bonus,
            expires_at: Some(expires_at),
        }
    }
}

/// Where the bonus lifecycle currently stands, with the handle of its one
/// pending timer.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum BonusPhase {
    /// No timer armed; the session is not running.
    Idle,
    /// Waiting for the appearance timer.
    Waiting(TimerId),
    /// On the board until the expiry timer fires.
    Visible(TimerId),
}

/// Places regular food and drives the bonus appear/expire cycle.
///
/// Placement does not look at the snake; food may land on a body cell.
#[derive(Debug, Clone)]
pub struct FoodSpawner {
    grid: GridSize,
    timing: BonusTiming,
    food: Food,
    bonus: Option<Food>,
    phase: BonusPhase,
}

impl FoodSpawner {
    #[must_use]
    pub fn new(grid: GridSize, first_food: Cell, timing: BonusTiming) -> Self {
        Self {
            grid,
            timing,
            food: Food::normal(first_food),
            bonus: None,
            phase: BonusPhase::Idle,
        }
    }

    /// The regular food, present at all times.
    #[must_use]
    pub fn food(&self) -> Food {
        self.food
    }

    /// The bonus, while it is on the board.
    #[must_use]
    pub fn bonus(&self) -> Option<Food> {
        self.bonus
    }

    #[must_use]
    pub fn phase(&self) -> BonusPhase {
        self.phase
    }

    /// Moves the regular food to a fresh random cell and returns it.
    pub fn relocate_food<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Cell {
        let position = random_cell_except(rng, self.grid, self.food.position);
        self.food = Food::normal(position);
        position
    }

    /// Places the regular food at an explicit cell.
    pub fn place_food(&mut self, position: Cell) {
        self.food = Food::normal(position);
    }

    /// Starts the bonus cycle if it is not already running.
    pub fn arm<R: Rng + ?Sized>(&mut self, clock: &mut SimulationClock, rng: &mut R) {
        if self.phase == BonusPhase::Idle {
            self.schedule_appearance(clock, rng);
        }
    }

    /// Cancels whichever bonus timer is pending and clears the bonus.
    pub fn disarm(&mut self, clock: &mut SimulationClock) {
        match self.phase {
            BonusPhase::Waiting(id) | BonusPhase::Visible(id) => {
                clock.cancel(id);
            }
            BonusPhase::Idle => {}
        }

        self.bonus = None;
        self.phase = BonusPhase::Idle;
    }

    /// Handles a fired appearance timer. Returns the bonus cell when `id` is
    /// the timer this spawner is waiting on.
    pub fn on_appear<R: Rng + ?Sized>(
        &mut self,
        id: TimerId,
        clock: &mut SimulationClock,
        rng: &mut R,
    ) -> Option<Cell> {
        if self.phase != BonusPhase::Waiting(id) {
            return None;
        }

        let position = random_cell(rng, self.grid);
        let expiry = clock.schedule_in(self.timing.visible(), TimerEvent::BonusExpire);
        self.bonus = Some(Food::bonus(position, clock.now() + self.timing.visible()));
        self.phase = BonusPhase::Visible(expiry);
        debug!("bonus appeared at ({}, {})", position.row, position.col);

        Some(position)
    }

    /// Handles a fired expiry timer. Returns true when the bonus was removed.
    pub fn on_expire<R: Rng + ?Sized>(
        &mut self,
        id: TimerId,
        clock: &mut SimulationClock,
        rng: &mut R,
    ) -> bool {
        if self.phase != BonusPhase::Visible(id) {
            return false;
        }

        self.bonus = None;
        self.schedule_appearance(clock, rng);
        true
    }

    /// Removes an eaten bonus and restarts the appearance delay.
    pub fn take_bonus<R: Rng + ?Sized>(&mut self, clock: &mut SimulationClock, rng: &mut R) {
        if let BonusPhase::Visible(expiry) = self.phase {
            clock.cancel(expiry);
        }

        self.bonus = None;
        self.schedule_appearance(clock, rng);
    }

    /// Puts the spawner back to its initial layout with no timers pending.
    pub fn reset(&mut self, first_food: Cell, clock: &mut SimulationClock) {
        self.disarm(clock);
        self.food = Food::normal(first_food);
    }

    fn schedule_appearance<R: Rng + ?Sized>(&mut self, clock: &mut SimulationClock, rng: &mut R) {
        let delay = next_bonus_delay(rng, &self.timing);
        let id = clock.schedule_in(delay, TimerEvent::BonusAppear);
        self.phase = BonusPhase::Waiting(id);
    }
}

/// Draws a bonus appearance delay uniformly from the configured slots.
#[must_use]
pub fn next_bonus_delay<R: Rng + ?Sized>(rng: &mut R, timing: &BonusTiming) -> Duration {
    let slot = rng.gen_range(0..timing.delay_slots.max(1));
    timing.delay_for_slot(slot)
}

/// Uniformly random cell anywhere on the grid.
#[must_use]
pub fn random_cell<R: Rng + ?Sized>(rng: &mut R, grid: GridSize) -> Cell {
    let index = rng.gen_range(0..grid.total_cells().max(1));
    grid.cell_at(index)
}

/// Uniformly random cell other than `current`. A one-cell grid returns
/// `current`.
#[must_use]
pub fn random_cell_except<R: Rng + ?Sized>(rng: &mut R, grid: GridSize, current: Cell) -> Cell {
    let total = grid.total_cells();
    let Some(skip) = grid.index_of(current) else {
        return random_cell(rng, grid);
    };
    if total <= 1 {
        return current;
    }

    let mut index = rng.gen_range(0..total - 1);
    if index >= skip {
        index += 1;
    }
    grid.cell_at(index)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::clock::{SimulationClock, TimerEvent};
    use crate::config::BonusTiming;
    use crate::grid::{Cell, GridSize};

    use super::{
        next_bonus_delay, random_cell, random_cell_except, BonusPhase, FoodKind, FoodSpawner,
    };

    fn spawner() -> FoodSpawner {
        FoodSpawner::new(
            GridSize::new(20, 20),
            Cell::new(10, 10),
            BonusTiming::default(),
        )
    }

    #[test]
    fn bonus_food_has_higher_points() {
        assert_eq!(FoodKind::Normal.points(), 1);
        assert_eq!(FoodKind::Bonus.points(), 2);
    }

    #[test]
    fn random_cells_stay_inside_the_grid() {
        let mut rng = StdRng::seed_from_u64(7);
        let grid = GridSize::new(3, 5);

        for _ in 0..500 {
            assert!(grid.contains(random_cell(&mut rng, grid)));
        }
    }

    #[test]
    fn relocation_never_reuses_the_current_cell() {
        let mut rng = StdRng::seed_from_u64(11);
        let grid = GridSize::new(2, 2);
        let current = Cell::new(1, 0);

        for _ in 0..200 {
            let next = random_cell_except(&mut rng, grid, current);
            assert_ne!(next, current);
            assert!(grid.contains(next));
        }
    }

    #[test]
    fn relocation_on_single_cell_grid_stays_put() {
        let mut rng = StdRng::seed_from_u64(1);
        let grid = GridSize::new(1, 1);

        assert_eq!(
            random_cell_except(&mut rng, grid, Cell::new(0, 0)),
            Cell::new(0, 0)
        );
    }

    #[test]
    fn bonus_delays_come_from_the_discrete_set() {
        let mut rng = StdRng::seed_from_u64(3);
        let timing = BonusTiming::default();

        for _ in 0..500 {
            let ms = next_bonus_delay(&mut rng, &timing).as_millis() as u64;
            assert!((5_000..=35_000).contains(&ms));
            assert_eq!((ms - 5_000) % 2_000, 0);
        }
    }

    #[test]
    fn bonus_appears_then_expires_after_visible_window() {
        let mut rng = StdRng::seed_from_u64(5);
        let mut clock = SimulationClock::new();
        let mut spawner = spawner();

        spawner.arm(&mut clock, &mut rng);
        let (id, event) = clock.pop_due(Duration::from_secs(60)).expect("appear timer");
        assert_eq!(event, TimerEvent::BonusAppear);
        let appeared_at = clock.now();

        let cell = spawner.on_appear(id, &mut clock, &mut rng).expect("bonus placed");
        let bonus = spawner.bonus().expect("bonus visible");
        assert_eq!(bonus.position, cell);
        assert_eq!(bonus.expires_at, Some(appeared_at + Duration::from_secs(6)));

        let (id, event) = clock.pop_due(Duration::from_secs(120)).expect("expire timer");
        assert_eq!(event, TimerEvent::BonusExpire);
        assert_eq!(clock.now(), appeared_at + Duration::from_secs(6));
        assert!(spawner.on_expire(id, &mut clock, &mut rng));
        assert_eq!(spawner.bonus(), None);
        assert!(matches!(spawner.phase(), BonusPhase::Waiting(_)));
    }

    #[test]
    fn arming_twice_keeps_a_single_timer() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut clock = SimulationClock::new();
        let mut spawner = spawner();

        spawner.arm(&mut clock, &mut rng);
        spawner.arm(&mut clock, &mut rng);

        assert_eq!(clock.pending_count(), 1);
    }

    #[test]
    fn disarm_cancels_pending_appearance() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut clock = SimulationClock::new();
        let mut spawner = spawner();

        spawner.arm(&mut clock, &mut rng);
        spawner.disarm(&mut clock);

        assert_eq!(spawner.phase(), BonusPhase::Idle);
        assert_eq!(clock.pop_due(Duration::from_secs(60)), None);
    }

    #[test]
    fn taking_bonus_cancels_expiry_and_schedules_next_appearance() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut clock = SimulationClock::new();
        let mut spawner = spawner();

        spawner.arm(&mut clock, &mut rng);
        let (id, _) = clock.pop_due(Duration::from_secs(60)).expect("appear timer");
        spawner.on_appear(id, &mut clock, &mut rng);
        let BonusPhase::Visible(expiry) = spawner.phase() else {
            panic!("bonus should be visible");
        };

        spawner.take_bonus(&mut clock, &mut rng);

        assert!(!clock.is_pending(expiry));
        assert_eq!(spawner.bonus(), None);
        let (_, event) = clock.pop_due(Duration::from_secs(600)).expect("next appear");
        assert_eq!(event, TimerEvent::BonusAppear);
    }

    #[test]
    fn stale_timer_ids_are_ignored() {
        let mut rng = StdRng::seed_from_u64(19);
        let mut clock = SimulationClock::new();
        let mut spawner = spawner();

        spawner.arm(&mut clock, &mut rng);
        let (old, _) = clock.pop_due(Duration::from_secs(60)).expect("appear timer");
        spawner.reset(Cell::new(10, 10), &mut clock);

        assert_eq!(spawner.on_appear(old, &mut clock, &mut rng), None);
        assert!(!spawner.on_expire(old, &mut clock, &mut rng));
        assert_eq!(spawner.bonus(), None);
    }
}
