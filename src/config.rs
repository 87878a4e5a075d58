use std::time::Duration;

use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grid::{Cell, GridSize};

/// Default grid height in cells.
pub const DEFAULT_GRID_ROWS: u16 = 20;

/// Default grid width in cells.
pub const DEFAULT_GRID_COLS: u16 = 20;

/// Base tick interval in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 200;

/// How long a bonus stays on the board once it appears.
pub const BONUS_VISIBLE_MS: u64 = 6_000;

/// Shortest delay before the next bonus appears.
pub const BONUS_MIN_DELAY_MS: u64 = 5_000;

/// Spacing between the possible bonus delays.
pub const BONUS_DELAY_STEP_MS: u64 = 2_000;

/// Number of distinct bonus delays (5s, 7s, ... 35s).
pub const BONUS_DELAY_SLOTS: u32 = 16;

/// Cell the snake starts from.
pub const DEFAULT_SPAWN_CELL: Cell = Cell::new(5, 5);

/// Cell the first food is placed on.
pub const DEFAULT_FOOD_CELL: Cell = Cell::new(10, 10);

/// Points for eating regular food.
pub const FOOD_POINTS: u32 = 1;

/// Points for eating a bonus.
pub const BONUS_POINTS: u32 = 2;

/// Invalid simulation parameters.
#[derive(Debug, Clone, Error, Eq, PartialEq)]
pub enum ConfigError {
    #[error("grid must have at least one row and one column, got {rows}x{cols}")]
    EmptyGrid { rows: u16, cols: u16 },
    #[error("tick interval must be greater than zero")]
    ZeroTickInterval,
    #[error("bonus delay needs at least one slot")]
    NoBonusDelaySlots,
    #[error("bonus must stay visible for more than zero milliseconds")]
    ZeroBonusVisible,
    #[error("bonus timing overflows: longest delay or visible window exceeds u64 milliseconds")]
    BonusTimingOverflow,
    #[error("{what} cell ({row}, {col}) lies outside the {rows}x{cols} grid")]
    CellOutOfBounds {
        what: &'static str,
        row: i32,
        col: i32,
        rows: u16,
        cols: u16,
    },
}

/// Timing of the intermittent bonus food.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct BonusTiming {
    pub min_delay_ms: u64,
    pub delay_step_ms: u64,
    pub delay_slots: u32,
    pub visible_ms: u64,
}

impl BonusTiming {
    /// Delay for slot `k`, clamped into the configured slot range.
    #[must_use]
    pub fn delay_for_slot(&self, slot: u32) -> Duration {
        let slot = slot.min(self.delay_slots.saturating_sub(1));
        let ms = self
            .delay_step_ms
            .saturating_mul(u64::from(slot))
            .saturating_add(self.min_delay_ms);
        Duration::from_millis(ms)
    }

    /// Longest delay plus visible window, or `None` when it overflows.
    fn longest_cycle_ms(&self) -> Option<u64> {
        let top_slot = u64::from(self.delay_slots.saturating_sub(1));
        self.delay_step_ms
            .checked_mul(top_slot)?
            .checked_add(self.min_delay_ms)?
            .checked_add(self.visible_ms)
    }

    #[must_use]
    pub fn visible(&self) -> Duration {
        Duration::from_millis(self.visible_ms)
    }
}

impl Default for BonusTiming {
    fn default() -> Self {
        Self {
            min_delay_ms: BONUS_MIN_DELAY_MS,
            delay_step_ms: BONUS_DELAY_STEP_MS,
            delay_slots: BONUS_DELAY_SLOTS,
            visible_ms: BONUS_VISIBLE_MS,
        }
    }
}

/// Every tunable of one simulation session.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    pub grid: GridSize,
    pub tick_interval_ms: u64,
    pub spawn: Cell,
    pub first_food: Cell,
    pub bonus: BonusTiming,
}

impl SimConfig {
    /// Checks that the grid is non-empty, timers are non-zero and the
    /// starting cells fit the grid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let GridSize { rows, cols } = self.grid;
        if rows == 0 || cols == 0 {
            return Err(ConfigError::EmptyGrid { rows, cols });
        }
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::ZeroTickInterval);
        }
        if self.bonus.delay_slots == 0 {
            return Err(ConfigError::NoBonusDelaySlots);
        }
        // A zero window would let appear and expire reschedule each other
        // at the same instant forever.
        if self.bonus.visible_ms == 0 {
            return Err(ConfigError::ZeroBonusVisible);
        }
        if self.bonus.longest_cycle_ms().is_none() {
            return Err(ConfigError::BonusTimingOverflow);
        }

        for (what, cell) in [("spawn", self.spawn), ("first food", self.first_food)] {
            if !self.grid.contains(cell) {
                return Err(ConfigError::CellOutOfBounds {
                    what,
                    row: cell.row,
                    col: cell.col,
                    rows,
                    cols,
                });
            }
        }

        Ok(())
    }

    /// Defaults with the spawn and first food placed for `grid`.
    ///
    /// Both sit on the diagonal at one quarter and one half of the grid,
    /// which reproduces (5, 5) and (10, 10) on the default 20x20 board.
    #[must_use]
    pub fn for_grid(grid: GridSize) -> Self {
        let at = |fraction: u16| {
            Cell::new(
                i32::from(grid.rows / fraction),
                i32::from(grid.cols / fraction),
            )
        };

        Self {
            grid,
            spawn: at(4),
            first_food: at(2),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            grid: GridSize::new(DEFAULT_GRID_ROWS, DEFAULT_GRID_COLS),
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            spawn: DEFAULT_SPAWN_CELL,
            first_food: DEFAULT_FOOD_CELL,
            bonus: BonusTiming::default(),
        }
    }
}

/// Colors used by the terminal renderer.
#[derive(Debug)]
pub struct Theme {
    pub snake_head: Color,
    pub snake_body: Color,
    pub food: Color,
    pub bonus: Color,
    pub play_bg: Color,
    pub border_fg: Color,
    pub hud_score: Color,
    pub hud_muted: Color,
    pub menu_title: Color,
}

pub const THEME: Theme = Theme {
    snake_head: Color::LightGreen,
    snake_body: Color::Green,
    food: Color::Red,
    bonus: Color::Yellow,
    play_bg: Color::Black,
    border_fg: Color::White,
    hud_score: Color::White,
    hud_muted: Color::DarkGray,
    menu_title: Color::Green,
};

/// One grid cell is drawn two terminal columns wide so it reads as square.
pub const CELL_WIDTH: u16 = 2;

pub const GLYPH_SNAKE: &str = "██";
pub const GLYPH_FOOD: &str = "()";
pub const GLYPH_BONUS: &str = "<>";

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use crate::grid::{Cell, GridSize};

    use super::{BonusTiming, ConfigError, SimConfig};

    #[test]
    fn default_config_is_valid() {
        assert_eq!(SimConfig::default().validate(), Ok(()));
    }

    #[test]
    fn bonus_delays_span_five_to_thirty_five_seconds() {
        let timing = BonusTiming::default();

        assert_eq!(timing.delay_for_slot(0), Duration::from_millis(5_000));
        assert_eq!(timing.delay_for_slot(1), Duration::from_millis(7_000));
        assert_eq!(timing.delay_for_slot(15), Duration::from_millis(35_000));
        assert_eq!(timing.delay_for_slot(99), Duration::from_millis(35_000));
        assert_eq!(timing.visible(), Duration::from_millis(6_000));
    }

    #[test]
    fn empty_grid_is_rejected() {
        let config = SimConfig {
            grid: GridSize::new(0, 20),
            ..SimConfig::default()
        };

        assert_eq!(
            config.validate(),
            Err(ConfigError::EmptyGrid { rows: 0, cols: 20 })
        );
    }

    #[test]
    fn zero_tick_interval_is_rejected() {
        let config = SimConfig {
            tick_interval_ms: 0,
            ..SimConfig::default()
        };

        assert_eq!(config.validate(), Err(ConfigError::ZeroTickInterval));
    }

    #[test]
    fn zero_bonus_window_is_rejected() {
        let config = SimConfig {
            bonus: BonusTiming {
                min_delay_ms: 0,
                delay_step_ms: 0,
                delay_slots: 1,
                visible_ms: 0,
            },
            ..SimConfig::default()
        };

        assert_eq!(config.validate(), Err(ConfigError::ZeroBonusVisible));
    }

    #[test]
    fn zero_bonus_delay_with_visible_window_is_accepted() {
        let config = SimConfig {
            bonus: BonusTiming {
                min_delay_ms: 0,
                delay_step_ms: 0,
                delay_slots: 1,
                visible_ms: 1,
            },
            ..SimConfig::default()
        };

        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn overflowing_bonus_delay_is_rejected() {
        let config = SimConfig {
            bonus: BonusTiming {
                min_delay_ms: u64::MAX,
                delay_step_ms: 2,
                delay_slots: 16,
                visible_ms: 6_000,
            },
            ..SimConfig::default()
        };

        assert_eq!(config.validate(), Err(ConfigError::BonusTimingOverflow));
        assert_eq!(
            config.bonus.delay_for_slot(15),
            Duration::from_millis(u64::MAX)
        );
    }

    #[test]
    fn grid_placement_matches_defaults_on_twenty_by_twenty() {
        assert_eq!(
            SimConfig::for_grid(GridSize::new(20, 20)),
            SimConfig::default()
        );
    }

    #[test]
    fn small_grids_place_spawn_and_food_inside() {
        let config = SimConfig::for_grid(GridSize::new(8, 8));

        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.spawn, Cell::new(2, 2));
        assert_eq!(config.first_food, Cell::new(4, 4));

        let tiny = SimConfig::for_grid(GridSize::new(1, 3));
        assert_eq!(tiny.validate(), Ok(()));
    }

    #[test]
    fn spawn_outside_small_grid_is_rejected() {
        let config = SimConfig {
            grid: GridSize::new(4, 4),
            spawn: Cell::new(1, 1),
            ..SimConfig::default()
        };

        assert!(matches!(
            config.validate(),
            Err(ConfigError::CellOutOfBounds {
                what: "first food",
                ..
            })
        ));
    }
}
