//! Grid snake simulation with a timed bonus food.
//!
//! [`game::GameSession`] owns the whole simulation: the snake, the food
//! spawner and a single timer queue that drives both the fixed tick and the
//! bonus appear/expire cycle. The remaining modules are thin terminal
//! adapters around it.

pub mod clock;
pub mod config;
pub mod food;
pub mod game;
pub mod grid;
pub mod input;
pub mod renderer;
pub mod score;
pub mod snake;
pub mod terminal_runtime;
pub mod ui;
