use std::collections::VecDeque;

use crate::grid::Cell;
use crate::input::Direction;

/// Ordered cells occupied by the snake, head first.
///
/// Growth has no state of its own: a tick that eats simply skips
/// [`Snake::shrink`] after [`Snake::advance`].
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Snake {
    body: VecDeque<Cell>,
}

impl Snake {
    /// Creates a one-cell snake at `start`.
    #[must_use]
    pub fn new(start: Cell) -> Self {
        let mut body = VecDeque::new();
        body.push_front(start);

        Self { body }
    }

    /// Creates a snake from explicit body segments (front is head).
    ///
    /// An empty list yields a snake at the origin so the non-empty invariant
    /// holds for every constructed value.
    #[must_use]
    pub fn from_segments(segments: Vec<Cell>) -> Self {
        if segments.is_empty() {
            return Self::new(Cell::new(0, 0));
        }

        Self {
            body: VecDeque::from(segments),
        }
    }

    /// Prepends the cell one step from the head and returns it.
    pub fn advance(&mut self, direction: Direction) -> Cell {
        let next_head = self.head().step(direction);
        self.body.push_front(next_head);
        next_head
    }

    /// Drops the tail segment. A one-cell snake is left untouched.
    pub fn shrink(&mut self) {
        if self.body.len() > 1 {
            let _ = self.body.pop_back();
        }
    }

    /// Returns true if `cell` equals any segment behind the head.
    #[must_use]
    pub fn collides_with_self(&self, cell: Cell) -> bool {
        self.body.iter().skip(1).any(|segment| *segment == cell)
    }

    /// Returns the current head position.
    #[must_use]
    pub fn head(&self) -> Cell {
        *self
            .body
            .front()
            .expect("snake body must always contain at least one segment")
    }

    /// Segment directly behind the head, if any.
    #[must_use]
    pub fn neck(&self) -> Option<Cell> {
        self.body.get(1).copied()
    }

    /// Returns current segment count.
    #[must_use]
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Always false; kept for the `len`/`is_empty` pair.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    /// Iterates over body segments from head to tail.
    pub fn segments(&self) -> impl Iterator<Item = &Cell> {
        self.body.iter()
    }

    /// Returns true when every consecutive pair of segments is one step apart.
    #[must_use]
    pub fn is_contiguous(&self) -> bool {
        self.body
            .iter()
            .zip(self.body.iter().skip(1))
            .all(|(a, b)| (a.row - b.row).abs() + (a.col - b.col).abs() == 1)
    }
}
