//! Grid geometry: cell positions, the eight step directions, and tiles.
//!
//! Positions are zone-local cell coordinates with `y` growing downward.
//! Distances use the Chebyshev metric because a diagonal step costs the same
//! as an orthogonal one.

use std::fmt;

use serde::{Deserialize, Serialize};

// ── Position ──────────────────────────────────────────────────────────────────

/// A cell inside a zone.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev distance in steps.
    #[inline]
    pub fn range_to(self, other: Position) -> u32 {
        (self.x - other.x).unsigned_abs().max((self.y - other.y).unsigned_abs())
    }

    #[inline]
    pub fn in_range_to(self, other: Position, range: u32) -> bool {
        self.range_to(other) <= range
    }

    /// `true` when `other` is this cell or one of its eight neighbours.
    #[inline]
    pub fn is_near_to(self, other: Position) -> bool {
        self.range_to(other) <= 1
    }

    /// The neighbouring cell in direction `dir`.
    #[inline]
    pub fn step(self, dir: Direction) -> Position {
        let (dx, dy) = dir.delta();
        Position::new(self.x + dx, self.y + dy)
    }

    #[inline]
    pub fn offset(self, dx: i32, dy: i32) -> Position {
        Position::new(self.x + dx, self.y + dy)
    }

    /// Direction of the first step from `self` toward `other`.
    ///
    /// Returns `None` when both positions are equal.
    pub fn direction_to(self, other: Position) -> Option<Direction> {
        Direction::from_delta((other.x - self.x).signum(), (other.y - self.y).signum())
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

// ── Direction ─────────────────────────────────────────────────────────────────

/// One of the eight single-cell steps, numbered clockwise from `Top`.
///
/// The numbering doubles as the serialized path alphabet (`'1'..='8'`).
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize, Deserialize)]
#[repr(u8)]
pub enum Direction {
    Top = 1,
    TopRight = 2,
    Right = 3,
    BottomRight = 4,
    Bottom = 5,
    BottomLeft = 6,
    Left = 7,
    TopLeft = 8,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::Top,
        Direction::TopRight,
        Direction::Right,
        Direction::BottomRight,
        Direction::Bottom,
        Direction::BottomLeft,
        Direction::Left,
        Direction::TopLeft,
    ];

    /// `(dx, dy)` of one step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Top         => (0, -1),
            Direction::TopRight    => (1, -1),
            Direction::Right       => (1, 0),
            Direction::BottomRight => (1, 1),
            Direction::Bottom      => (0, 1),
            Direction::BottomLeft  => (-1, 1),
            Direction::Left        => (-1, 0),
            Direction::TopLeft     => (-1, -1),
        }
    }

    pub fn from_delta(dx: i32, dy: i32) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| d.delta() == (dx, dy))
    }

    pub fn opposite(self) -> Direction {
        let (dx, dy) = self.delta();
        // Every delta has an opposite in ALL.
        Direction::from_delta(-dx, -dy).unwrap_or(self)
    }

    /// Single-character encoding used in serialized paths.
    #[inline]
    pub fn as_digit(self) -> char {
        char::from(b'0' + self as u8)
    }

    pub fn from_digit(c: char) -> Option<Direction> {
        let n = c.to_digit(10)?;
        Direction::ALL.get((n as usize).checked_sub(1)?).copied()
    }
}

// ── Tile ──────────────────────────────────────────────────────────────────────

/// Static terrain of one cell.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    #[default]
    Plain,
    Swamp,
    Wall,
}

impl Tile {
    #[inline]
    pub fn is_walkable(self) -> bool {
        !matches!(self, Tile::Wall)
    }

    /// Parse the map-sketch alphabet: `.` plain, `~` swamp, `#` wall.
    pub fn from_char(c: char) -> Option<Tile> {
        match c {
            '.' => Some(Tile::Plain),
            '~' => Some(Tile::Swamp),
            '#' => Some(Tile::Wall),
            _ => None,
        }
    }
}
