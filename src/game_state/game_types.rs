//! Small value types shared by the rule engine and the decision core.

use std::fmt;

/// Side to move. Black places the first stone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Player::Black => 0,
            Player::White => 1,
        }
    }

    #[inline]
    pub const fn opposite(self) -> Self {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    #[inline]
    pub const fn symbol(self) -> char {
        match self {
            Player::Black => 'B',
            Player::White => 'W',
        }
    }

    pub fn from_symbol(ch: char) -> Option<Self> {
        match ch.to_ascii_uppercase() {
            'B' => Some(Player::Black),
            'W' => Some(Player::White),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Player::Black => write!(f, "Black"),
            Player::White => write!(f, "White"),
        }
    }
}

/// A single stone placement, addressed by grid row and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Placement {
    pub row: u8,
    pub col: u8,
}

impl Placement {
    #[inline]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Placement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// Adjacency model of the board.
///
/// `Square` is an N×N grid with orthogonal neighbours. `Hex` is a hexagon of
/// side N stored in a (2N-1)×(2N-1) grid with axial coordinates: a cell is on
/// the board iff `|row - col| <= N - 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Geometry {
    Square,
    Hex,
}

const SQUARE_DIRECTIONS: [(i8, i8); 4] = [(-1, 0), (1, 0), (0, -1), (0, 1)];
const HEX_DIRECTIONS: [(i8, i8); 6] = [(-1, 0), (1, 0), (0, -1), (0, 1), (1, 1), (-1, -1)];

impl Geometry {
    /// Width of the backing grid for a board of the given side. Saturates
    /// instead of overflowing for absurd sides.
    #[inline]
    pub const fn grid_width(self, side: usize) -> usize {
        match self {
            Geometry::Square => side,
            Geometry::Hex => side.saturating_mul(2).saturating_sub(1),
        }
    }

    #[inline]
    pub fn directions(self) -> &'static [(i8, i8)] {
        match self {
            Geometry::Square => &SQUARE_DIRECTIONS,
            Geometry::Hex => &HEX_DIRECTIONS,
        }
    }

    #[inline]
    pub fn contains(self, side: usize, row: isize, col: isize) -> bool {
        let width = self.grid_width(side) as isize;
        if row < 0 || col < 0 || row >= width || col >= width {
            return false;
        }
        match self {
            Geometry::Square => true,
            Geometry::Hex => (row - col).abs() < side as isize,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Geometry::Square => "square",
            Geometry::Hex => "hex",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        if name.eq_ignore_ascii_case("square") {
            Some(Geometry::Square)
        } else if name.eq_ignore_ascii_case("hex") {
            Some(Geometry::Hex)
        } else {
            None
        }
    }
}
