//! Board coordinates and the non-spatial action sentinels.
//!
//! A [`Point`] is a 1-based `(row, col)` pair on the 9x9 grid. A small set of
//! sentinel values encode Pass / Undo / Quit / Unlegal; they live outside the
//! playable coordinate range and are skipped by [`Point::all`].
//!
//! The text form follows the usual board labelling: columns `A`-`I` left to
//! right, rows numbered `9`-`1` top to bottom, so `"A9"` is `(1, 1)` and
//! `"I1"` is `(9, 9)`.

use crate::constants::N;

/// A 1-based coordinate on the board, or one of the action sentinels.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub row: usize,
    pub col: usize,
}

/// Error for coordinate text that cannot be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError(pub String);

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid coordinate: {}", self.0)
    }
}

impl std::error::Error for ParseError {}

impl Point {
    /// Pass action.
    pub const PASS: Point = Point { row: 0, col: 0 };
    /// Undo request.
    pub const UNDO: Point = Point { row: 0, col: 1 };
    /// Quit request.
    pub const QUIT: Point = Point { row: 0, col: 2 };
    /// Placeholder for "no point" (e.g. a cleared last-attempt slot).
    pub const UNLEGAL: Point = Point { row: N + 1, col: N + 1 };

    pub const fn new(row: usize, col: usize) -> Self {
        Point { row, col }
    }

    /// True for actual board coordinates (not Pass/Undo/Quit).
    pub fn is_move(&self) -> bool {
        *self != Self::PASS && *self != Self::UNDO && *self != Self::QUIT
    }

    pub fn is_pass(&self) -> bool {
        *self == Self::PASS
    }

    /// Whether this point lies on the playable grid.
    pub fn on_board(&self) -> bool {
        (1..=N).contains(&self.row) && (1..=N).contains(&self.col)
    }

    /// Iterate over all playable points in row-major order.
    pub fn all() -> impl Iterator<Item = Point> {
        (1..=N).flat_map(|row| (1..=N).map(move |col| Point::new(row, col)))
    }

    /// The orthogonal neighbors that lie on the board.
    pub fn neighbors(&self) -> impl Iterator<Item = Point> {
        let (row, col) = (self.row as isize, self.col as isize);
        [(row - 1, col), (row + 1, col), (row, col - 1), (row, col + 1)]
            .into_iter()
            .filter(|&(r, c)| r >= 1 && r <= N as isize && c >= 1 && c <= N as isize)
            .map(|(r, c)| Point::new(r as usize, c as usize))
    }

    /// The diagonal neighbors that lie on the board.
    pub fn diagonals(&self) -> impl Iterator<Item = Point> {
        let (row, col) = (self.row as isize, self.col as isize);
        [
            (row - 1, col - 1),
            (row - 1, col + 1),
            (row + 1, col - 1),
            (row + 1, col + 1),
        ]
        .into_iter()
        .filter(|&(r, c)| r >= 1 && r <= N as isize && c >= 1 && c <= N as isize)
        .map(|(r, c)| Point::new(r as usize, c as usize))
    }

    /// Flat 0-based index in row-major order.
    pub fn index(&self) -> usize {
        (self.row - 1) * N + (self.col - 1)
    }

    /// Inverse of [`Point::index`].
    pub fn from_index(index: usize) -> Point {
        Point::new(index / N + 1, index % N + 1)
    }

    /// Manhattan distance to another point.
    pub fn distance(&self, other: &Point) -> usize {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_pass() {
            return write!(f, "pass");
        }
        if !self.on_board() {
            return write!(f, "({},{})", self.row, self.col);
        }
        let col = (b'A' + self.col as u8 - 1) as char;
        write!(f, "{col}{}", N + 1 - self.row)
    }
}

/// Parse a coordinate string such as `"D4"` or `"pass"`.
pub fn parse_point(s: &str) -> Result<Point, ParseError> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("pass") {
        return Ok(Point::PASS);
    }
    let bytes = s.as_bytes();
    if bytes.len() < 2 || !bytes[0].is_ascii_alphabetic() {
        return Err(ParseError(s.to_string()));
    }
    let col = (bytes[0].to_ascii_uppercase() - b'A' + 1) as usize;
    let row_label: usize = s[1..].parse().map_err(|_| ParseError(s.to_string()))?;
    if col > N || row_label == 0 || row_label > N {
        return Err(ParseError(s.to_string()));
    }
    Ok(Point::new(N + 1 - row_label, col))
}
