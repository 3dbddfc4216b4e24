//! Area scoring for terminal positions.
//!
//! Chinese-style counting: stones score for their own color, and a maximal
//! empty region scores for a color only when every stone bordering it is
//! that color. Komi is added to White; White wins ties.

use std::collections::VecDeque;

use crate::board::{Board, Player, PointState};
use crate::point::Point;

/// Final score of a terminal position. Derived, never stored.
#[derive(Clone, Debug, PartialEq)]
pub struct ScoreResult {
    pub black: f64,
    pub white: f64,
    pub winner: Player,
}

impl ScoreResult {
    pub fn margin(&self) -> f64 {
        (self.black - self.white).abs()
    }
}

impl std::fmt::Display for ScoreResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "B {} : W {} ({} wins by {})",
            self.black,
            self.white,
            self.winner,
            self.margin()
        )
    }
}

/// Score a board with the given komi.
pub fn score(board: &Board, komi: f64) -> ScoreResult {
    let mut black = 0.0;
    let mut white = 0.0;
    let mut visited = vec![false; crate::constants::BOARD_AREA];

    for pt in Point::all() {
        match board.state(pt) {
            PointState::Black => black += 1.0,
            PointState::White => white += 1.0,
            PointState::Empty => {
                if visited[pt.index()] {
                    continue;
                }
                let (region, borders) = empty_region(board, pt, &mut visited);
                match borders {
                    (true, false) => black += region as f64,
                    (false, true) => white += region as f64,
                    _ => {} // neutral or empty board
                }
            }
        }
    }

    white += komi;
    let winner = if black > white { Player::Black } else { Player::White };
    ScoreResult { black, white, winner }
}

/// Flood-fill the maximal empty region containing `start`, returning its
/// size and which colors border it (black, white).
fn empty_region(board: &Board, start: Point, visited: &mut [bool]) -> (usize, (bool, bool)) {
    let mut size = 0;
    let mut touches_black = false;
    let mut touches_white = false;
    let mut queue = VecDeque::new();
    queue.push_back(start);
    visited[start.index()] = true;
    while let Some(current) = queue.pop_front() {
        size += 1;
        for n in current.neighbors() {
            match board.state(n) {
                PointState::Empty => {
                    if !visited[n.index()] {
                        visited[n.index()] = true;
                        queue.push_back(n);
                    }
                }
                PointState::Black => touches_black = true,
                PointState::White => touches_white = true,
            }
        }
    }
    (size, (touches_black, touches_white))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{BOARD_AREA, KOMI};

    #[test]
    fn test_empty_board_white_takes_komi() {
        let board = Board::new();
        let result = score(&board, KOMI);
        assert_eq!(result.black, 0.0);
        assert_eq!(result.white, KOMI);
        assert_eq!(result.winner, Player::White);
    }

    #[test]
    fn test_lone_black_stone_owns_board() {
        let mut board = Board::new();
        board.place(Point::new(5, 5), Player::Black).unwrap();
        let result = score(&board, KOMI);
        assert_eq!(result.black, BOARD_AREA as f64);
        assert_eq!(result.white, KOMI);
        assert_eq!(result.winner, Player::Black);
    }

    #[test]
    fn test_contested_region_is_neutral() {
        let mut board = Board::new();
        board.place(Point::new(1, 1), Player::Black).unwrap();
        board.place(Point::new(9, 9), Player::White).unwrap();
        let result = score(&board, KOMI);
        // The single empty region touches both colors, only stones count.
        assert_eq!(result.black, 1.0);
        assert_eq!(result.white, 1.0 + KOMI);
        assert_eq!(result.winner, Player::White);
    }

    #[test]
    fn test_scoring_idempotent() {
        let mut board = Board::new();
        board.place(Point::new(3, 3), Player::Black).unwrap();
        board.place(Point::new(7, 7), Player::White).unwrap();
        board.place(Point::new(3, 7), Player::Black).unwrap();
        let first = score(&board, KOMI);
        let second = score(&board, KOMI);
        assert_eq!(first, second);
    }
}
