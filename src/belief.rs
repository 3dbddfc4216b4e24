//! Per-agent memory of the hidden board.
//!
//! In Phantom Go an agent only ever sees its own stones. Everything it knows
//! about the opponent is negative inference: a move of its own that failed,
//! or the neighborhood of an announced capture. The belief state records
//! those inferences and can materialize them into a concrete best-guess
//! [`Board`] for search and determinization.

use std::collections::{HashSet, VecDeque};

use crate::board::{Board, Player};
use crate::constants::{HISTORY_LEN, N};
use crate::point::Point;

/// What an agent believes about one point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum MemoryPointState {
    /// Nothing known.
    #[default]
    Unknown,
    /// A stone this agent placed successfully and has not seen captured.
    Own,
    /// Negative inference: an own move failed there, or it neighbors a
    /// capture. May later be falsified.
    InferredOpponent,
    /// The point is a ko the agent is currently forbidden to retake.
    KoBlocked,
}

/// Memory grid snapshot used for oracle feature encoding.
pub type MemoryGrid = [[MemoryPointState; N + 1]; N + 1];

/// One agent's knowledge of the hidden game.
#[derive(Clone)]
pub struct BeliefState {
    color: Player,
    grid: MemoryGrid,
    history: VecDeque<MemoryGrid>,
}

impl BeliefState {
    pub fn new(color: Player) -> Self {
        let grid = [[MemoryPointState::Unknown; N + 1]; N + 1];
        let mut history = VecDeque::new();
        history.push_back(grid);
        BeliefState { color, grid, history }
    }

    pub fn color(&self) -> Player {
        self.color
    }

    #[inline]
    pub fn state(&self, pt: Point) -> MemoryPointState {
        self.grid[pt.row][pt.col]
    }

    pub fn mark_own(&mut self, pt: Point) {
        self.grid[pt.row][pt.col] = MemoryPointState::Own;
    }

    pub fn mark_inferred(&mut self, pt: Point) {
        self.grid[pt.row][pt.col] = MemoryPointState::InferredOpponent;
    }

    pub fn mark_ko_blocked(&mut self, pt: Point) {
        self.grid[pt.row][pt.col] = MemoryPointState::KoBlocked;
    }

    /// Forget everything about a point.
    pub fn clear(&mut self, pt: Point) {
        self.grid[pt.row][pt.col] = MemoryPointState::Unknown;
    }

    /// Reset all memory, for a new game.
    pub fn clear_all(&mut self) {
        self.grid = [[MemoryPointState::Unknown; N + 1]; N + 1];
        self.history.clear();
        self.history.push_back(self.grid);
    }

    /// Digest a referee capture announcement.
    ///
    /// Each captured point is forgotten. A capture can only happen because
    /// the opponent had surrounding stones, so every still-unknown,
    /// non-captured orthogonal neighbor is marked as an inferred opponent
    /// stone. This propagation is the only way opponent shape is learned
    /// beyond direct move failures.
    pub fn on_points_captured(&mut self, captured: &[Point]) {
        let captured_set: HashSet<Point> = captured.iter().copied().collect();
        for &pt in captured {
            self.clear(pt);
            for n in pt.neighbors() {
                if self.state(n) == MemoryPointState::Unknown && !captured_set.contains(&n) {
                    self.mark_inferred(n);
                }
            }
        }
    }

    /// Build a concrete board from this memory: own marks become stones of
    /// the agent's color, inferred marks become opponent stones.
    ///
    /// Replayed through [`Board::place`] so any capture interaction between
    /// marks resolves exactly as live placement would; individual failures
    /// are ignored because the marks are only a guess.
    pub fn best_guess_board(&self) -> Board {
        let mut board = Board::new();
        for pt in Point::all() {
            match self.state(pt) {
                MemoryPointState::Own => {
                    let _ = board.place(pt, self.color);
                }
                MemoryPointState::InferredOpponent => {
                    let _ = board.place(pt, self.color.opponent());
                }
                _ => {}
            }
        }
        board
    }

    /// Points believed to hold own stones.
    pub fn own_points(&self) -> Vec<Point> {
        Point::all().filter(|&p| self.state(p) == MemoryPointState::Own).collect()
    }

    /// Points inferred to hold opponent stones.
    pub fn inferred_points(&self) -> Vec<Point> {
        Point::all()
            .filter(|&p| self.state(p) == MemoryPointState::InferredOpponent)
            .collect()
    }

    /// Points the agent knows nothing about.
    pub fn unknown_points(&self) -> Vec<Point> {
        Point::all()
            .filter(|&p| self.state(p) == MemoryPointState::Unknown)
            .collect()
    }

    /// Append the current memory grid to the bounded history ring.
    pub fn record_snapshot(&mut self) {
        self.history.push_back(self.grid);
        if self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
    }

    /// The most recent `steps` snapshots, newest first, padded with blank
    /// grids when history is shorter.
    pub fn history(&self, steps: usize) -> Vec<MemoryGrid> {
        let mut out: Vec<MemoryGrid> =
            self.history.iter().rev().take(steps).copied().collect();
        while out.len() < steps {
            out.push([[MemoryPointState::Unknown; N + 1]; N + 1]);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::PointState;

    #[test]
    fn test_capture_propagation() {
        let mut belief = BeliefState::new(Player::Black);
        let captured = Point::new(5, 5);
        belief.mark_own(captured);
        belief.mark_own(Point::new(4, 5)); // known, must stay Own

        belief.on_points_captured(&[captured]);

        assert_eq!(belief.state(captured), MemoryPointState::Unknown);
        assert_eq!(belief.state(Point::new(4, 5)), MemoryPointState::Own);
        for n in [Point::new(6, 5), Point::new(5, 4), Point::new(5, 6)] {
            assert_eq!(belief.state(n), MemoryPointState::InferredOpponent);
        }
    }

    #[test]
    fn test_capture_group_not_self_inferred() {
        let mut belief = BeliefState::new(Player::White);
        let group = [Point::new(3, 3), Point::new(3, 4)];
        for &pt in &group {
            belief.mark_own(pt);
        }
        belief.on_points_captured(&group);
        // Captured points never become inferred opponents of each other.
        for &pt in &group {
            assert_eq!(belief.state(pt), MemoryPointState::Unknown);
        }
        assert_eq!(belief.state(Point::new(2, 3)), MemoryPointState::InferredOpponent);
    }

    #[test]
    fn test_best_guess_board() {
        let mut belief = BeliefState::new(Player::Black);
        belief.mark_own(Point::new(5, 5));
        belief.mark_inferred(Point::new(3, 3));
        let board = belief.best_guess_board();
        assert_eq!(board.state(Point::new(5, 5)), PointState::Black);
        assert_eq!(board.state(Point::new(3, 3)), PointState::White);
        assert_eq!(board.state(Point::new(4, 4)), PointState::Empty);
    }

    #[test]
    fn test_clone_is_independent() {
        let mut belief = BeliefState::new(Player::Black);
        belief.mark_own(Point::new(1, 1));
        let mut copy = belief.clone();
        copy.clear(Point::new(1, 1));
        assert_eq!(belief.state(Point::new(1, 1)), MemoryPointState::Own);
        assert_eq!(copy.state(Point::new(1, 1)), MemoryPointState::Unknown);
    }

    #[test]
    fn test_history_padding() {
        let mut belief = BeliefState::new(Player::Black);
        belief.mark_own(Point::new(2, 2));
        belief.record_snapshot();
        let history = belief.history(HISTORY_LEN);
        assert_eq!(history.len(), HISTORY_LEN);
        assert_eq!(history[0][2][2], MemoryPointState::Own);
        assert_eq!(history[HISTORY_LEN - 1][2][2], MemoryPointState::Unknown);
    }
}
