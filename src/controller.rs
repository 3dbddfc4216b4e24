//! Referee: the authoritative game driver for one phantom match.
//!
//! The controller owns the true board and arbitrates every attempted action.
//! Failed placements do not consume the turn; the mover simply learns the
//! move was illegal and tries again. Two consecutive passes end the game.

use crate::board::{Board, PlayResult, Player};
use crate::constants::KOMI;
use crate::point::Point;
use crate::score::{ScoreResult, score};

/// Whether the match is still being played.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum GameState {
    Playing,
    Ended,
}

/// One successful action in the game record.
#[derive(Clone, Debug)]
pub struct MoveRecord {
    pub player: Player,
    /// The point played, or [`Point::PASS`].
    pub action: Point,
    pub captured: Vec<Point>,
}

struct Snapshot {
    board: Board,
    current: Player,
    captures: [usize; 2],
    consecutive_passes: usize,
    state: GameState,
}

/// The true game, visible only to the referee.
pub struct GameController {
    board: Board,
    current: Player,
    state: GameState,
    /// Stones captured by each player, indexed like [`Player::index`].
    captures: [usize; 2],
    consecutive_passes: usize,
    moves: Vec<MoveRecord>,
    snapshots: Vec<Snapshot>,
}

impl Default for GameController {
    fn default() -> Self {
        Self::new()
    }
}

impl GameController {
    pub fn new() -> Self {
        GameController {
            board: Board::new(),
            current: Player::Black,
            state: GameState::Playing,
            captures: [0, 0],
            consecutive_passes: 0,
            moves: Vec::new(),
            snapshots: Vec::new(),
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current
    }

    pub fn state(&self) -> GameState {
        self.state
    }

    pub fn is_over(&self) -> bool {
        self.state == GameState::Ended
    }

    /// Stones `player` has captured so far.
    pub fn captures(&self, player: Player) -> usize {
        self.captures[player.index()]
    }

    pub fn consecutive_passes(&self) -> usize {
        self.consecutive_passes
    }

    pub fn move_history(&self) -> &[MoveRecord] {
        &self.moves
    }

    /// Attempt a placement for the player to move.
    ///
    /// On success the turn passes to the opponent. On failure the board is
    /// untouched and the same player moves again.
    pub fn make_move(&mut self, pt: Point) -> PlayResult {
        if self.is_over() {
            return PlayResult::failure(crate::board::PlayError::GameOver);
        }
        let snapshot = self.snapshot();
        match self.board.place(pt, self.current) {
            Ok(captured) => {
                self.snapshots.push(snapshot);
                self.captures[self.current.index()] += captured.len();
                self.consecutive_passes = 0;
                self.moves.push(MoveRecord {
                    player: self.current,
                    action: pt,
                    captured: captured.clone(),
                });
                self.current = self.current.opponent();
                PlayResult::success(captured)
            }
            Err(err) => PlayResult::failure(err),
        }
    }

    /// Pass the turn. The second consecutive pass ends the game.
    pub fn pass(&mut self) -> PlayResult {
        if self.is_over() {
            return PlayResult::failure(crate::board::PlayError::GameOver);
        }
        self.snapshots.push(self.snapshot());
        self.board.pass_turn();
        self.consecutive_passes += 1;
        self.moves.push(MoveRecord {
            player: self.current,
            action: Point::PASS,
            captured: Vec::new(),
        });
        if self.consecutive_passes >= 2 {
            self.state = GameState::Ended;
            self.board.end_game();
        }
        self.current = self.current.opponent();
        PlayResult::success(Vec::new())
    }

    /// Roll back the last `steps` successful actions. Returns false when the
    /// record is too short, leaving the game unchanged.
    pub fn undo(&mut self, steps: usize) -> bool {
        if steps == 0 || steps > self.snapshots.len() {
            return false;
        }
        for _ in 0..steps - 1 {
            self.snapshots.pop();
            self.moves.pop();
        }
        self.moves.pop();
        // The snapshot taken just before the oldest undone action.
        if let Some(snapshot) = self.snapshots.pop() {
            self.board = snapshot.board;
            self.current = snapshot.current;
            self.captures = snapshot.captures;
            self.consecutive_passes = snapshot.consecutive_passes;
            self.state = snapshot.state;
        }
        true
    }

    /// Final area score with standard komi.
    pub fn score_result(&self) -> ScoreResult {
        score(&self.board, KOMI)
    }

    fn snapshot(&self) -> Snapshot {
        Snapshot {
            board: self.board.clone(),
            current: self.current,
            captures: self.captures,
            consecutive_passes: self.consecutive_passes,
            state: self.state,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PlayError, PointState};

    #[test]
    fn test_turn_alternates_on_success_only() {
        let mut game = GameController::new();
        assert_eq!(game.current_player(), Player::Black);
        assert!(game.make_move(Point::new(5, 5)).is_success());
        assert_eq!(game.current_player(), Player::White);

        // White hits Black's stone: still White's turn.
        let result = game.make_move(Point::new(5, 5));
        assert_eq!(result.error, Some(PlayError::Occupied));
        assert_eq!(game.current_player(), Player::White);
    }

    #[test]
    fn test_two_passes_end_game() {
        let mut game = GameController::new();
        assert!(game.make_move(Point::new(5, 5)).is_success());
        assert!(game.pass().is_success());
        assert_eq!(game.state(), GameState::Playing);
        assert!(game.pass().is_success());
        assert!(game.is_over());
        assert_eq!(game.make_move(Point::new(1, 1)).error, Some(PlayError::GameOver));
    }

    #[test]
    fn test_pass_interrupts_pass_count() {
        let mut game = GameController::new();
        assert!(game.pass().is_success());
        assert!(game.make_move(Point::new(3, 3)).is_success());
        assert!(game.pass().is_success());
        assert_eq!(game.consecutive_passes(), 1);
        assert!(!game.is_over());
    }

    #[test]
    fn test_capture_counting() {
        let mut game = GameController::new();
        // Black surrounds a White stone at (1,1).
        assert!(game.make_move(Point::new(2, 1)).is_success()); // B
        assert!(game.make_move(Point::new(1, 1)).is_success()); // W
        assert!(game.make_move(Point::new(1, 2)).is_success()); // B captures
        assert_eq!(game.captures(Player::Black), 1);
        assert_eq!(game.captures(Player::White), 0);
        assert_eq!(game.board().state(Point::new(1, 1)), PointState::Empty);
    }

    #[test]
    fn test_undo_restores_position() {
        let mut game = GameController::new();
        assert!(game.make_move(Point::new(5, 5)).is_success());
        assert!(game.make_move(Point::new(3, 3)).is_success());
        assert!(game.undo(1));
        assert_eq!(game.board().state(Point::new(3, 3)), PointState::Empty);
        assert_eq!(game.board().state(Point::new(5, 5)), PointState::Black);
        assert_eq!(game.current_player(), Player::White);
        assert_eq!(game.move_history().len(), 1);
    }

    #[test]
    fn test_undo_beyond_history_rejected() {
        let mut game = GameController::new();
        assert!(game.make_move(Point::new(5, 5)).is_success());
        assert!(!game.undo(2));
        assert_eq!(game.board().state(Point::new(5, 5)), PointState::Black);
    }

    #[test]
    fn test_score_after_game() {
        let mut game = GameController::new();
        assert!(game.make_move(Point::new(5, 5)).is_success());
        assert!(game.pass().is_success());
        assert!(game.pass().is_success());
        let result = game.score_result();
        assert_eq!(result.black, crate::constants::BOARD_AREA as f64);
        assert_eq!(result.winner, Player::Black);
    }
}
