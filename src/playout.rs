//! Heuristic playout policy for leaf evaluation.
//!
//! Rollouts run on fully-determinized boards, so they are ordinary
//! full-information Go playouts. The move picker scores every legal point
//! with cheap tactical heuristics (captures, atari, escapes, connection,
//! eye-making) and usually takes one of the top few, with enough randomness
//! left in to keep repeated rollouts from collapsing onto one line.

use crate::board::{Board, Player, PointState};
use crate::constants::{
    KOMI, MAX_PLAYOUT_MOVES, PLAYOUT_GREEDY_PROB, PLAYOUT_GREEDY_TOP,
};
use crate::point::Point;
use crate::score::score;

const CAPTURE_BASE: f32 = 6.0;
const CAPTURE_PER_EXTRA_STONE: f32 = 2.0;
const ATARI_BONUS: f32 = 4.0;
const ESCAPE_BONUS: f32 = 3.0;
const CONNECT_NEIGHBOR_BONUS: f32 = 3.0;
const CONNECT_DIAGONAL_BONUS: f32 = 1.5;
const EYE_MAKING_BONUS: f32 = 4.5;
/// Jitter added to every candidate so equal scores do not always resolve in
/// scan order.
const SCORE_JITTER: f32 = 0.5;

/// Play a position out to the move cap or two consecutive passes and return
/// the area-scoring winner.
pub fn rollout(board: &Board, to_move: Player, rng: &mut fastrand::Rng) -> Player {
    let mut board = board.clone();
    let mut current = to_move;
    let mut consecutive_passes = 0;

    for _ in 0..MAX_PLAYOUT_MOVES {
        if consecutive_passes >= 2 {
            break;
        }
        match select_move(&board, current, rng) {
            Some(pt) => {
                if board.place(pt, current).is_ok() {
                    consecutive_passes = 0;
                } else {
                    // Candidate scoring probed legality; only a race with ko
                    // bookkeeping can land here, treat it as a pass.
                    consecutive_passes += 1;
                    board.pass_turn();
                }
            }
            None => {
                consecutive_passes += 1;
                board.pass_turn();
            }
        }
        current = current.opponent();
    }

    score(&board, KOMI).winner
}

/// Pick a rollout move for `player`, or `None` to pass.
///
/// Most of the time one of the top-scored candidates is chosen; otherwise a
/// uniformly random candidate keeps the policy exploratory.
pub fn select_move(board: &Board, player: Player, rng: &mut fastrand::Rng) -> Option<Point> {
    let mut candidates: Vec<(Point, f32)> = board
        .empty_points()
        .into_iter()
        .filter(|&pt| board.is_eye(pt) != Some(player))
        .filter_map(|pt| score_move(board, pt, player).map(|s| (pt, s + rng.f32() * SCORE_JITTER)))
        .collect();
    if candidates.is_empty() {
        return None;
    }

    if rng.f64() < PLAYOUT_GREEDY_PROB {
        candidates.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        let top = candidates.len().min(PLAYOUT_GREEDY_TOP);
        Some(candidates[rng.usize(..top)].0)
    } else {
        Some(candidates[rng.usize(..candidates.len())].0)
    }
}

/// Tactical score of one candidate move, `None` when the move is illegal.
pub fn score_move(board: &Board, pt: Point, player: Player) -> Option<f32> {
    let mut trial = board.clone();
    let captured = trial.place(pt, player).ok()?;

    let mut value = 0.0;
    if !captured.is_empty() {
        value += CAPTURE_BASE + (captured.len() as f32 - 1.0) * CAPTURE_PER_EXTRA_STONE;
    }

    let own = PointState::from(player);
    let enemy = PointState::from(player.opponent());
    for n in pt.neighbors() {
        if board.state(n) == own {
            value += CONNECT_NEIGHBOR_BONUS;
            // Escape: a neighboring group that was in trouble breathes again.
            if board.liberties(n) <= 2 && trial.liberties(n) > board.liberties(n) {
                value += ESCAPE_BONUS;
            }
        }
        if trial.state(n) == enemy && trial.liberties(n) == 1 {
            value += ATARI_BONUS;
        }
    }
    for d in pt.diagonals() {
        if board.state(d) == own {
            value += CONNECT_DIAGONAL_BONUS;
        }
    }

    // Eye-making: an adjacent empty point became a true eye.
    for n in pt.neighbors() {
        if trial.state(n) == PointState::Empty
            && trial.is_eye(n) == Some(player)
            && board.is_eye(n) != Some(player)
        {
            value += EYE_MAKING_BONUS;
        }
    }

    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rollout_returns_a_winner() {
        let board = Board::new();
        let mut rng = fastrand::Rng::with_seed(11);
        let winner = rollout(&board, Player::Black, &mut rng);
        assert!(winner == Player::Black || winner == Player::White);
    }

    #[test]
    fn test_capture_outranks_quiet_move() {
        let mut board = Board::new();
        let target = Point::new(5, 5);
        board.place(target, Player::White).unwrap();
        board.place(Point::new(4, 5), Player::Black).unwrap();
        board.place(Point::new(6, 5), Player::Black).unwrap();
        board.place(Point::new(5, 4), Player::Black).unwrap();
        let capture = score_move(&board, Point::new(5, 6), Player::Black).unwrap();
        let quiet = score_move(&board, Point::new(1, 1), Player::Black).unwrap();
        assert!(capture > quiet);
    }

    #[test]
    fn test_illegal_move_not_scored() {
        let mut board = Board::new();
        board.place(Point::new(5, 5), Player::Black).unwrap();
        assert!(score_move(&board, Point::new(5, 5), Player::White).is_none());
    }

    #[test]
    fn test_select_skips_own_eye() {
        let mut board = Board::new();
        let eye = Point::new(1, 1);
        for pt in [Point::new(1, 2), Point::new(2, 1), Point::new(2, 2)] {
            board.set_stone(pt, Player::Black);
        }
        assert_eq!(board.is_eye(eye), Some(Player::Black));
        let mut rng = fastrand::Rng::with_seed(5);
        for _ in 0..50 {
            if let Some(pt) = select_move(&board, Player::Black, &mut rng) {
                assert_ne!(pt, eye);
            }
        }
    }

    #[test]
    fn test_rollout_on_nearly_full_board_passes_out() {
        let mut board = Board::new();
        // Black owns everything except one eye, playouts must terminate.
        for pt in Point::all() {
            if pt != Point::new(1, 1) {
                board.set_stone(pt, Player::Black);
            }
        }
        let mut rng = fastrand::Rng::with_seed(2);
        let winner = rollout(&board, Player::White, &mut rng);
        assert_eq!(winner, Player::Black);
    }
}
