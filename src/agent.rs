//! Player agents: the belief-driven search player and a random baseline.
//!
//! Agents never see the true board. They propose moves, and the referee
//! answers through [`PlayerAgent::observe`] with exactly the information the
//! rules allow: full detail for their own attempts, and only pass/capture
//! announcements (with the move location masked) for the opponent's turns.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::belief::{BeliefState, MemoryPointState};
use crate::board::{PlayError, PlayResult, Player};
use crate::constants::{OPENING_BOOK, OPENING_MOVES};
use crate::oracle::PolicyValueOracle;
use crate::point::Point;
use crate::search::{Search, SearchConfig};

/// One side of a phantom game, driven by the referee.
pub trait PlayerAgent {
    fn color(&self) -> Player;

    /// Propose the next action (a point or [`Point::PASS`]) and report how
    /// long the decision took.
    fn generate_move(&mut self) -> (Point, Duration);

    /// Digest a referee announcement about `mover`'s attempted action.
    ///
    /// For the agent's own attempts `pt` is the real point. For opponent
    /// placements the referee masks the location with [`Point::UNLEGAL`];
    /// opponent passes arrive unmasked since passes are public.
    fn observe(&mut self, mover: Player, pt: Point, result: &PlayResult);

    /// Forget everything, for a fresh game.
    fn reset(&mut self);
}

/// The search player: belief tracking plus information-set MCTS.
pub struct SearchAgent {
    belief: BeliefState,
    config: SearchConfig,
    oracle: Option<Arc<dyn PolicyValueOracle + Send + Sync>>,
    rng: fastrand::Rng,
    /// Successful own placements, drives the opening book window.
    own_moves: usize,
    /// Successful opponent placements, bounds the determinizer budget.
    opponent_moves: usize,
}

impl SearchAgent {
    pub fn new(color: Player, config: SearchConfig, seed: u64) -> Self {
        SearchAgent {
            belief: BeliefState::new(color),
            config,
            oracle: None,
            rng: fastrand::Rng::with_seed(seed),
            own_moves: 0,
            opponent_moves: 0,
        }
    }

    /// Install a policy/value oracle; search switches from UCT to PUCT.
    pub fn with_oracle(mut self, oracle: Arc<dyn PolicyValueOracle + Send + Sync>) -> Self {
        self.oracle = Some(oracle);
        self
    }

    pub fn belief(&self) -> &BeliefState {
        &self.belief
    }

    /// First free opening-book point, while the book still applies.
    fn book_move(&self) -> Option<Point> {
        if self.own_moves >= OPENING_MOVES {
            return None;
        }
        let board = self.belief.best_guess_board();
        OPENING_BOOK
            .iter()
            .map(|&(row, col)| Point::new(row, col))
            .find(|&pt| {
                self.belief.state(pt) == MemoryPointState::Unknown
                    && board.is_legal(pt, self.belief.color())
            })
    }

    /// A ko ban lasts until the next successful placement; turn marks back
    /// into unknowns rather than keeping a stale ban.
    fn lift_ko_bans(&mut self) {
        for pt in Point::all() {
            if self.belief.state(pt) == MemoryPointState::KoBlocked {
                self.belief.clear(pt);
            }
        }
    }
}

impl PlayerAgent for SearchAgent {
    fn color(&self) -> Player {
        self.belief.color()
    }

    fn generate_move(&mut self) -> (Point, Duration) {
        let start = Instant::now();
        if let Some(book) = self.book_move() {
            return (book, start.elapsed());
        }
        let oracle = self.oracle.as_ref().map(|o| o.as_ref() as &dyn PolicyValueOracle);
        let search = Search::new(self.config, oracle);
        let mv = search.best_move(&self.belief, self.opponent_moves, &mut self.rng);
        (mv, start.elapsed())
    }

    fn observe(&mut self, mover: Player, pt: Point, result: &PlayResult) {
        if mover == self.color() {
            match result.error {
                None => {
                    if pt.is_pass() {
                        // Our own pass clears the true board's ko.
                        self.lift_ko_bans();
                    } else if pt.is_move() {
                        self.lift_ko_bans();
                        self.belief.mark_own(pt);
                        self.own_moves += 1;
                        if !result.captured.is_empty() {
                            // Stones we captured no longer bound the
                            // determinizer's opponent budget.
                            self.opponent_moves =
                                self.opponent_moves.saturating_sub(result.captured.len());
                            self.belief.on_points_captured(&result.captured);
                        }
                        self.belief.record_snapshot();
                    }
                }
                // A failed attempt is information, not a turn.
                Some(PlayError::KoViolation) => self.belief.mark_ko_blocked(pt),
                Some(PlayError::OffBoard) | Some(PlayError::GameOver) => {}
                // Occupied, suicide, superko: opponent stones sit on or
                // around the point. Stop proposing it.
                Some(_) => self.belief.mark_inferred(pt),
            }
        } else if result.is_success() {
            if pt.is_pass() {
                // An opponent pass also clears the true board's ko.
                self.lift_ko_bans();
                return;
            }
            self.lift_ko_bans();
            self.opponent_moves += 1;
            if !result.captured.is_empty() {
                let ko_retaken = result.captured.len() == 1
                    && self.belief.state(result.captured[0]) == MemoryPointState::Own;
                self.belief.on_points_captured(&result.captured);
                // A lone own stone swallowed inside opponent shape is a ko
                // we cannot retake this turn; spare the wasted attempt.
                if ko_retaken {
                    let pt = result.captured[0];
                    let guess = self.belief.best_guess_board();
                    if guess.is_koish(pt) == Some(self.color().opponent()) {
                        self.belief.mark_ko_blocked(pt);
                    }
                }
            }
            self.belief.record_snapshot();
        }
    }

    fn reset(&mut self) {
        self.belief.clear_all();
        self.own_moves = 0;
        self.opponent_moves = 0;
    }
}

/// Baseline opponent: uniformly random over points it has no reason to avoid.
pub struct RandomAgent {
    belief: BeliefState,
    rng: fastrand::Rng,
}

impl RandomAgent {
    pub fn new(color: Player, seed: u64) -> Self {
        RandomAgent { belief: BeliefState::new(color), rng: fastrand::Rng::with_seed(seed) }
    }
}

impl PlayerAgent for RandomAgent {
    fn color(&self) -> Player {
        self.belief.color()
    }

    fn generate_move(&mut self) -> (Point, Duration) {
        let start = Instant::now();
        let board = self.belief.best_guess_board();
        let color = self.belief.color();
        let candidates: Vec<Point> = self
            .belief
            .unknown_points()
            .into_iter()
            .filter(|&pt| board.is_legal(pt, color))
            .collect();
        let mv = if candidates.is_empty() {
            Point::PASS
        } else {
            candidates[self.rng.usize(..candidates.len())]
        };
        (mv, start.elapsed())
    }

    fn observe(&mut self, mover: Player, pt: Point, result: &PlayResult) {
        if mover == self.color() {
            match result.error {
                None if pt.is_move() => {
                    self.belief.mark_own(pt);
                    self.belief.on_points_captured(&result.captured);
                }
                None => {}
                Some(PlayError::KoViolation) => self.belief.mark_ko_blocked(pt),
                Some(PlayError::OffBoard) | Some(PlayError::GameOver) => {}
                Some(_) => self.belief.mark_inferred(pt),
            }
        } else if result.is_success() && !result.captured.is_empty() {
            self.belief.on_points_captured(&result.captured);
        }
    }

    fn reset(&mut self) {
        self.belief.clear_all();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quick_config() -> SearchConfig {
        SearchConfig { simulations: 20, determinizations: 1, ..Default::default() }
    }

    #[test]
    fn test_opening_book_first_move() {
        let mut agent = SearchAgent::new(Player::Black, quick_config(), 1);
        let (mv, _) = agent.generate_move();
        assert_eq!(mv, Point::new(5, 5));
    }

    #[test]
    fn test_opening_book_skips_known_points() {
        let mut agent = SearchAgent::new(Player::Black, quick_config(), 1);
        agent.observe(
            Player::Black,
            Point::new(5, 5),
            &PlayResult::success(Vec::new()),
        );
        // Tengen failed for the opponent's stone: next book point instead.
        agent.observe(
            Player::Black,
            Point::new(3, 3),
            &PlayResult::failure(PlayError::Occupied),
        );
        let (mv, _) = agent.generate_move();
        assert_eq!(mv, Point::new(7, 7));
    }

    #[test]
    fn test_failed_move_marks_inferred_opponent() {
        let mut agent = SearchAgent::new(Player::White, quick_config(), 2);
        let pt = Point::new(4, 4);
        agent.observe(Player::White, pt, &PlayResult::failure(PlayError::Occupied));
        assert_eq!(agent.belief().state(pt), MemoryPointState::InferredOpponent);
    }

    #[test]
    fn test_ko_ban_lifts_after_next_placement() {
        let mut agent = SearchAgent::new(Player::Black, quick_config(), 3);
        let ko = Point::new(2, 2);
        agent.observe(Player::Black, ko, &PlayResult::failure(PlayError::KoViolation));
        assert_eq!(agent.belief().state(ko), MemoryPointState::KoBlocked);
        agent.observe(
            Player::Black,
            Point::new(6, 6),
            &PlayResult::success(Vec::new()),
        );
        assert_eq!(agent.belief().state(ko), MemoryPointState::Unknown);
    }

    #[test]
    fn test_opponent_capture_updates_belief() {
        let mut agent = SearchAgent::new(Player::Black, quick_config(), 4);
        let stone = Point::new(5, 5);
        agent.observe(Player::Black, stone, &PlayResult::success(Vec::new()));
        agent.observe(
            Player::White,
            Point::UNLEGAL,
            &PlayResult::success(vec![stone]),
        );
        // Neighbors of the lost stone are inferred opponents, and the point
        // itself looks like a ko mouth, so it is marked unplayable for now.
        assert_eq!(agent.belief().state(stone), MemoryPointState::KoBlocked);
        for n in stone.neighbors() {
            assert_eq!(agent.belief().state(n), MemoryPointState::InferredOpponent);
        }
    }

    #[test]
    fn test_group_capture_not_ko_blocked() {
        let mut agent = SearchAgent::new(Player::Black, quick_config(), 7);
        let group = [Point::new(5, 5), Point::new(5, 6)];
        for &pt in &group {
            agent.observe(Player::Black, pt, &PlayResult::success(Vec::new()));
        }
        agent.observe(
            Player::White,
            Point::UNLEGAL,
            &PlayResult::success(group.to_vec()),
        );
        // Losing two stones is never a simple ko.
        for &pt in &group {
            assert_eq!(agent.belief().state(pt), MemoryPointState::Unknown);
        }
    }

    #[test]
    fn test_reset_clears_memory() {
        let mut agent = SearchAgent::new(Player::Black, quick_config(), 5);
        agent.observe(
            Player::Black,
            Point::new(5, 5),
            &PlayResult::success(Vec::new()),
        );
        agent.reset();
        assert_eq!(agent.belief().state(Point::new(5, 5)), MemoryPointState::Unknown);
        let (mv, _) = agent.generate_move();
        assert_eq!(mv, Point::new(5, 5));
    }

    #[test]
    fn test_rejected_move_marks_inferred_opponent() {
        let mut agent = SearchAgent::new(Player::Black, quick_config(), 8);
        let suicide = Point::new(1, 1);
        let superko = Point::new(9, 9);
        agent.observe(Player::Black, suicide, &PlayResult::failure(PlayError::Suicide));
        agent.observe(Player::Black, superko, &PlayResult::failure(PlayError::SuperKo));
        // Both rejections imply opponent stones at or around the point; the
        // point must leave the candidate pool instead of being retried.
        assert_eq!(agent.belief().state(suicide), MemoryPointState::InferredOpponent);
        assert_eq!(agent.belief().state(superko), MemoryPointState::InferredOpponent);
    }

    #[test]
    fn test_ko_ban_lifts_after_opponent_pass() {
        let mut agent = SearchAgent::new(Player::Black, quick_config(), 9);
        let ko = Point::new(3, 3);
        agent.observe(Player::Black, ko, &PlayResult::failure(PlayError::KoViolation));
        assert_eq!(agent.belief().state(ko), MemoryPointState::KoBlocked);
        // The opponent passing clears the true board's ko, so the retake is
        // open again next turn.
        agent.observe(Player::White, Point::PASS, &PlayResult::success(Vec::new()));
        assert_eq!(agent.belief().state(ko), MemoryPointState::Unknown);
    }

    #[test]
    fn test_random_agent_avoids_known_points() {
        let mut agent = RandomAgent::new(Player::White, 6);
        let open = [Point::new(1, 1), Point::new(2, 2)];
        for pt in Point::all().filter(|p| !open.contains(p)) {
            agent.observe(Player::White, pt, &PlayResult::success(Vec::new()));
        }
        for _ in 0..20 {
            let (mv, _) = agent.generate_move();
            assert!(open.contains(&mv));
        }
    }

    #[test]
    fn test_random_agent_passes_when_only_illegal_point_left() {
        let mut agent = RandomAgent::new(Player::White, 10);
        // Every point but the corner is own: filling it would be suicide on
        // the best-guess board, so the agent must pass instead.
        for pt in Point::all().skip(1) {
            agent.observe(Player::White, pt, &PlayResult::success(Vec::new()));
        }
        let (mv, _) = agent.generate_move();
        assert_eq!(mv, Point::PASS);
    }
}
