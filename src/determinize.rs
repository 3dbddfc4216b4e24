//! Determinization: sampling complete boards consistent with a belief state.
//!
//! Search over belief states needs concrete boards to evaluate. The
//! determinizer keeps everything the agent knows fixed (own stones and
//! inferred opponent stones) and fills in the opponent's remaining stones by
//! weighted sampling without replacement. Weights combine a center-heavy
//! spatial prior, pressure around inferred stones ("the opponent plays near
//! their own shape"), and optionally the oracle's policy for the opponent's
//! view of the game.
//!
//! Draws that would capture anything are rejected: the agent would have been
//! told about such captures, so worlds containing them are inconsistent with
//! its observations.

use crate::belief::{BeliefState, MemoryPointState};
use crate::board::{Board, Player};
use crate::constants::{
    BOARD_AREA, DEFAULT_VISIBILITY, INFERRED_DIAGONAL_WEIGHT, INFERRED_NEIGHBOR_WEIGHT,
    INFERRED_PRESSURE_MIN, LAST_PLACE_RETRIES, ORACLE_POLICY_WEIGHT, PLACE_RETRIES,
    SPATIAL_PRIOR, VISIBILITY_BY_DISTANCE,
};
use crate::oracle::{PolicyValueOracle, encode_belief};
use crate::point::Point;

/// Scale factor applied to each draw probability when accumulating a
/// sample's likelihood weight, keeping products away from underflow.
const DRAW_PROB_SCALE: f32 = 10.0;

/// Samples hidden-board completions for one belief state.
pub struct Determinizer<'a> {
    belief: &'a BeliefState,
    opponent_moves: usize,
    oracle: Option<&'a dyn PolicyValueOracle>,
}

impl<'a> Determinizer<'a> {
    pub fn new(
        belief: &'a BeliefState,
        opponent_moves: usize,
        oracle: Option<&'a dyn PolicyValueOracle>,
    ) -> Self {
        Determinizer { belief, opponent_moves, oracle }
    }

    /// The opponent stone budget: observed opponent move count, capped so a
    /// sample can never hold more stones than physically fit next to the
    /// agent's own stones and true eyes.
    pub fn stone_budget(&self) -> usize {
        let own = self.belief.own_points();
        let eyes = self.true_eye_count();
        let upper = BOARD_AREA.saturating_sub(own.len() + eyes);
        self.opponent_moves.min(upper)
    }

    /// Draw `count` complete boards with relative likelihood weights.
    ///
    /// Never fails: when no legal completion can be sampled the agent's own
    /// best-guess board is returned with weight 1.
    pub fn sample(&self, count: usize, rng: &mut fastrand::Rng) -> Vec<(Board, f32)> {
        let base = self.belief.best_guess_board();
        let inferred = self.belief.inferred_points();
        let remaining = self.stone_budget().saturating_sub(inferred.len());
        if remaining == 0 {
            return vec![(base, 1.0)];
        }

        let weights = self.point_weights(&base);
        if weights.iter().sum::<f32>() <= 0.0 {
            return vec![(base, 1.0)];
        }

        let opponent = self.belief.color().opponent();
        let mut samples = Vec::with_capacity(count);
        for _ in 0..count {
            if let Some(sample) = self.sample_one(&base, &weights, remaining, opponent, rng) {
                samples.push(sample);
            }
        }
        if samples.is_empty() {
            samples.push((base, 1.0));
        }
        samples
    }

    /// One weighted sample-without-replacement pass. Returns `None` when the
    /// budget could not be placed within the retry bounds.
    fn sample_one(
        &self,
        base: &Board,
        weights: &[f32; BOARD_AREA],
        budget: usize,
        opponent: Player,
        rng: &mut fastrand::Rng,
    ) -> Option<(Board, f32)> {
        let mut weights = *weights;
        let mut board = base.clone();
        let mut likelihood = 1.0f32;

        for i in 0..budget {
            let retries = if i + 1 == budget { LAST_PLACE_RETRIES } else { PLACE_RETRIES };
            let mut placed = false;
            for _ in 0..retries {
                let Some(idx) = draw_index(&weights, rng) else { break };
                let pt = Point::from_index(idx);
                let mut trial = board.clone();
                match trial.place(pt, opponent) {
                    // Capturing draws are inconsistent with the agent's
                    // observations and get rejected like illegal ones.
                    Ok(captured) if captured.is_empty() => {
                        board = trial;
                        likelihood *= weights[idx] * DRAW_PROB_SCALE;
                        weights[idx] = 0.0;
                        renormalize(&mut weights);
                        placed = true;
                        break;
                    }
                    _ => continue,
                }
            }
            if !placed {
                return None;
            }
        }
        Some((board, likelihood))
    }

    /// Build the normalized per-point prior over unknown points.
    fn point_weights(&self, base: &Board) -> [f32; BOARD_AREA] {
        let mut weights = SPATIAL_PRIOR;

        if let Some(oracle) = self.oracle {
            let view = self.opponent_view();
            let prediction = oracle.predict(&encode_belief(&view), self.belief.color().opponent());
            for (i, w) in weights.iter_mut().enumerate() {
                if let Some(&p) = prediction.policy.get(i) {
                    *w += p * ORACLE_POLICY_WEIGHT;
                }
            }
        }

        let inferred = self.belief.inferred_points();
        if inferred.len() > INFERRED_PRESSURE_MIN {
            for &pt in &inferred {
                for n in pt.neighbors() {
                    weights[n.index()] += INFERRED_NEIGHBOR_WEIGHT;
                }
                for d in pt.diagonals() {
                    weights[d.index()] += INFERRED_DIAGONAL_WEIGHT;
                }
            }
        }

        // Fixed stones, eyes, and anything already occupied on the base
        // board can never receive a sampled stone.
        let own_board = self.own_only_board();
        for pt in Point::all() {
            let excluded = self.belief.state(pt) != MemoryPointState::Unknown
                && self.belief.state(pt) != MemoryPointState::KoBlocked;
            if excluded
                || base.state(pt) != crate::board::PointState::Empty
                || own_board.is_eye(pt) == Some(self.belief.color())
            {
                weights[pt.index()] = 0.0;
            }
        }
        renormalize(&mut weights);
        weights
    }

    /// The game as the opponent plausibly sees it, used to query the oracle
    /// for opponent move probabilities.
    ///
    /// Inferred opponent stones become the opponent's own stones. Our stones
    /// are revealed to them by a visibility-by-distance heuristic, keeping
    /// the most visible ones up to the number of stones they have had
    /// contact-level evidence about.
    pub fn opponent_view(&self) -> BeliefState {
        let mut view = BeliefState::new(self.belief.color().opponent());
        let inferred = self.belief.inferred_points();
        for &pt in &inferred {
            view.mark_own(pt);
        }

        let mut visible: Vec<(Point, f32)> = self
            .belief
            .own_points()
            .into_iter()
            .map(|pt| (pt, visibility(pt, &inferred)))
            .collect();
        visible.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        for &(pt, _) in visible.iter().take(inferred.len()) {
            view.mark_inferred(pt);
        }
        view.record_snapshot();
        view
    }

    /// Board holding only the agent's own stones, for eye detection.
    fn own_only_board(&self) -> Board {
        let mut board = Board::new();
        for pt in self.belief.own_points() {
            board.set_stone(pt, self.belief.color());
        }
        board
    }

    fn true_eye_count(&self) -> usize {
        let own_board = self.own_only_board();
        Point::all()
            .filter(|&p| own_board.is_eye(p) == Some(self.belief.color()))
            .count()
    }
}

/// Probability that one own stone has been noticed by the opponent, from the
/// Manhattan distance to the nearest inferred opponent stone.
fn visibility(pt: Point, opponent_stones: &[Point]) -> f32 {
    if opponent_stones.is_empty() {
        return DEFAULT_VISIBILITY;
    }
    opponent_stones
        .iter()
        .map(|o| {
            let d = pt.distance(o).min(VISIBILITY_BY_DISTANCE.len() - 1);
            VISIBILITY_BY_DISTANCE[d]
        })
        .fold(0.0, f32::max)
}

/// Draw an index proportionally to `weights`. `None` when all mass is gone.
fn draw_index(weights: &[f32], rng: &mut fastrand::Rng) -> Option<usize> {
    let total: f32 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }
    let r = rng.f32() * total;
    let mut cumulative = 0.0;
    for (i, &w) in weights.iter().enumerate() {
        if w > 0.0 {
            cumulative += w;
            if r < cumulative {
                return Some(i);
            }
        }
    }
    weights.iter().position(|&w| w > 0.0)
}

fn renormalize(weights: &mut [f32]) {
    let total: f32 = weights.iter().sum();
    if total > 0.0 {
        for w in weights.iter_mut() {
            *w /= total;
        }
    }
}
