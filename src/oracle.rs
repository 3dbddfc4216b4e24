//! Policy/value oracle boundary and belief feature encoding.
//!
//! The engine never loads or runs a model itself; it consumes an abstract
//! `predict` contract. The oracle must be stateless and side-effect-free so
//! search can call it from cloned positions at will. Loading failures are the
//! loader's problem and should be fatal at agent construction time: a
//! silently wrong policy would corrupt every downstream search statistic.

use crate::belief::{BeliefState, MemoryPointState};
use crate::board::Player;
use crate::constants::{BOARD_AREA, HISTORY_LEN, N};

/// Total feature planes: 8 own-history, 8 opponent-history, 1 player-to-move.
pub const FEATURE_CHANNELS: usize = 2 * HISTORY_LEN + 1;

/// Policy length: one slot per grid point plus one pass slot.
pub const POLICY_LEN: usize = BOARD_AREA + 1;

/// One oracle answer.
#[derive(Clone, Debug)]
pub struct Prediction {
    /// Move probabilities over the 81 points plus pass, row-major.
    pub policy: Vec<f32>,
    /// Expected outcome in [-1, 1] for the player to move.
    pub value: f32,
}

/// External policy/value estimator consumed by search and determinization.
pub trait PolicyValueOracle {
    /// Evaluate an encoded belief state for `to_move`.
    fn predict(&self, features: &[f32], to_move: Player) -> Prediction;
}

/// Encode a belief state into the oracle's input planes.
///
/// Layout is channel-major: for each of the last [`HISTORY_LEN`] snapshots
/// (newest first) an own-stone plane then an inferred-opponent plane, and a
/// final plane filled with 1.0 when Black is the believing player.
pub fn encode_belief(belief: &BeliefState) -> Vec<f32> {
    let mut features = vec![0.0f32; FEATURE_CHANNELS * BOARD_AREA];
    for (step, grid) in belief.history(HISTORY_LEN).into_iter().enumerate() {
        let own_base = 2 * step * BOARD_AREA;
        let opp_base = own_base + BOARD_AREA;
        for row in 1..=N {
            for col in 1..=N {
                let idx = (row - 1) * N + (col - 1);
                match grid[row][col] {
                    MemoryPointState::Own => features[own_base + idx] = 1.0,
                    MemoryPointState::InferredOpponent => features[opp_base + idx] = 1.0,
                    _ => {}
                }
            }
        }
    }
    if belief.color() == Player::Black {
        let base = 2 * HISTORY_LEN * BOARD_AREA;
        for v in &mut features[base..] {
            *v = 1.0;
        }
    }
    features
}
