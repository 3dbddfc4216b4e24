//! Constants for board dimensions, search parameters, and opponent-model priors.
//!
//! This module contains all the configuration constants for the Phantom Go
//! engine. Phantom Go here is played on a fixed 9x9 board; the weights below
//! were tuned by hand and are quality knobs, not correctness requirements.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). This engine plays 9x9.
pub const N: usize = 9;

/// Number of playable points on the board.
pub const BOARD_AREA: usize = N * N;

/// Compensation points awarded to White for moving second.
pub const KOMI: f64 = 7.5;

/// How many past board snapshots are kept for oracle feature encoding.
pub const HISTORY_LEN: usize = 8;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default number of simulations per move.
pub const N_SIMS: usize = 400;

/// UCT exploration constant.
pub const UCT_C: f64 = 1.41;

/// PUCT exploration constant (used when a policy/value oracle guides search).
pub const PUCT_C: f64 = 3.0;

/// Maximum number of untried moves kept per node. When more unknown points
/// exist they are ranked by a cheap heuristic and truncated to this many.
pub const MAX_BRANCHING: usize = 15;

/// Own-move count below which the opening book is consulted before search.
pub const OPENING_MOVES: usize = 5;

/// Opening book in priority order: tengen, the four star points, the four
/// side stars. Coordinates are 1-based (row, col).
pub const OPENING_BOOK: [(usize, usize); 9] = [
    (5, 5),
    (3, 3),
    (7, 7),
    (3, 7),
    (7, 3),
    (5, 3),
    (3, 5),
    (7, 5),
    (5, 7),
];

// =============================================================================
// Playout Parameters
// =============================================================================

/// Maximum number of moves in one rollout before it is scored as-is.
pub const MAX_PLAYOUT_MOVES: usize = 50;

/// Probability of picking among the top-ranked candidates in a rollout.
pub const PLAYOUT_GREEDY_PROB: f64 = 0.8;

/// How many top-ranked candidates the greedy pick chooses from.
pub const PLAYOUT_GREEDY_TOP: usize = 3;

// =============================================================================
// Determinizer / Opponent Model
// =============================================================================

/// Number of determinized boards sampled per rollout evaluation.
pub const N_DETERMINIZATIONS: usize = 3;

/// Center-weighted spatial prior over the 81 points (row-major, rows 1..=9).
pub const SPATIAL_PRIOR: [f32; BOARD_AREA] = [
    1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0, //
    2.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0, 1.0, 2.0, //
    1.0, 2.0, 3.0, 3.0, 3.0, 3.0, 3.0, 2.0, 1.0, //
    2.0, 2.0, 3.0, 4.0, 4.0, 4.0, 3.0, 2.0, 2.0, //
    1.0, 2.0, 3.0, 4.0, 5.0, 4.0, 3.0, 2.0, 1.0, //
    2.0, 2.0, 3.0, 4.0, 4.0, 4.0, 3.0, 2.0, 2.0, //
    1.0, 2.0, 3.0, 3.0, 3.0, 3.0, 3.0, 2.0, 1.0, //
    2.0, 1.0, 2.0, 2.0, 2.0, 2.0, 2.0, 1.0, 2.0, //
    1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0, 2.0, 1.0,
];

/// Additive weight on orthogonal neighbors of inferred opponent stones.
pub const INFERRED_NEIGHBOR_WEIGHT: f32 = 100.0;

/// Additive weight on diagonal neighbors of inferred opponent stones.
pub const INFERRED_DIAGONAL_WEIGHT: f32 = 50.0;

/// Scale applied to the oracle's opponent policy when building the prior.
pub const ORACLE_POLICY_WEIGHT: f32 = 500.0;

/// Inferred stone count above which the neighbor/diagonal pressure applies.
/// Early on the opponent is assumed to spread out rather than clump.
pub const INFERRED_PRESSURE_MIN: usize = 5;

/// Retries when drawing one opponent stone during determinization.
pub const PLACE_RETRIES: usize = 5;

/// Retries for the final opponent stone.
pub const LAST_PLACE_RETRIES: usize = 10;

/// Probability that an own stone is assumed visible to the opponent, indexed
/// by Manhattan distance to the nearest inferred opponent stone (0..=4).
pub const VISIBILITY_BY_DISTANCE: [f32; 5] = [1.0, 1.0, 0.8, 0.5, 0.2];

/// Visibility assumed when no opponent stone has been inferred yet.
pub const DEFAULT_VISIBILITY: f32 = 0.2;

// =============================================================================
// Zobrist Hashing
// =============================================================================

/// Seed for the Zobrist key table. Fixed so that hashes are comparable
/// between independently created boards within one process.
pub const ZOBRIST_SEED: u64 = 0x9E37_79B9_7F4A_7C15;
