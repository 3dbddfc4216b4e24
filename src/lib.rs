//! Phantom-Go: a 9x9 Phantom Go engine.
//!
//! Phantom Go is Go with hidden information: each player sees only their own
//! stones, and a referee arbitrates moves against the true board. Players
//! learn about the opponent through rejected moves and capture announcements.
//! The engine tracks a belief state per player, samples plausible complete
//! boards from it, and picks moves with information-set MCTS.
//!
//! ## Modules
//!
//! - [`constants`] - Board dimensions, search knobs, opponent-model priors
//! - [`point`] - Grid coordinates and sentinels
//! - [`board`] - The true-board rule engine (captures, ko, superko)
//! - [`score`] - Area scoring
//! - [`belief`] - Per-agent memory of the hidden board
//! - [`oracle`] - Policy/value oracle trait and feature encoding
//! - [`determinize`] - Sampling complete boards from a belief state
//! - [`playout`] - Heuristic rollouts for leaf evaluation
//! - [`search`] - Information-set MCTS
//! - [`agent`] - The search player and a random baseline
//! - [`controller`] - The referee driving one match
//!
//! ## Example
//!
//! ```
//! use phantom_go::board::{Board, Player};
//! use phantom_go::point::parse_point;
//!
//! let mut board = Board::new();
//! let tengen = parse_point("E5").unwrap();
//! board.place(tengen, Player::Black).unwrap();
//! assert_eq!(board.liberties(tengen), 4);
//! ```

pub mod agent;
pub mod belief;
pub mod board;
pub mod constants;
pub mod controller;
pub mod determinize;
pub mod oracle;
pub mod playout;
pub mod point;
pub mod score;
pub mod search;
