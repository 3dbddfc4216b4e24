//! Information-set Monte Carlo Tree Search over belief states.
//!
//! The tree is built from the searching agent's point of view: every node
//! carries a copy of the agent's belief with the imagined moves along the
//! path applied to it (own moves as own stones, imagined opponent replies as
//! inferred stones). Leaves are evaluated either by heuristic rollouts over a
//! handful of determinized boards, or by the oracle's value head when one is
//! installed.
//!
//! Selection uses plain UCT without an oracle and PUCT with one. The final
//! move is the most-visited root child, which is more robust than the
//! highest mean value under noisy evaluations.

use crate::belief::BeliefState;
use crate::board::Player;
use crate::constants::{
    MAX_BRANCHING, N_DETERMINIZATIONS, N_SIMS, PUCT_C, SPATIAL_PRIOR, UCT_C,
};
use crate::determinize::Determinizer;
use crate::oracle::{PolicyValueOracle, encode_belief};
use crate::playout::{rollout, score_move};
use crate::point::Point;

/// Search knobs, fixed per agent.
#[derive(Clone, Copy, Debug)]
pub struct SearchConfig {
    /// Simulations per move decision.
    pub simulations: usize,
    /// Determinized boards per rollout evaluation.
    pub determinizations: usize,
    /// Evaluate leaves with the oracle's value head instead of rollouts.
    /// Ignored when no oracle is installed.
    pub use_oracle_value: bool,
    /// Print root child statistics after every decision.
    pub verbose: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        SearchConfig {
            simulations: N_SIMS,
            determinizations: N_DETERMINIZATIONS,
            use_oracle_value: false,
            verbose: false,
        }
    }
}

/// A node in the belief-state search tree.
pub struct SearchNode {
    /// The searching agent's belief with this node's path applied.
    belief: BeliefState,
    /// Player imagined to move next from this node.
    to_move: Player,
    /// Move that led here (`None` at the root).
    mv: Option<Point>,
    /// Opponent moves assumed to exist at this node, real plus imagined.
    opponent_moves: usize,
    visits: u32,
    /// Accumulated outcome from the perspective of the player who made `mv`.
    value: f64,
    /// Oracle policy mass for `mv`, used by PUCT.
    prior: f64,
    /// Oracle policy over this node's position, fetched on first expansion.
    policy: Option<Vec<f64>>,
    children: Vec<SearchNode>,
    untried: Vec<Point>,
}

impl SearchNode {
    fn new(
        belief: BeliefState,
        to_move: Player,
        mv: Option<Point>,
        opponent_moves: usize,
        prior: f64,
    ) -> Self {
        let untried = candidate_moves(&belief, to_move);
        SearchNode {
            belief,
            to_move,
            mv,
            opponent_moves,
            visits: 0,
            value: 0.0,
            prior,
            policy: None,
            children: Vec::new(),
            untried,
        }
    }

    /// Mean outcome for the player who moved into this node.
    fn q(&self) -> f64 {
        if self.visits > 0 {
            self.value / self.visits as f64
        } else {
            0.0
        }
    }

}

/// One search instance; cheap to construct per move decision.
pub struct Search<'a> {
    config: SearchConfig,
    oracle: Option<&'a dyn PolicyValueOracle>,
}

impl<'a> Search<'a> {
    pub fn new(config: SearchConfig, oracle: Option<&'a dyn PolicyValueOracle>) -> Self {
        Search { config, oracle }
    }

    /// Pick a move for the believing agent, or [`Point::PASS`] when nothing
    /// is worth trying.
    pub fn best_move(
        &self,
        belief: &BeliefState,
        opponent_moves: usize,
        rng: &mut fastrand::Rng,
    ) -> Point {
        let color = belief.color();
        let mut root = SearchNode::new(belief.clone(), color, None, opponent_moves, 1.0);
        if root.untried.is_empty() {
            return Point::PASS;
        }

        for _ in 0..self.config.simulations {
            let path = self.descend(&mut root);
            let leaf_index = self.expand(&mut root, &path, rng);
            let eval_path: Vec<usize> = match leaf_index {
                Some(idx) => path.iter().copied().chain(std::iter::once(idx)).collect(),
                None => path,
            };
            let z = self.evaluate(node_at(&root, &eval_path), rng);
            backpropagate(&mut root, &eval_path, z);
        }

        if self.config.verbose {
            Self::dump_children(&root);
        }
        root.children
            .iter()
            .max_by_key(|c| c.visits)
            .and_then(|c| c.mv)
            .unwrap_or(Point::PASS)
    }

    /// Walk from the root to a node that still has untried moves (or is a
    /// dead end), returning the child-index path.
    fn descend(&self, root: &mut SearchNode) -> Vec<usize> {
        let mut path = Vec::new();
        let mut node = root;
        while node.untried.is_empty() && !node.children.is_empty() {
            let idx = self.select_child(node);
            path.push(idx);
            node = &mut node.children[idx];
        }
        path
    }

    /// Index of the most urgent child under UCT or PUCT.
    fn select_child(&self, node: &SearchNode) -> usize {
        let parent_visits = node.visits.max(1) as f64;
        let scored = |child: &SearchNode| -> f64 {
            if self.oracle.is_some() {
                child.q() + PUCT_C * child.prior * parent_visits.sqrt() / (1.0 + child.visits as f64)
            } else if child.visits == 0 {
                f64::INFINITY
            } else {
                child.q() + UCT_C * (parent_visits.ln() / child.visits as f64).sqrt()
            }
        };
        node.children
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| {
                scored(a).partial_cmp(&scored(b)).unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    /// Expand one untried move at the end of `path`. Returns the new child's
    /// index, or `None` when the node cannot be expanded.
    fn expand(
        &self,
        root: &mut SearchNode,
        path: &[usize],
        rng: &mut fastrand::Rng,
    ) -> Option<usize> {
        if self.oracle.is_some() && node_at(root, path).policy.is_none() {
            let policy = self.child_priors(node_at(root, path));
            node_at_mut(root, path).policy = policy;
        }
        let node = node_at_mut(root, path);
        if node.untried.is_empty() {
            return None;
        }
        let mv = node.untried.remove(rng.usize(..node.untried.len()));

        let mut belief = node.belief.clone();
        let color = belief.color();
        let (next_opponent_moves, next_to_move) = if node.to_move == color {
            belief.mark_own(mv);
            (node.opponent_moves, color.opponent())
        } else {
            belief.mark_inferred(mv);
            (node.opponent_moves + 1, color)
        };
        belief.record_snapshot();

        let prior = node.policy.as_ref().map(|p| p[mv.index()]).unwrap_or(1.0);
        node.children.push(SearchNode::new(
            belief,
            next_to_move,
            Some(mv),
            next_opponent_moves,
            prior,
        ));
        Some(node.children.len() - 1)
    }

    /// Oracle move priors for a node's position, normalized over the board.
    fn child_priors(&self, node: &SearchNode) -> Option<Vec<f64>> {
        let oracle = self.oracle?;
        let prediction = oracle.predict(&encode_belief(&node.belief), node.to_move);
        let mut priors = vec![0.0f64; crate::constants::BOARD_AREA];
        let mut total = 0.0;
        for (i, p) in priors.iter_mut().enumerate() {
            *p = f64::from(*prediction.policy.get(i).unwrap_or(&0.0)).max(0.0);
            total += *p;
        }
        if total > 0.0 {
            for p in priors.iter_mut() {
                *p /= total;
            }
        }
        Some(priors)
    }

    /// Value of a leaf in [-1, 1] from its `to_move` player's perspective.
    fn evaluate(&self, node: &SearchNode, rng: &mut fastrand::Rng) -> f64 {
        if self.config.use_oracle_value {
            if let Some(oracle) = self.oracle {
                let prediction = oracle.predict(&encode_belief(&node.belief), node.to_move);
                return f64::from(prediction.value).clamp(-1.0, 1.0);
            }
        }

        let determinizer = Determinizer::new(&node.belief, node.opponent_moves, self.oracle);
        let samples = determinizer.sample(self.config.determinizations, rng);
        let mut weighted = 0.0;
        let mut total_weight = 0.0;
        for (board, weight) in &samples {
            let winner = rollout(board, node.to_move, rng);
            let z = if winner == node.to_move { 1.0 } else { -1.0 };
            let w = f64::from(*weight).max(f64::MIN_POSITIVE);
            weighted += z * w;
            total_weight += w;
        }
        if total_weight > 0.0 { weighted / total_weight } else { 0.0 }
    }

    /// Root child visit counts, for diagnostics.
    pub fn dump_children(root: &SearchNode) {
        for child in &root.children {
            if let Some(mv) = child.mv {
                eprintln!("move {} v={} q={:.3}", mv, child.visits, child.q());
            }
        }
    }
}

/// Rank the believing player's unknown points and keep the best few.
///
/// Legality and tactics are judged on the best-guess board, which is the only
/// board the agent has. Spatial prior breaks ties in empty areas.
fn candidate_moves(belief: &BeliefState, to_move: Player) -> Vec<Point> {
    let board = belief.best_guess_board();
    let mut scored: Vec<(Point, f32)> = belief
        .unknown_points()
        .into_iter()
        .filter_map(|pt| {
            score_move(&board, pt, to_move)
                .map(|s| (pt, s + SPATIAL_PRIOR[pt.index()]))
        })
        .collect();
    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(MAX_BRANCHING);
    scored.into_iter().map(|(pt, _)| pt).collect()
}

fn node_at<'t>(root: &'t SearchNode, path: &[usize]) -> &'t SearchNode {
    path.iter().fold(root, |node, &idx| &node.children[idx])
}

fn node_at_mut<'t>(root: &'t mut SearchNode, path: &[usize]) -> &'t mut SearchNode {
    path.iter().fold(root, |node, &idx| &mut node.children[idx])
}

/// Propagate a leaf value back to the root.
///
/// `z` is from the leaf's to-move perspective; each node accumulates from the
/// perspective of the player who moved into it, so the sign flips every ply.
fn backpropagate(root: &mut SearchNode, path: &[usize], z: f64) {
    // Value for the player who made the move into the leaf.
    let mut value = -z;
    let mut node = node_at_mut(root, path);
    node.visits += 1;
    node.value += value;

    for cut in (0..path.len()).rev() {
        value = -value;
        node = node_at_mut(root, &path[..cut]);
        node.visits += 1;
        node.value += value;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::oracle::{POLICY_LEN, Prediction};

    struct CornerOracle;

    impl PolicyValueOracle for CornerOracle {
        fn predict(&self, _features: &[f32], _to_move: Player) -> Prediction {
            // All policy mass on A9 (index 0), mild optimism for the mover.
            let mut policy = vec![0.0; POLICY_LEN];
            policy[0] = 1.0;
            Prediction { policy, value: 0.3 }
        }
    }

    #[test]
    fn test_search_returns_candidate_move() {
        let belief = BeliefState::new(Player::Black);
        let config = SearchConfig { simulations: 30, determinizations: 1, ..Default::default() };
        let search = Search::new(config, None);
        let mut rng = fastrand::Rng::with_seed(9);
        let mv = search.best_move(&belief, 0, &mut rng);
        assert!(mv.is_move());
        assert!(mv.on_board());
    }

    #[test]
    fn test_search_passes_when_nothing_playable() {
        let mut belief = BeliefState::new(Player::Black);
        for pt in Point::all() {
            belief.mark_own(pt);
        }
        let search = Search::new(SearchConfig::default(), None);
        let mut rng = fastrand::Rng::with_seed(1);
        assert_eq!(search.best_move(&belief, 0, &mut rng), Point::PASS);
    }

    #[test]
    fn test_candidate_cap() {
        let belief = BeliefState::new(Player::White);
        let candidates = candidate_moves(&belief, Player::White);
        assert!(!candidates.is_empty());
        assert!(candidates.len() <= MAX_BRANCHING);
    }

    #[test]
    fn test_oracle_value_leaf_evaluation() {
        let oracle = CornerOracle;
        let belief = BeliefState::new(Player::Black);
        let config = SearchConfig {
            simulations: 20,
            determinizations: 1,
            use_oracle_value: true,
            ..Default::default()
        };
        let search = Search::new(config, Some(&oracle));
        let mut rng = fastrand::Rng::with_seed(4);
        let mv = search.best_move(&belief, 0, &mut rng);
        assert!(mv.is_move());
    }

    struct CountingOracle {
        calls: std::cell::Cell<usize>,
    }

    impl PolicyValueOracle for CountingOracle {
        fn predict(&self, _features: &[f32], _to_move: Player) -> Prediction {
            self.calls.set(self.calls.get() + 1);
            Prediction { policy: vec![1.0 / POLICY_LEN as f32; POLICY_LEN], value: 0.0 }
        }
    }

    #[test]
    fn test_node_policy_fetched_once() {
        let oracle = CountingOracle { calls: std::cell::Cell::new(0) };
        let belief = BeliefState::new(Player::Black);
        let search = Search::new(SearchConfig::default(), Some(&oracle));
        let mut rng = fastrand::Rng::with_seed(8);
        let mut root = SearchNode::new(belief, Player::Black, None, 0, 1.0);
        // Expanding the same node repeatedly must not re-query the oracle.
        for _ in 0..5 {
            assert!(search.expand(&mut root, &[], &mut rng).is_some());
        }
        assert_eq!(oracle.calls.get(), 1);
    }

    #[test]
    fn test_backpropagation_counts_visits() {
        let belief = BeliefState::new(Player::Black);
        let config = SearchConfig { simulations: 25, determinizations: 1, ..Default::default() };
        let search = Search::new(config, None);
        let mut rng = fastrand::Rng::with_seed(17);
        let mut root = SearchNode::new(belief, Player::Black, None, 0, 1.0);
        for _ in 0..25 {
            let path = search.descend(&mut root);
            let leaf = search.expand(&mut root, &path, &mut rng);
            let eval_path: Vec<usize> = match leaf {
                Some(idx) => path.iter().copied().chain(std::iter::once(idx)).collect(),
                None => path,
            };
            let z = search.evaluate(node_at(&root, &eval_path), &mut rng);
            backpropagate(&mut root, &eval_path, z);
        }
        assert_eq!(root.visits, 25);
        let child_visits: u32 = root.children.iter().map(|c| c.visits).sum();
        assert_eq!(child_visits, 25);
    }
}
