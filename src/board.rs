//! Full-information Go board: placement, capture, ko, and superko.
//!
//! This is the authoritative rule engine the hidden "true" game obeys. It
//! knows nothing about hidden information; agents work against it indirectly
//! through referee feedback.
//!
//! The board keeps an incremental Zobrist hash of the position and the set of
//! hashes seen earlier in the game, which is how positional superko (whole
//! board repetition) is rejected. The key table is built once from a fixed
//! seed and shared between clones, so hashes are comparable across boards.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use crate::constants::{HISTORY_LEN, N, ZOBRIST_SEED};
use crate::point::Point;

/// One of the two players.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Player {
    Black,
    White,
}

impl Player {
    /// The other side.
    #[inline]
    pub fn opponent(&self) -> Player {
        match self {
            Player::Black => Player::White,
            Player::White => Player::Black,
        }
    }

    #[inline]
    pub(crate) fn index(&self) -> usize {
        match self {
            Player::Black => 0,
            Player::White => 1,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::Black => write!(f, "Black"),
            Player::White => write!(f, "White"),
        }
    }
}

/// Truth value of one grid point.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PointState {
    #[default]
    Empty,
    Black,
    White,
}

impl From<Player> for PointState {
    fn from(player: Player) -> Self {
        match player {
            Player::Black => PointState::Black,
            Player::White => PointState::White,
        }
    }
}

impl PointState {
    /// The player owning a stone in this state, if any.
    pub fn player(&self) -> Option<Player> {
        match self {
            PointState::Empty => None,
            PointState::Black => Some(Player::Black),
            PointState::White => Some(Player::White),
        }
    }
}

/// Why a placement was rejected.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum PlayError {
    /// Point is outside the grid
    OffBoard,
    /// Point is not empty
    Occupied,
    /// Move retakes the ko
    KoViolation,
    /// Move would leave the placed group without liberties
    Suicide,
    /// Move recreates an earlier whole-board position
    SuperKo,
    /// The game has already ended
    GameOver,
}

impl std::fmt::Display for PlayError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayError::OffBoard => write!(f, "illegal move: point is off the board"),
            PlayError::Occupied => write!(f, "illegal move: point is not empty"),
            PlayError::KoViolation => write!(f, "illegal move: retakes ko"),
            PlayError::Suicide => write!(f, "illegal move: suicide"),
            PlayError::SuperKo => write!(f, "illegal move: repeats an earlier position"),
            PlayError::GameOver => write!(f, "illegal move: game is over"),
        }
    }
}

impl std::error::Error for PlayError {}

/// Referee-facing result of one attempted action, broadcast to agents.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlayResult {
    /// Stones removed by this move, empty when nothing was captured.
    pub captured: Vec<Point>,
    /// Set when the action was rejected.
    pub error: Option<PlayError>,
}

impl PlayResult {
    pub fn success(captured: Vec<Point>) -> Self {
        PlayResult { captured, error: None }
    }

    pub fn failure(error: PlayError) -> Self {
        PlayResult { captured: Vec::new(), error: Some(error) }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

impl From<Result<Vec<Point>, PlayError>> for PlayResult {
    fn from(result: Result<Vec<Point>, PlayError>) -> Self {
        match result {
            Ok(captured) => PlayResult::success(captured),
            Err(err) => PlayResult::failure(err),
        }
    }
}

/// Grid snapshot type used for the feature-encoding history ring.
pub type Grid = [[PointState; N + 1]; N + 1];

/// Zobrist key table: one random 64-bit key per (point, color) pair.
///
/// Built once per process configuration from [`ZOBRIST_SEED`] and shared by
/// all boards through an `Arc`, never a process-wide static.
#[derive(Debug)]
pub struct Zobrist {
    keys: [[[u64; 2]; N + 1]; N + 1],
}

impl Zobrist {
    pub fn new(rng: &mut fastrand::Rng) -> Self {
        let mut keys = [[[0u64; 2]; N + 1]; N + 1];
        for row in keys.iter_mut() {
            for cell in row.iter_mut() {
                cell[0] = rng.u64(..);
                cell[1] = rng.u64(..);
            }
        }
        Zobrist { keys }
    }

    #[inline]
    fn key(&self, pt: Point, player: Player) -> u64 {
        self.keys[pt.row][pt.col][player.index()]
    }
}

/// A 9x9 Go board with ko and positional-superko enforcement.
#[derive(Clone)]
pub struct Board {
    grid: Grid,
    ko_point: Option<Point>,
    hash: u64,
    seen: HashSet<u64>,
    zobrist: Arc<Zobrist>,
    history: VecDeque<Grid>,
    game_over: bool,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub fn new() -> Self {
        let mut rng = fastrand::Rng::with_seed(ZOBRIST_SEED);
        Self::with_zobrist(Arc::new(Zobrist::new(&mut rng)))
    }

    /// Create a board sharing an existing key table.
    pub fn with_zobrist(zobrist: Arc<Zobrist>) -> Self {
        let grid = [[PointState::Empty; N + 1]; N + 1];
        let mut seen = HashSet::new();
        seen.insert(0);
        let mut history = VecDeque::new();
        history.push_back(grid);
        Board {
            grid,
            ko_point: None,
            hash: 0,
            seen,
            zobrist,
            history,
            game_over: false,
        }
    }

    #[inline]
    pub fn state(&self, pt: Point) -> PointState {
        self.grid[pt.row][pt.col]
    }

    pub fn ko_point(&self) -> Option<Point> {
        self.ko_point
    }

    pub fn hash(&self) -> u64 {
        self.hash
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    /// Mark the game finished; later placements fail with `GameOver`.
    pub fn end_game(&mut self) {
        self.game_over = true;
    }

    /// Attempt to place a stone. On success returns the captured points.
    ///
    /// A rejected move never leaves a partial mutation behind: tentative
    /// placements are rolled back before the error is returned.
    pub fn place(&mut self, pt: Point, player: Player) -> Result<Vec<Point>, PlayError> {
        if self.game_over {
            return Err(PlayError::GameOver);
        }
        if !pt.on_board() {
            return Err(PlayError::OffBoard);
        }
        if self.state(pt) != PointState::Empty {
            return Err(PlayError::Occupied);
        }
        if self.ko_point == Some(pt) {
            return Err(PlayError::KoViolation);
        }

        let opponent_stone = PointState::from(player.opponent());
        self.grid[pt.row][pt.col] = PointState::from(player);

        // Capture: flood-fill each adjacent enemy group and test zero liberty.
        let mut captured: Vec<Point> = Vec::new();
        for n in pt.neighbors() {
            if self.state(n) == opponent_stone && !captured.contains(&n) {
                let (group, liberties) = self.find_group(n);
                if liberties == 0 {
                    captured.extend(group);
                }
            }
        }

        if captured.is_empty() {
            let (_, own_liberties) = self.find_group(pt);
            if own_liberties == 0 {
                self.grid[pt.row][pt.col] = PointState::Empty;
                return Err(PlayError::Suicide);
            }
        }

        let mut next_hash = self.hash ^ self.zobrist.key(pt, player);
        for &c in &captured {
            next_hash ^= self.zobrist.key(c, player.opponent());
        }
        if self.seen.contains(&next_hash) {
            self.grid[pt.row][pt.col] = PointState::Empty;
            return Err(PlayError::SuperKo);
        }

        self.hash = next_hash;
        self.seen.insert(next_hash);
        for &c in &captured {
            self.grid[c.row][c.col] = PointState::Empty;
        }

        // A single capture by a lone stone left with a single liberty is a ko.
        self.ko_point = None;
        if captured.len() == 1 {
            let (own_group, own_liberties) = self.find_group(pt);
            if own_group.len() == 1 && own_liberties == 1 {
                self.ko_point = Some(captured[0]);
            }
        }

        self.record_history();
        Ok(captured)
    }

    /// Clear the ko ban. A ko forbids the retake for one move only, so the
    /// referee calls this when a turn passes without a placement.
    pub fn pass_turn(&mut self) {
        self.ko_point = None;
    }

    /// Pure legality probe: attempts the move on a throwaway clone.
    pub fn is_legal(&self, pt: Point, player: Player) -> bool {
        if !pt.on_board() || self.state(pt) != PointState::Empty || self.ko_point == Some(pt) {
            return false;
        }
        let mut probe = self.clone();
        probe.place(pt, player).is_ok()
    }

    /// Collect the connected group containing `pt` and count its liberties.
    ///
    /// Iterative breadth-first flood fill; an empty start point yields an
    /// empty group with zero liberties.
    pub fn find_group(&self, pt: Point) -> (Vec<Point>, usize) {
        let state = self.state(pt);
        if state == PointState::Empty {
            return (Vec::new(), 0);
        }
        let mut group = Vec::new();
        let mut visited = [[false; N + 1]; N + 1];
        let mut liberty = [[false; N + 1]; N + 1];
        let mut liberties = 0;
        let mut queue = VecDeque::new();
        queue.push_back(pt);
        visited[pt.row][pt.col] = true;
        while let Some(current) = queue.pop_front() {
            group.push(current);
            for n in current.neighbors() {
                match self.state(n) {
                    s if s == state => {
                        if !visited[n.row][n.col] {
                            visited[n.row][n.col] = true;
                            queue.push_back(n);
                        }
                    }
                    PointState::Empty => {
                        if !liberty[n.row][n.col] {
                            liberty[n.row][n.col] = true;
                            liberties += 1;
                        }
                    }
                    _ => {}
                }
            }
        }
        (group, liberties)
    }

    /// Liberty count of the group containing `pt` (0 for an empty point).
    pub fn liberties(&self, pt: Point) -> usize {
        self.find_group(pt).1
    }

    /// A point is koish for a color when every orthogonal neighbor on the
    /// board is a stone of that one color.
    pub fn is_koish(&self, pt: Point) -> Option<Player> {
        if self.state(pt) != PointState::Empty {
            return None;
        }
        let mut color = None;
        for n in pt.neighbors() {
            match self.state(n).player() {
                None => return None,
                Some(p) => match color {
                    None => color = Some(p),
                    Some(c) if c != p => return None,
                    _ => {}
                },
            }
        }
        color
    }

    /// True-eye test: koish, and at most one diagonal fault. Off-board
    /// diagonals count as one fault, so edge and corner eyes get no slack
    /// for an enemy diagonal stone.
    pub fn is_eye(&self, pt: Point) -> Option<Player> {
        let color = self.is_koish(pt)?;
        let enemy = PointState::from(color.opponent());
        let mut faults = 0;
        let mut diagonal_count = 0;
        for d in pt.diagonals() {
            diagonal_count += 1;
            if self.state(d) == enemy {
                faults += 1;
            }
        }
        if diagonal_count < 4 {
            faults += 1;
        }
        if faults > 1 { None } else { Some(color) }
    }

    /// Place a stone without rule checks, keeping the hash consistent.
    /// Used for belief replay and test setup, never during live play.
    pub fn set_stone(&mut self, pt: Point, player: Player) {
        if let Some(existing) = self.state(pt).player() {
            self.hash ^= self.zobrist.key(pt, existing);
        }
        self.grid[pt.row][pt.col] = PointState::from(player);
        self.hash ^= self.zobrist.key(pt, player);
    }

    /// Remove a stone without rule checks, keeping the hash consistent.
    pub fn clear_stone(&mut self, pt: Point) {
        if let Some(existing) = self.state(pt).player() {
            self.hash ^= self.zobrist.key(pt, existing);
        }
        self.grid[pt.row][pt.col] = PointState::Empty;
    }

    /// All empty playable points.
    pub fn empty_points(&self) -> Vec<Point> {
        Point::all().filter(|&p| self.state(p) == PointState::Empty).collect()
    }

    /// All points occupied by `player`.
    pub fn stones(&self, player: Player) -> Vec<Point> {
        let stone = PointState::from(player);
        Point::all().filter(|&p| self.state(p) == stone).collect()
    }

    fn record_history(&mut self) {
        self.history.push_back(self.grid);
        if self.history.len() > HISTORY_LEN {
            self.history.pop_front();
        }
    }

    /// The most recent `steps` grid snapshots, newest first, padded with
    /// empty grids when the game is younger than `steps` moves.
    pub fn history(&self, steps: usize) -> Vec<Grid> {
        let mut out: Vec<Grid> = self.history.iter().rev().take(steps).copied().collect();
        while out.len() < steps {
            out.push([[PointState::Empty; N + 1]; N + 1]);
        }
        out
    }
}

impl std::fmt::Display for Board {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for row in 1..=N {
            for col in 1..=N {
                let ch = match self.grid[row][col] {
                    PointState::Black => 'X',
                    PointState::White => 'O',
                    PointState::Empty => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
