use std::time::Duration;

use rand_pcg::Pcg32;
use serde::Serialize;

use crate::core::{Grid, Piece, drop_position, hard_drop, is_valid_placement, try_move, try_rotate};

use super::{GameStats, GarbageInjector, GarbageUnit, SessionSeed};

/// Gravity interval while the player is not soft-dropping.
pub const DEFAULT_DROP_INTERVAL: Duration = Duration::from_millis(1000);
/// Gravity interval while the player holds soft drop.
pub const DEFAULT_SOFT_DROP_INTERVAL: Duration = Duration::from_millis(50);

/// Timing and top-out behavior of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub drop_interval: Duration,
    pub soft_drop_interval: Duration,
    /// Start a fresh game right after a top-out instead of stopping in
    /// [`SessionState::GameOver`].
    pub auto_restart: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            drop_interval: DEFAULT_DROP_INTERVAL,
            soft_drop_interval: DEFAULT_SOFT_DROP_INTERVAL,
            auto_restart: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
pub enum SessionState {
    Idle,
    Running,
    Paused,
    GameOver,
}

/// Final result of a game, reported by the tick that topped out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GameOver {
    pub score: usize,
    pub lines: usize,
}

/// A single board driven by elapsed time and player requests.
///
/// The session owns the grid, the active piece, and the garbage in flight. Time only
/// advances through [`Self::tick`]; requests take effect immediately and are ignored
/// unless the session is running.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use ojama_engine::{GameSession, SessionConfig, SessionSeed};
///
/// let mut session = GameSession::spawn(SessionConfig::default(), SessionSeed::from_u128(7));
/// let row = session.active_piece().unwrap().position().row();
///
/// session.request_move(-1, 0);
/// assert!(session.tick(Duration::from_millis(1000)).is_none());
/// assert_eq!(session.active_piece().unwrap().position().row(), row + 1);
///
/// let distance = session.request_hard_drop();
/// assert_eq!(session.stats().score(), distance * 2);
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    config: SessionConfig,
    seed: SessionSeed,
    rng: Pcg32,
    grid: Grid,
    active_piece: Option<Piece>,
    garbage: GarbageInjector,
    stats: GameStats,
    state: SessionState,
    drop_timer: Duration,
    soft_dropping: bool,
}

/// Serializable view of a session, for headless runs and debugging.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot<'a> {
    pub seed: SessionSeed,
    pub state: SessionState,
    pub stats: &'a GameStats,
    pub grid: &'a Grid,
    pub active_piece: Option<&'a Piece>,
    pub garbage_units: &'a [GarbageUnit],
}

impl GameSession {
    /// Creates an idle session; nothing happens until [`Self::start`].
    #[must_use]
    pub fn new(config: SessionConfig, seed: SessionSeed) -> Self {
        Self {
            config,
            seed,
            rng: seed.rng(),
            grid: Grid::EMPTY,
            active_piece: None,
            garbage: GarbageInjector::new(),
            stats: GameStats::new(),
            state: SessionState::Idle,
            drop_timer: Duration::ZERO,
            soft_dropping: false,
        }
    }

    /// Creates a running session with its first piece already spawned.
    #[must_use]
    pub fn spawn(config: SessionConfig, seed: SessionSeed) -> Self {
        let mut session = Self::new(config, seed);
        session.start();
        session
    }

    /// Moves an idle session to running. Does nothing in any other state.
    pub fn start(&mut self) {
        if self.state.is_idle() {
            self.reset();
        }
    }

    /// Starts a new game: empty grid, zeroed counters, no garbage, new first piece.
    ///
    /// The random stream continues from where the previous game left it.
    pub fn reset(&mut self) {
        self.grid = Grid::EMPTY;
        self.garbage.clear();
        self.stats = GameStats::new();
        self.drop_timer = Duration::ZERO;
        self.soft_dropping = false;
        self.active_piece = Some(Piece::spawn(&mut self.rng));
        self.state = SessionState::Running;
    }

    #[must_use]
    pub fn seed(&self) -> SessionSeed {
        self.seed
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.active_piece.as_ref()
    }

    #[must_use]
    pub fn garbage_units(&self) -> &[GarbageUnit] {
        self.garbage.units()
    }

    #[must_use]
    pub fn stats(&self) -> &GameStats {
        &self.stats
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_soft_dropping(&self) -> bool {
        self.soft_dropping
    }

    /// Returns where the active piece would land on a hard drop.
    #[must_use]
    pub fn drop_position(&self) -> Option<Piece> {
        self.active_piece
            .as_ref()
            .map(|piece| drop_position(&self.grid, piece))
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot<'_> {
        SessionSnapshot {
            seed: self.seed,
            state: self.state,
            stats: &self.stats,
            grid: &self.grid,
            active_piece: self.active_piece.as_ref(),
            garbage_units: self.garbage.units(),
        }
    }

    pub fn toggle_pause(&mut self) {
        self.state = match self.state {
            SessionState::Running => SessionState::Paused,
            SessionState::Paused => SessionState::Running,
            state @ (SessionState::Idle | SessionState::GameOver) => state,
        };
    }

    /// Advances the session by `elapsed`.
    ///
    /// Garbage in flight moves on every tick. Gravity fires once the accumulated time
    /// reaches the current drop interval, after which the timer restarts from zero. When
    /// the piece cannot fall it locks, full lines clear, and the next piece spawns.
    ///
    /// Returns the final result on the tick that tops out.
    pub fn tick(&mut self, elapsed: Duration) -> Option<GameOver> {
        if !self.state.is_running() {
            return None;
        }

        self.drop_timer = self.drop_timer.saturating_add(elapsed);
        self.garbage.advance_all(&mut self.grid);

        let interval = if self.soft_dropping {
            self.config.soft_drop_interval
        } else {
            self.config.drop_interval
        };
        if self.drop_timer < interval {
            return None;
        }
        self.drop_timer = Duration::ZERO;

        let piece = self.active_piece.as_mut()?;
        if try_move(&self.grid, piece, 0, 1).is_ok() {
            return None;
        }
        self.lock_active_piece()
    }

    fn lock_active_piece(&mut self) -> Option<GameOver> {
        let piece = self.active_piece.take()?;
        self.grid.place(&piece);
        let cleared_lines = self.grid.clear_full_lines();
        if self.stats.complete_piece_drop(cleared_lines) {
            self.garbage.emit(&mut self.rng);
        }

        let next = Piece::spawn(&mut self.rng);
        self.active_piece = Some(next);
        self.soft_dropping = false;
        if is_valid_placement(&self.grid, &next, 0, 0, None) {
            return None;
        }
        Some(self.top_out())
    }

    fn top_out(&mut self) -> GameOver {
        let result = GameOver {
            score: self.stats.score(),
            lines: self.stats.total_cleared_lines(),
        };
        self.state = SessionState::GameOver;
        if self.config.auto_restart {
            self.reset();
        }
        result
    }

    /// Moves the active piece by the offset. Returns `false` when blocked or ignored.
    pub fn request_move(&mut self, d_col: i32, d_row: i32) -> bool {
        if !self.state.is_running() {
            return false;
        }
        let Some(piece) = self.active_piece.as_mut() else {
            return false;
        };
        try_move(&self.grid, piece, d_col, d_row).is_ok()
    }

    /// Rotates the active piece clockwise. Returns `false` when blocked or ignored.
    pub fn request_rotate(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }
        let Some(piece) = self.active_piece.as_mut() else {
            return false;
        };
        try_rotate(&self.grid, piece).is_ok()
    }

    /// Drops the active piece as far as it goes and scores the distance.
    ///
    /// The piece is not locked here; the next gravity step locks it.
    pub fn request_hard_drop(&mut self) -> usize {
        if !self.state.is_running() {
            return 0;
        }
        let Some(piece) = self.active_piece.as_mut() else {
            return 0;
        };
        let distance = hard_drop(&self.grid, piece);
        self.stats.add_hard_drop(distance);
        distance
    }

    /// Switches gravity between the normal and the soft-drop interval.
    ///
    /// The flag is cleared whenever a piece locks.
    pub fn set_soft_dropping(&mut self, soft_dropping: bool) {
        if self.state.is_running() {
            self.soft_dropping = soft_dropping;
        }
    }
}
