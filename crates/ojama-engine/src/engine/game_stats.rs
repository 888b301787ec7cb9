use serde::Serialize;

/// Points per cleared line (flat, not scaled by the number of lines cleared at once).
pub const LINE_CLEAR_SCORE: usize = 100;
/// Points per row travelled by a hard drop.
pub const HARD_DROP_SCORE_PER_ROW: usize = 2;
/// Cleared lines needed before a garbage unit is emitted.
pub const GARBAGE_LINE_THRESHOLD: usize = 5;

/// Game statistics tracking score, lines cleared, and piece count.
///
/// Tracks various metrics during a game session:
///
/// - **Score**: 100 points per cleared line plus 2 points per hard-dropped row
/// - **Completed pieces**: Total number of pieces locked
/// - **Line clear distribution**: Count of locks by number of lines cleared
/// - **Garbage counter**: Lines cleared since the last garbage unit was emitted
///
/// # Example
///
/// ```
/// use ojama_engine::GameStats;
///
/// let mut stats = GameStats::new();
/// assert!(!stats.complete_piece_drop(4));
/// assert!(stats.complete_piece_drop(1)); // 5 lines since the last emission
///
/// assert_eq!(stats.score(), 500);
/// assert_eq!(stats.total_cleared_lines(), 5);
/// assert_eq!(stats.garbage_counter(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameStats {
    score: usize,
    completed_pieces: usize,
    total_cleared_lines: usize,
    line_cleared_counter: [usize; 5],
    garbage_counter: usize,
}

impl Default for GameStats {
    fn default() -> Self {
        Self::new()
    }
}

impl GameStats {
    /// Creates a new game statistics tracker with all counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            score: 0,
            completed_pieces: 0,
            total_cleared_lines: 0,
            line_cleared_counter: [0; 5],
            garbage_counter: 0,
        }
    }

    #[must_use]
    pub const fn score(&self) -> usize {
        self.score
    }

    /// Returns the total number of pieces that have been locked into place.
    #[must_use]
    pub const fn completed_pieces(&self) -> usize {
        self.completed_pieces
    }

    #[must_use]
    pub const fn total_cleared_lines(&self) -> usize {
        self.total_cleared_lines
    }

    /// Returns a histogram of locks by lines cleared.
    ///
    /// Index `n` counts locks that cleared `n` lines; index 4 also counts larger clears.
    #[must_use]
    pub const fn line_cleared_counter(&self) -> &[usize; 5] {
        &self.line_cleared_counter
    }

    /// Returns the lines cleared since the last garbage unit was emitted.
    #[must_use]
    pub const fn garbage_counter(&self) -> usize {
        self.garbage_counter
    }

    /// Updates statistics after a piece lock.
    ///
    /// Returns `true` when the garbage counter reached [`GARBAGE_LINE_THRESHOLD`]; the
    /// counter then restarts from zero, dropping any overflow.
    pub fn complete_piece_drop(&mut self, cleared_lines: usize) -> bool {
        self.completed_pieces += 1;
        self.line_cleared_counter[cleared_lines.min(4)] += 1;
        if cleared_lines == 0 {
            return false;
        }

        self.total_cleared_lines += cleared_lines;
        self.score += cleared_lines * LINE_CLEAR_SCORE;
        self.garbage_counter += cleared_lines;
        if self.garbage_counter >= GARBAGE_LINE_THRESHOLD {
            self.garbage_counter = 0;
            return true;
        }
        false
    }

    /// Adds the hard-drop bonus for `distance` rows.
    pub fn add_hard_drop(&mut self, distance: usize) {
        self.score += distance * HARD_DROP_SCORE_PER_ROW;
    }
}
