//! Squares pool engines.
//!
//! This crate turns claimed squares into a board layout and completed bracket
//! games into paid squares. Every engine is a synchronous, pure function of its
//! inputs; persistence and transport belong to the caller.
//!
//! ## Engines
//! - [`assignment`]: binds squares to unique grid cells and shuffles the row
//!   and column header digits.
//! - [`resolution`]: maps a final score's trailing digits to a cell, its owner,
//!   and the round's payout.
//! - [`progress`]: per-round game counts and the bracket's current round.
//! - [`winnings`]: per-user totals across resolved games.
//!
//! [`boundary`] wraps assignment and resolution so callers always get a
//! structured outcome back, never an error or a panic.
//!
//! ## Determinism requirements
//! - Assignment draws randomness only from the [`RandomSource`] it is given.
//! - Resolution and progress draw no randomness at all.
//! - Assignment must run at most once per board; the caller enforces that.
//!
//! ## Example
//! ```rust
//! use squares_execution::{run_assignment, AssignmentRequest, SeededSource};
//! use squares_types::Square;
//!
//! let request = AssignmentRequest {
//!     board_id: Some("board-1".to_string()),
//!     squares: Some(vec![Square::new("sq-1", "user-1", 1)]),
//! };
//! let outcome = run_assignment(&request, &mut SeededSource::from_seed(7));
//! assert!(outcome.success);
//! ```

pub mod assignment;
pub mod boundary;
pub mod progress;
pub mod resolution;
pub mod rng;
pub mod winnings;


pub use assignment::{assign_squares, AssignmentError, DigitLabels, GridLabels, GridLabelsError};
pub use boundary::{
    run_assignment, run_assignment_json, run_resolution, run_resolution_json, AssignmentOutcome,
    AssignmentRequest, ErrorKind, RawScore, ResolutionOutcome, ResolutionRequest,
};
pub use progress::{tournament_progress, CurrentRound, TournamentProgress};
pub use resolution::{
    resolve_board, resolve_on_board, resolve_winner, target_position, Board, BoardResolutions,
    Resolution, ResolutionError, SkippedGame, Winner, COLUMN_TEAM, ROW_TEAM,
};
pub use rng::{shuffle, FixedSource, RandomSource, SeededSource};
pub use winnings::{tally_winnings, UserWinnings};
