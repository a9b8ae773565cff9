//! Assignment engine.
//!
//! Binds every claimed square of a board to a unique grid cell and labels the
//! board's columns and rows with two independently shuffled digit sets.
//!
//! ## Run
//!
//! 1. Order squares by claim order (stable on ties).
//! 2. Shuffle grid positions `0..100`, winning digits `0..10`, and losing
//!    digits `0..10`, each with its own Fisher-Yates pass.
//! 3. Square `k` takes shuffled position `k`. Its winning digit is the
//!    shuffled winning digit at the position's column, its losing digit the
//!    shuffled losing digit at the position's row.
//!
//! The digit shuffles happen once per run and are shared by every square
//! through [`DigitLabels`], so all squares in a column carry the same winning
//! digit and all squares in a row carry the same losing digit.

use std::collections::HashSet;

use squares_types::{
    col_of, row_of, Assignment, Placement, Square, DIGITS, GRID_CELLS, GRID_SIZE, MAX_SQUARES,
};
use thiserror::Error;

use crate::rng::{shuffle, RandomSource};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AssignmentError {
    #[error("Invalid input: boardId and squares are required")]
    InvalidInput,
    #[error("Cannot assign more than {max} squares")]
    TooManySquares { count: usize, max: usize },
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Column and row header digits for one assignment run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DigitLabels {
    winning: [u8; DIGITS as usize],
    losing: [u8; DIGITS as usize],
}

impl DigitLabels {
    /// Draws both header permutations, winning digits first.
    pub fn shuffled<R: RandomSource + ?Sized>(rng: &mut R) -> Self {
        let mut winning = identity_digits();
        let mut losing = identity_digits();
        shuffle(&mut winning, rng);
        shuffle(&mut losing, rng);
        Self { winning, losing }
    }

    /// Winning digit per column.
    pub fn winning(&self) -> &[u8; DIGITS as usize] {
        &self.winning
    }

    /// Losing digit per row.
    pub fn losing(&self) -> &[u8; DIGITS as usize] {
        &self.losing
    }

    /// Labels a grid position with its column and row digits.
    pub fn place(&self, grid_position: u8) -> Placement {
        Placement {
            grid_position,
            winning_team_number: self.winning[usize::from(col_of(grid_position))],
            losing_team_number: self.losing[usize::from(row_of(grid_position))],
        }
    }
}

fn identity_digits() -> [u8; DIGITS as usize] {
    let mut digits = [0u8; DIGITS as usize];
    for (i, digit) in digits.iter_mut().enumerate() {
        *digit = i as u8;
    }
    digits
}

/// Assigns grid positions and header digits to every square of a board.
///
/// Either every square gets an assignment or the run fails; results come back
/// in claim order.
pub fn assign_squares<R: RandomSource + ?Sized>(
    board_id: &str,
    squares: &[Square],
    rng: &mut R,
) -> Result<Vec<Assignment>, AssignmentError> {
    if board_id.trim().is_empty() || squares.is_empty() {
        return Err(AssignmentError::InvalidInput);
    }
    if squares.len() > MAX_SQUARES {
        return Err(AssignmentError::TooManySquares {
            count: squares.len(),
            max: MAX_SQUARES,
        });
    }
    validate_entries(squares)?;

    let mut ordered: Vec<&Square> = squares.iter().collect();
    ordered.sort_by_key(|square| square.claim_order);

    let mut positions: Vec<u8> = (0..GRID_CELLS).collect();
    shuffle(&mut positions, rng);
    let labels = DigitLabels::shuffled(rng);

    let assignments: Vec<Assignment> = ordered
        .iter()
        .zip(positions.iter())
        .map(|(square, position)| Assignment::new(square.id.clone(), labels.place(*position)))
        .collect();

    tracing::info!(board_id, squares = assignments.len(), "assigned squares");
    Ok(assignments)
}

fn validate_entries(squares: &[Square]) -> Result<(), AssignmentError> {
    let mut seen = HashSet::with_capacity(squares.len());
    for (index, square) in squares.iter().enumerate() {
        if square.id.trim().is_empty() {
            return Err(AssignmentError::Unexpected(format!(
                "square at index {index} has no id"
            )));
        }
        if square.user_id.trim().is_empty() {
            return Err(AssignmentError::Unexpected(format!(
                "square {} has no owner",
                square.id
            )));
        }
        if !seen.insert(square.id.as_str()) {
            return Err(AssignmentError::Unexpected(format!(
                "square {} appears more than once",
                square.id
            )));
        }
    }
    Ok(())
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GridLabelsError {
    #[error("grid position {0} out of range")]
    PositionOutOfRange(u8),
    #[error("column {col} labeled both {first} and {second}")]
    ConflictingColumn { col: u8, first: u8, second: u8 },
    #[error("row {row} labeled both {first} and {second}")]
    ConflictingRow { row: u8, first: u8, second: u8 },
}

/// Header digits recovered from a finished assignment set.
///
/// Columns or rows with no assigned square stay `None`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GridLabels {
    pub columns: [Option<u8>; GRID_SIZE as usize],
    pub rows: [Option<u8>; GRID_SIZE as usize],
}

impl GridLabels {
    pub fn from_assignments(assignments: &[Assignment]) -> Result<Self, GridLabelsError> {
        let mut labels = Self::default();
        for assignment in assignments {
            if assignment.grid_position >= GRID_CELLS {
                return Err(GridLabelsError::PositionOutOfRange(assignment.grid_position));
            }
            let col = assignment.col();
            let row = assignment.row();
            match labels.columns[usize::from(col)] {
                Some(first) if first != assignment.winning_team_number => {
                    return Err(GridLabelsError::ConflictingColumn {
                        col,
                        first,
                        second: assignment.winning_team_number,
                    });
                }
                _ => labels.columns[usize::from(col)] = Some(assignment.winning_team_number),
            }
            match labels.rows[usize::from(row)] {
                Some(first) if first != assignment.losing_team_number => {
                    return Err(GridLabelsError::ConflictingRow {
                        row,
                        first,
                        second: assignment.losing_team_number,
                    });
                }
                _ => labels.rows[usize::from(row)] = Some(assignment.losing_team_number),
            }
        }
        Ok(labels)
    }
}
