//! Board-side records: claimed squares and the grid assignments bound to them.
//!
//! A grid position is an integer in `0..GRID_CELLS`, read as
//! `row = position / GRID_SIZE` and `col = position % GRID_SIZE`.

use serde::{Deserialize, Serialize};

use crate::{GRID_CELLS, GRID_SIZE};

/// Returns the row (0..=9) of a grid position.
pub fn row_of(position: u8) -> u8 {
    position / GRID_SIZE
}

/// Returns the column (0..=9) of a grid position.
pub fn col_of(position: u8) -> u8 {
    position % GRID_SIZE
}

/// Builds a grid position from a row and a column.
pub fn grid_position(row: u8, col: u8) -> u8 {
    debug_assert!(row < GRID_SIZE && col < GRID_SIZE);
    row * GRID_SIZE + col
}

/// Returns true if `position` is within `0..GRID_CELLS`.
pub fn is_valid_position(position: u8) -> bool {
    position < GRID_CELLS
}

/// One purchased cell claim on a board.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Square {
    pub id: String,
    pub user_id: String,
    /// Strictly increasing purchase counter; fixes the order squares consume
    /// shuffled positions.
    pub claim_order: u64,
    /// Opaque, carried through untouched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<String>,
}

impl Square {
    pub fn new(id: impl Into<String>, user_id: impl Into<String>, claim_order: u64) -> Self {
        Self {
            id: id.into(),
            user_id: user_id.into(),
            claim_order,
            payment_status: None,
        }
    }
}

/// Output of an assignment run for one square.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Placement {
    pub grid_position: u8,
    /// Column header digit.
    pub winning_team_number: u8,
    /// Row header digit.
    pub losing_team_number: u8,
}

/// Binds a square to its grid position and header digits.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub square_id: String,
    pub grid_position: u8,
    pub winning_team_number: u8,
    pub losing_team_number: u8,
}

impl Assignment {
    pub fn new(square_id: impl Into<String>, placement: Placement) -> Self {
        Self {
            square_id: square_id.into(),
            grid_position: placement.grid_position,
            winning_team_number: placement.winning_team_number,
            losing_team_number: placement.losing_team_number,
        }
    }

    pub fn row(&self) -> u8 {
        row_of(self.grid_position)
    }

    pub fn col(&self) -> u8 {
        col_of(self.grid_position)
    }

    pub fn placement(&self) -> Placement {
        Placement {
            grid_position: self.grid_position,
            winning_team_number: self.winning_team_number,
            losing_team_number: self.losing_team_number,
        }
    }
}

/// A persisted assignment joined with its owner, as read back for winner
/// resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardAssignment {
    pub square_id: String,
    pub user_id: String,
    pub grid_position: u8,
}

impl BoardAssignment {
    pub fn new(square_id: impl Into<String>, user_id: impl Into<String>, grid_position: u8) -> Self {
        Self {
            square_id: square_id.into(),
            user_id: user_id.into(),
            grid_position,
        }
    }
}
