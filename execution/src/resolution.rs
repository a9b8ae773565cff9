//! Winner resolution engine.
//!
//! A completed game's final score selects one board cell: the ones digit of
//! the column team's score picks the column and the ones digit of the row
//! team's score picks the row. The square on that cell wins the payout
//! configured for the game's round. An empty cell is "no winner", not an
//! error.
//!
//! Resolution draws no randomness, so re-running it on the same game and board
//! yields the same result.

use serde::{Deserialize, Serialize};
use squares_types::{
    grid_position, BoardAssignment, Game, GameStatus, PayoutTable, Round, TeamSlot, GRID_CELLS,
    GRID_SIZE,
};
use thiserror::Error;

/// Team whose trailing score digit selects the column (winning team number).
pub const COLUMN_TEAM: TeamSlot = TeamSlot::Team1;

/// Team whose trailing score digit selects the row (losing team number).
pub const ROW_TEAM: TeamSlot = TeamSlot::Team2;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolutionError {
    #[error("Invalid score for {team} in game {game_id}: {value}")]
    InvalidScore {
        game_id: String,
        team: TeamSlot,
        value: String,
    },
    #[error("Game {game_id} is not completed (status: {status})")]
    IncompleteGame { game_id: String, status: GameStatus },
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// A completed game whose score could not be resolved.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SkippedGame {
    pub game_id: String,
    pub round: Round,
    pub error: String,
}

/// Every completed game of a board, resolved or skipped, in round order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResolutions {
    pub resolutions: Vec<Resolution>,
    pub skipped: Vec<SkippedGame>,
}

/// Outcome of resolving one completed game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolution {
    pub game_id: String,
    pub round: Round,
    pub grid_position: u8,
    pub payout_amount: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_square_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_user_id: Option<String>,
}

impl Resolution {
    pub fn has_winner(&self) -> bool {
        self.winner_square_id.is_some()
    }

    pub fn winner(&self) -> Option<Winner> {
        let square_id = self.winner_square_id.clone()?;
        let user_id = self.winner_user_id.clone()?;
        Some(Winner {
            game_id: self.game_id.clone(),
            square_id,
            user_id,
            grid_position: self.grid_position,
            payout_amount: self.payout_amount,
            round: self.round,
        })
    }
}

/// A paid square for one game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Winner {
    pub game_id: String,
    pub square_id: String,
    pub user_id: String,
    pub grid_position: u8,
    pub payout_amount: u64,
    pub round: Round,
}

/// Assigned squares of a board indexed by grid position.
pub struct Board<'a> {
    cells: [Option<&'a BoardAssignment>; GRID_CELLS as usize],
}

impl<'a> Board<'a> {
    /// Indexes a board, rejecting out-of-range or doubly claimed positions.
    pub fn new(assignments: &'a [BoardAssignment]) -> Result<Self, ResolutionError> {
        let mut cells = [None; GRID_CELLS as usize];
        for assignment in assignments {
            let slot = cells
                .get_mut(usize::from(assignment.grid_position))
                .ok_or_else(|| {
                    ResolutionError::Unexpected(format!(
                        "square {} has grid position {} outside the board",
                        assignment.square_id, assignment.grid_position
                    ))
                })?;
            if let Some(existing) = slot.replace(assignment) {
                return Err(ResolutionError::Unexpected(format!(
                    "grid position {} held by both {} and {}",
                    assignment.grid_position, existing.square_id, assignment.square_id
                )));
            }
        }
        Ok(Self { cells })
    }

    pub fn occupant(&self, position: u8) -> Option<&'a BoardAssignment> {
        self.cells.get(usize::from(position)).copied().flatten()
    }

    pub fn occupied(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_some()).count()
    }
}

/// Returns the trailing digit of a team's final score.
fn trailing_digit(game: &Game, team: TeamSlot) -> Result<u8, ResolutionError> {
    match game.score(team) {
        Some(score) if score >= 0 => Ok((score % i64::from(GRID_SIZE)) as u8),
        Some(score) => Err(ResolutionError::InvalidScore {
            game_id: game.id.clone(),
            team,
            value: score.to_string(),
        }),
        None => Err(ResolutionError::InvalidScore {
            game_id: game.id.clone(),
            team,
            value: "missing".to_string(),
        }),
    }
}

/// Computes the grid position a completed game's score selects.
pub fn target_position(game: &Game) -> Result<u8, ResolutionError> {
    if game.status != GameStatus::Completed {
        return Err(ResolutionError::IncompleteGame {
            game_id: game.id.clone(),
            status: game.status,
        });
    }
    let col = trailing_digit(game, COLUMN_TEAM)?;
    let row = trailing_digit(game, ROW_TEAM)?;
    Ok(grid_position(row, col))
}

/// Resolves the winning square and payout for one completed game.
pub fn resolve_winner(
    game: &Game,
    assignments: &[BoardAssignment],
    payouts: &PayoutTable,
) -> Result<Resolution, ResolutionError> {
    let board = Board::new(assignments)?;
    resolve_on_board(game, &board, payouts)
}

/// Same as [`resolve_winner`], against an already indexed board.
pub fn resolve_on_board(
    game: &Game,
    board: &Board<'_>,
    payouts: &PayoutTable,
) -> Result<Resolution, ResolutionError> {
    let position = target_position(game)?;
    let payout_amount = payouts.payout_for(game.round);
    let occupant = board.occupant(position);

    match occupant {
        Some(square) => tracing::info!(
            game_id = %game.id,
            round = %game.round,
            grid_position = position,
            square_id = %square.square_id,
            user_id = %square.user_id,
            payout_amount,
            "resolved winner"
        ),
        None => tracing::info!(
            game_id = %game.id,
            round = %game.round,
            grid_position = position,
            "no square at winning position"
        ),
    }

    Ok(Resolution {
        game_id: game.id.clone(),
        round: game.round,
        grid_position: position,
        payout_amount,
        winner_square_id: occupant.map(|square| square.square_id.clone()),
        winner_user_id: occupant.map(|square| square.user_id.clone()),
    })
}

/// Resolves every completed game of a board in bracket order.
///
/// Games that are not completed are ignored; games within a round keep their
/// input order. A completed game with a bad score is logged and reported in
/// [`BoardResolutions::skipped`] instead of failing the board. Only a malformed
/// board is an error.
pub fn resolve_board(
    games: &[Game],
    assignments: &[BoardAssignment],
    payouts: &PayoutTable,
) -> Result<BoardResolutions, ResolutionError> {
    let board = Board::new(assignments)?;
    let mut completed: Vec<&Game> = games.iter().filter(|game| game.is_completed()).collect();
    completed.sort_by_key(|game| game.round);

    let mut resolved = BoardResolutions::default();
    for game in completed {
        match resolve_on_board(game, &board, payouts) {
            Ok(resolution) => resolved.resolutions.push(resolution),
            Err(err) => {
                tracing::warn!(
                    game_id = %game.id,
                    round = %game.round,
                    error = %err,
                    "skipped unresolvable game"
                );
                resolved.skipped.push(SkippedGame {
                    game_id: game.id.clone(),
                    round: game.round,
                    error: err.to_string(),
                });
            }
        }
    }
    Ok(resolved)
}
