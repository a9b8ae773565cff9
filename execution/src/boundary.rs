//! Entry points that always return a structured outcome.
//!
//! [`run_assignment`] and [`run_resolution`] are the only places errors and
//! panics are caught. Validation failures are logged at `warn`, anything else
//! at `error`, and both come back as `{ success: false, error }`. Callers must
//! treat a failed outcome as "nothing happened".
//!
//! Callers holding raw JSON use [`run_assignment_json`] and
//! [`run_resolution_json`]; a payload that does not decode into a request is an
//! `Unexpected` failure, never an error returned to the caller.

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use squares_types::{
    Assignment, BoardAssignment, Game, GameStatus, PayoutTable, Round, Square, TeamSlot,
};
use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};

use crate::assignment::{assign_squares, AssignmentError};
use crate::resolution::{resolve_winner, Resolution, ResolutionError};
use crate::rng::RandomSource;

/// Failure classes reported across the boundary.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    InvalidInput,
    TooManySquares,
    InvalidScore,
    IncompleteGame,
    Unexpected,
}

impl ErrorKind {
    fn is_validation(self) -> bool {
        !matches!(self, ErrorKind::Unexpected)
    }
}

impl From<&AssignmentError> for ErrorKind {
    fn from(err: &AssignmentError) -> Self {
        match err {
            AssignmentError::InvalidInput => ErrorKind::InvalidInput,
            AssignmentError::TooManySquares { .. } => ErrorKind::TooManySquares,
            AssignmentError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

impl From<&ResolutionError> for ErrorKind {
    fn from(err: &ResolutionError) -> Self {
        match err {
            ResolutionError::InvalidScore { .. } => ErrorKind::InvalidScore,
            ResolutionError::IncompleteGame { .. } => ErrorKind::IncompleteGame,
            ResolutionError::Unexpected(_) => ErrorKind::Unexpected,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentRequest {
    #[serde(default)]
    pub board_id: Option<String>,
    #[serde(default)]
    pub squares: Option<Vec<Square>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignmentOutcome {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Vec<Assignment>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl AssignmentOutcome {
    fn failed(kind: ErrorKind, error: String) -> Self {
        Self {
            success: false,
            assignments: None,
            error: Some(error),
            error_kind: Some(kind),
        }
    }
}

/// A score as it arrives from the scoring feed, numeric or not.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawScore {
    Integer(i64),
    Float(f64),
    Text(String),
    /// Booleans, arrays, objects: never a score.
    Other(Value),
}

/// Integral floats in `[-2^63, 2^63)` convert to `i64` without saturating.
const I64_FLOAT_BOUND: f64 = 9_223_372_036_854_775_808.0;

impl RawScore {
    fn to_score(&self) -> Option<i64> {
        match self {
            RawScore::Integer(value) => Some(*value),
            RawScore::Float(value)
                if value.is_finite()
                    && value.fract() == 0.0
                    && (-I64_FLOAT_BOUND..I64_FLOAT_BOUND).contains(value) =>
            {
                Some(*value as i64)
            }
            RawScore::Float(_) => None,
            RawScore::Text(text) => text.trim().parse().ok(),
            RawScore::Other(_) => None,
        }
    }
}

impl fmt::Display for RawScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RawScore::Integer(value) => write!(f, "{value}"),
            RawScore::Float(value) => write!(f, "{value}"),
            RawScore::Text(text) => write!(f, "{text:?}"),
            RawScore::Other(value) => write!(f, "{value}"),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionRequest {
    pub game_id: String,
    pub round: Round,
    #[serde(default)]
    pub team1_score: Option<RawScore>,
    #[serde(default)]
    pub team2_score: Option<RawScore>,
    pub status: GameStatus,
    #[serde(default)]
    pub board_assignments: Vec<BoardAssignment>,
}

impl ResolutionRequest {
    /// Builds the game this request describes, rejecting non-numeric scores.
    pub fn to_game(&self) -> Result<Game, ResolutionError> {
        let mut game = Game::new(self.game_id.clone(), self.round).with_status(self.status);
        game.team1_score = self.score(TeamSlot::Team1)?;
        game.team2_score = self.score(TeamSlot::Team2)?;
        Ok(game)
    }

    fn score(&self, team: TeamSlot) -> Result<Option<i64>, ResolutionError> {
        let raw = match team {
            TeamSlot::Team1 => &self.team1_score,
            TeamSlot::Team2 => &self.team2_score,
        };
        match raw {
            None => Ok(None),
            Some(raw) => raw
                .to_score()
                .map(Some)
                .ok_or_else(|| ResolutionError::InvalidScore {
                    game_id: self.game_id.clone(),
                    team,
                    value: raw.to_string(),
                }),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionOutcome {
    pub success: bool,
    #[serde(flatten)]
    pub resolution: Option<Resolution>,
    /// Set on success; true when no square holds the winning cell.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub no_winner: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl ResolutionOutcome {
    fn failed(kind: ErrorKind, error: String) -> Self {
        Self {
            success: false,
            resolution: None,
            no_winner: None,
            error: Some(error),
            error_kind: Some(kind),
        }
    }
}

/// Runs an assignment and reports the result as an [`AssignmentOutcome`].
pub fn run_assignment<R: RandomSource + ?Sized>(
    request: &AssignmentRequest,
    rng: &mut R,
) -> AssignmentOutcome {
    let board_id = request.board_id.as_deref().unwrap_or_default();
    let squares = request.squares.as_deref().unwrap_or_default();

    let result = catch_unwind(AssertUnwindSafe(|| assign_squares(board_id, squares, rng)));
    match result {
        Ok(Ok(assignments)) => AssignmentOutcome {
            success: true,
            assignments: Some(assignments),
            error: None,
            error_kind: None,
        },
        Ok(Err(err)) => {
            let kind = ErrorKind::from(&err);
            log_failure("assignment", board_id, kind, &err);
            AssignmentOutcome::failed(kind, err.to_string())
        }
        Err(panic) => {
            let err = AssignmentError::Unexpected(panic_message(panic.as_ref()));
            log_failure("assignment", board_id, ErrorKind::Unexpected, &err);
            AssignmentOutcome::failed(ErrorKind::Unexpected, err.to_string())
        }
    }
}

/// Resolves a completed game and reports the result as a [`ResolutionOutcome`].
pub fn run_resolution(request: &ResolutionRequest, payouts: &PayoutTable) -> ResolutionOutcome {
    let result = catch_unwind(AssertUnwindSafe(|| {
        let game = request.to_game()?;
        resolve_winner(&game, &request.board_assignments, payouts)
    }));
    match result {
        Ok(Ok(resolution)) => ResolutionOutcome {
            success: true,
            no_winner: Some(!resolution.has_winner()),
            resolution: Some(resolution),
            error: None,
            error_kind: None,
        },
        Ok(Err(err)) => {
            let kind = ErrorKind::from(&err);
            log_failure("resolution", &request.game_id, kind, &err);
            ResolutionOutcome::failed(kind, err.to_string())
        }
        Err(panic) => {
            let err = ResolutionError::Unexpected(panic_message(panic.as_ref()));
            log_failure("resolution", &request.game_id, ErrorKind::Unexpected, &err);
            ResolutionOutcome::failed(ErrorKind::Unexpected, err.to_string())
        }
    }
}

/// Decodes an assignment request from JSON and runs it.
pub fn run_assignment_json<R: RandomSource + ?Sized>(
    input: &str,
    rng: &mut R,
) -> AssignmentOutcome {
    let (subject, request) = decode::<AssignmentRequest>(input, "boardId");
    match request {
        Ok(request) => run_assignment(&request, rng),
        Err(reason) => {
            let err = AssignmentError::Unexpected(reason);
            log_failure("assignment", &subject, ErrorKind::Unexpected, &err);
            AssignmentOutcome::failed(ErrorKind::Unexpected, err.to_string())
        }
    }
}

/// Decodes a resolution request from JSON and runs it.
pub fn run_resolution_json(input: &str, payouts: &PayoutTable) -> ResolutionOutcome {
    let (subject, request) = decode::<ResolutionRequest>(input, "gameId");
    match request {
        Ok(request) => run_resolution(&request, payouts),
        Err(reason) => {
            let err = ResolutionError::Unexpected(reason);
            log_failure("resolution", &subject, ErrorKind::Unexpected, &err);
            ResolutionOutcome::failed(ErrorKind::Unexpected, err.to_string())
        }
    }
}

/// Parses `input` as a request, returning the subject id (when readable) for
/// logging alongside the request or a description of why it is malformed.
fn decode<T: DeserializeOwned>(input: &str, subject_field: &str) -> (String, Result<T, String>) {
    let value: Value = match serde_json::from_str(input) {
        Ok(value) => value,
        Err(err) => return (String::new(), Err(format!("malformed request: {err}"))),
    };
    let subject = value
        .get(subject_field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let request = T::deserialize(&value).map_err(|err| format!("malformed request: {err}"));
    (subject, request)
}

fn log_failure(operation: &str, subject: &str, kind: ErrorKind, err: &dyn fmt::Display) {
    if kind.is_validation() {
        tracing::warn!(operation, subject, ?kind, error = %err, "request rejected");
    } else {
        tracing::error!(operation, subject, ?kind, error = %err, "request failed");
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "internal panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{FixedSource, SeededSource};

    struct PanickingSource;

    impl RandomSource for PanickingSource {
        fn pick(&mut self, _upper: usize) -> usize {
            panic!("entropy unavailable")
        }
    }

    fn payouts() -> PayoutTable {
        PayoutTable::from_amounts([25, 50, 100, 200, 400, 1_000]).unwrap()
    }

    fn request(count: usize) -> AssignmentRequest {
        AssignmentRequest {
            board_id: Some("board-1".into()),
            squares: Some(
                (0..count)
                    .map(|i| Square::new(format!("sq-{i}"), "user", i as u64))
                    .collect(),
            ),
        }
    }

    fn resolution_request(team1: RawScore, team2: RawScore, status: GameStatus) -> ResolutionRequest {
        ResolutionRequest {
            game_id: "g1".into(),
            round: Round::SweetSixteen,
            team1_score: Some(team1),
            team2_score: Some(team2),
            status,
            board_assignments: vec![BoardAssignment::new("sq-48", "alice", 48)],
        }
    }

    #[test]
    fn test_run_assignment_success() {
        let outcome = run_assignment(&request(10), &mut SeededSource::from_seed(3));
        assert!(outcome.success);
        assert_eq!(outcome.assignments.map(|a| a.len()), Some(10));
        assert!(outcome.error.is_none());
    }

    #[test]
    fn test_run_assignment_missing_fields() {
        let outcome = run_assignment(&AssignmentRequest::default(), &mut FixedSource::new(0.5));
        assert!(!outcome.success);
        assert!(outcome.assignments.is_none());
        assert_eq!(
            outcome.error.as_deref(),
            Some("Invalid input: boardId and squares are required")
        );
        assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidInput));

        let mut no_board = request(3);
        no_board.board_id = None;
        let outcome = run_assignment(&no_board, &mut FixedSource::new(0.5));
        assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidInput));
    }

    #[test]
    fn test_run_assignment_too_many() {
        let outcome = run_assignment(&request(101), &mut FixedSource::new(0.5));
        assert!(!outcome.success);
        assert_eq!(
            outcome.error.as_deref(),
            Some("Cannot assign more than 100 squares")
        );
    }

    #[test]
    fn test_run_assignment_catches_panic() {
        let outcome = run_assignment(&request(5), &mut PanickingSource);
        assert!(!outcome.success);
        assert!(outcome.assignments.is_none());
        assert_eq!(outcome.error_kind, Some(ErrorKind::Unexpected));
        assert_eq!(
            outcome.error.as_deref(),
            Some("Unexpected error: entropy unavailable")
        );
    }

    #[test]
    fn test_assignment_request_json() {
        let json = r#"{"boardId":"b1","squares":[{"id":"s1","userId":"u1","claimOrder":1}]}"#;
        let request: AssignmentRequest = serde_json::from_str(json).unwrap();
        let outcome = run_assignment(&request, &mut SeededSource::from_seed(1));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["success"], true);
        assert_eq!(value["assignments"][0]["squareId"], "s1");
        assert!(value.get("error").is_none());

        let null_squares: AssignmentRequest =
            serde_json::from_str(r#"{"boardId":"b1","squares":null}"#).unwrap();
        let value = serde_json::to_value(run_assignment(&null_squares, &mut FixedSource::new(0.5)))
            .unwrap();
        assert_eq!(value["success"], false);
        assert!(value.get("assignments").is_none());
    }

    #[test]
    fn test_run_resolution_winner() {
        let request = resolution_request(
            RawScore::Integer(78),
            RawScore::Integer(74),
            GameStatus::Completed,
        );
        let outcome = run_resolution(&request, &payouts());
        assert!(outcome.success);
        assert_eq!(outcome.no_winner, Some(false));
        let resolution = outcome.resolution.clone().unwrap();
        assert_eq!(resolution.winner_user_id.as_deref(), Some("alice"));
        assert_eq!(resolution.payout_amount, 100);

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["winnerSquareId"], "sq-48");
        assert_eq!(value["winnerUserId"], "alice");
        assert_eq!(value["gridPosition"], 48);
        assert_eq!(value["payoutAmount"], 100);
        assert_eq!(value["round"], "sweet_sixteen");
    }

    #[test]
    fn test_run_resolution_no_winner() {
        let request = resolution_request(
            RawScore::Integer(71),
            RawScore::Integer(60),
            GameStatus::Completed,
        );
        let outcome = run_resolution(&request, &payouts());
        assert!(outcome.success);
        assert_eq!(outcome.no_winner, Some(true));
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["gridPosition"], 1);
        assert!(value.get("winnerUserId").is_none());
    }

    #[test]
    fn test_run_resolution_rejects_incomplete() {
        let request = resolution_request(
            RawScore::Integer(78),
            RawScore::Integer(74),
            GameStatus::InProgress,
        );
        let outcome = run_resolution(&request, &payouts());
        assert!(!outcome.success);
        assert!(outcome.resolution.is_none());
        assert_eq!(outcome.error_kind, Some(ErrorKind::IncompleteGame));
    }

    #[test]
    fn test_run_resolution_rejects_invalid_scores() {
        for (team1, team2) in [
            (RawScore::Integer(-3), RawScore::Integer(74)),
            (RawScore::Text("seventy".into()), RawScore::Integer(74)),
            (RawScore::Integer(78), RawScore::Float(74.5)),
        ] {
            let request = resolution_request(team1, team2, GameStatus::Completed);
            let outcome = run_resolution(&request, &payouts());
            assert!(!outcome.success);
            assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidScore));
        }
    }

    #[test]
    fn test_run_resolution_accepts_numeric_text() {
        let request = resolution_request(
            RawScore::Text("78".into()),
            RawScore::Float(74.0),
            GameStatus::Completed,
        );
        let outcome = run_resolution(&request, &payouts());
        assert!(outcome.success);
        assert_eq!(outcome.resolution.map(|r| r.grid_position), Some(48));
    }

    #[test]
    fn test_resolution_request_json() {
        let json = r#"{
            "gameId": "g1",
            "round": "first_round",
            "team1Score": 78,
            "team2Score": 74,
            "status": "completed",
            "boardAssignments": [{"squareId": "sq-48", "userId": "alice", "gridPosition": 48}]
        }"#;
        let request: ResolutionRequest = serde_json::from_str(json).unwrap();
        assert_eq!(request.team1_score, Some(RawScore::Integer(78)));
        let outcome = run_resolution(&request, &payouts());
        assert_eq!(outcome.resolution.map(|r| r.payout_amount), Some(25));
    }

    #[test]
    fn test_run_assignment_json_malformed_squares() {
        for input in [
            r#"{"boardId":"b1","squares":[{"id":"s1","userId":"u1"}]}"#,
            r#"{"boardId":"b1","squares":[{"id":"s1","userId":"u1","claimOrder":"first"}]}"#,
            r#"{"boardId":"b1","squares":[null]}"#,
            r#"{"boardId":"b1","squares":{"id":"s1"}}"#,
            "not json",
        ] {
            let outcome = run_assignment_json(input, &mut FixedSource::new(0.5));
            assert!(!outcome.success, "{input}");
            assert!(outcome.assignments.is_none());
            assert_eq!(outcome.error_kind, Some(ErrorKind::Unexpected));
            let error = outcome.error.unwrap();
            assert!(error.starts_with("Unexpected error: malformed request"), "{error}");
        }
    }

    #[test]
    fn test_run_assignment_json_valid_and_missing_fields() {
        let outcome = run_assignment_json(
            r#"{"boardId":"b1","squares":[{"id":"s1","userId":"u1","claimOrder":1}]}"#,
            &mut FixedSource::new(0.5),
        );
        assert!(outcome.success);
        assert_eq!(outcome.assignments.map(|a| a[0].grid_position), Some(0));

        let outcome = run_assignment_json(r#"{"squares":[]}"#, &mut FixedSource::new(0.5));
        assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidInput));
    }

    #[test]
    fn test_run_resolution_json_non_numeric_scores() {
        for score in ["true", "[78]", r#"{"points":78}"#, r#""seventy""#] {
            let input = format!(
                r#"{{"gameId":"g1","round":"first_round","team1Score":{score},"team2Score":74,"status":"completed","boardAssignments":[]}}"#
            );
            let outcome = run_resolution_json(&input, &payouts());
            assert!(!outcome.success, "{score}");
            assert!(outcome.resolution.is_none());
            assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidScore), "{score}");
        }

        let input = r#"{"gameId":"g1","round":"first_round","team1Score":true,"team2Score":74,"status":"completed"}"#;
        assert_eq!(
            run_resolution_json(input, &payouts()).error.as_deref(),
            Some("Invalid score for team1 in game g1: true")
        );
    }

    #[test]
    fn test_run_resolution_json_malformed_request() {
        for input in [
            r#"{"round":"first_round","team1Score":78,"team2Score":74,"status":"completed"}"#,
            r#"{"gameId":"g1","round":"play_in","team1Score":78,"team2Score":74,"status":"completed"}"#,
            r#"{"gameId":"g1","round":"first_round","status":"completed","boardAssignments":[null]}"#,
            "",
        ] {
            let outcome = run_resolution_json(input, &payouts());
            assert!(!outcome.success, "{input}");
            assert_eq!(outcome.error_kind, Some(ErrorKind::Unexpected));
        }
    }

    #[test]
    fn test_run_resolution_rejects_out_of_range_floats() {
        for huge in [1e20, -1e20, 9_223_372_036_854_775_808.0] {
            let request = resolution_request(
                RawScore::Float(huge),
                RawScore::Integer(74),
                GameStatus::Completed,
            );
            let outcome = run_resolution(&request, &payouts());
            assert!(!outcome.success, "{huge}");
            assert_eq!(outcome.error_kind, Some(ErrorKind::InvalidScore));
        }

        let input = r#"{"gameId":"g1","round":"first_round","team1Score":1e20,"team2Score":74,"status":"completed"}"#;
        assert_eq!(
            run_resolution_json(input, &payouts()).error_kind,
            Some(ErrorKind::InvalidScore)
        );

        let request = resolution_request(
            RawScore::Float(1e18),
            RawScore::Integer(74),
            GameStatus::Completed,
        );
        let outcome = run_resolution(&request, &payouts());
        assert_eq!(outcome.resolution.map(|r| r.grid_position), Some(40));
    }
}
