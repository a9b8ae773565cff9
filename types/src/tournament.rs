//! Tournament bracket types: rounds, games, and per-round progress counts.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A stage of the bracket. Declaration order is bracket order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Round {
    FirstRound,
    SecondRound,
    SweetSixteen,
    EliteEight,
    FinalFour,
    Championship,
}

impl Round {
    /// Every round in bracket order.
    pub const ALL: [Round; 6] = [
        Round::FirstRound,
        Round::SecondRound,
        Round::SweetSixteen,
        Round::EliteEight,
        Round::FinalFour,
        Round::Championship,
    ];

    /// 1-based position in the bracket.
    pub fn number(self) -> u8 {
        match self {
            Round::FirstRound => 1,
            Round::SecondRound => 2,
            Round::SweetSixteen => 3,
            Round::EliteEight => 4,
            Round::FinalFour => 5,
            Round::Championship => 6,
        }
    }

    pub fn from_number(number: u8) -> Option<Self> {
        Self::ALL.get(usize::from(number).checked_sub(1)?).copied()
    }

    /// Games a fully seeded bracket plays in this round.
    pub fn expected_games(self) -> u32 {
        match self {
            Round::FirstRound => 32,
            Round::SecondRound => 16,
            Round::SweetSixteen => 8,
            Round::EliteEight => 4,
            Round::FinalFour => 2,
            Round::Championship => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Round::FirstRound => "First Round",
            Round::SecondRound => "Second Round",
            Round::SweetSixteen => "Sweet 16",
            Round::EliteEight => "Elite 8",
            Round::FinalFour => "Final Four",
            Round::Championship => "Championship",
        }
    }

    pub fn next(self) -> Option<Self> {
        Self::from_number(self.number() + 1)
    }

    pub fn is_last(self) -> bool {
        self == Round::Championship
    }
}

impl fmt::Display for Round {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    #[default]
    Scheduled,
    InProgress,
    Completed,
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameStatus::Scheduled => f.write_str("scheduled"),
            GameStatus::InProgress => f.write_str("in_progress"),
            GameStatus::Completed => f.write_str("completed"),
        }
    }
}

/// One side of a matchup.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TeamSlot {
    Team1,
    Team2,
}

impl fmt::Display for TeamSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TeamSlot::Team1 => f.write_str("team1"),
            TeamSlot::Team2 => f.write_str("team2"),
        }
    }
}

/// A bracket matchup.
///
/// Scores stay `None` until the scoring feed reports a numeric value.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    #[serde(default)]
    pub id: String,
    pub round: Round,
    #[serde(default)]
    pub team1: String,
    #[serde(default)]
    pub team2: String,
    #[serde(default)]
    pub team1_score: Option<i64>,
    #[serde(default)]
    pub team2_score: Option<i64>,
    #[serde(default)]
    pub status: GameStatus,
}

impl Game {
    pub fn new(id: impl Into<String>, round: Round) -> Self {
        Self {
            id: id.into(),
            round,
            team1: String::new(),
            team2: String::new(),
            team1_score: None,
            team2_score: None,
            status: GameStatus::Scheduled,
        }
    }

    /// Marks the game completed with a final score.
    pub fn completed(mut self, team1_score: i64, team2_score: i64) -> Self {
        self.team1_score = Some(team1_score);
        self.team2_score = Some(team2_score);
        self.status = GameStatus::Completed;
        self
    }

    pub fn with_status(mut self, status: GameStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_teams(mut self, team1: impl Into<String>, team2: impl Into<String>) -> Self {
        self.team1 = team1.into();
        self.team2 = team2.into();
        self
    }

    pub fn score(&self, slot: TeamSlot) -> Option<i64> {
        match slot {
            TeamSlot::Team1 => self.team1_score,
            TeamSlot::Team2 => self.team2_score,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == GameStatus::Completed
    }
}

/// Game counts for one round, derived from the board's games.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStats {
    pub total: u32,
    pub completed: u32,
    pub in_progress: u32,
    pub scheduled: u32,
}

impl RoundStats {
    pub fn record(&mut self, status: GameStatus) {
        self.total += 1;
        match status {
            GameStatus::Scheduled => self.scheduled += 1,
            GameStatus::InProgress => self.in_progress += 1,
            GameStatus::Completed => self.completed += 1,
        }
    }

    /// True once the round has games and all of them are final.
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    /// True if any game is under way or final.
    pub fn has_started(&self) -> bool {
        self.in_progress > 0 || self.completed > 0
    }
}
