use super::*;
use std::collections::BTreeMap;

fn test_payouts() -> PayoutTable {
    PayoutTable::from_amounts([25, 50, 100, 200, 400, 1_000]).expect("valid table")
}

#[test]
fn test_grid_position_decomposition() {
    assert_eq!(row_of(48), 4);
    assert_eq!(col_of(48), 8);
    assert_eq!(grid_position(4, 8), 48);
    assert_eq!(grid_position(0, 0), 0);
    assert_eq!(grid_position(9, 9), 99);
    assert!(is_valid_position(99));
    assert!(!is_valid_position(GRID_CELLS));
}

#[test]
fn test_round_order_and_numbers() {
    for (i, round) in Round::ALL.iter().enumerate() {
        assert_eq!(round.number() as usize, i + 1);
        assert_eq!(Round::from_number(round.number()), Some(*round));
    }
    assert_eq!(Round::from_number(0), None);
    assert_eq!(Round::from_number(7), None);
    assert!(Round::FirstRound < Round::SecondRound);
    assert!(Round::FinalFour < Round::Championship);
    assert_eq!(Round::EliteEight.next(), Some(Round::FinalFour));
    assert_eq!(Round::Championship.next(), None);
}

#[test]
fn test_expected_games_cover_bracket() {
    let total: u32 = Round::ALL.iter().map(|r| r.expected_games()).sum();
    assert_eq!(total, BRACKET_GAMES);
}

#[test]
fn test_round_stats_record() {
    let mut stats = RoundStats::default();
    assert!(!stats.is_complete());
    assert!(!stats.has_started());

    stats.record(GameStatus::Scheduled);
    stats.record(GameStatus::InProgress);
    assert!(stats.has_started());
    assert!(!stats.is_complete());

    let mut done = RoundStats::default();
    done.record(GameStatus::Completed);
    done.record(GameStatus::Completed);
    assert!(done.is_complete());
    assert_eq!(
        done,
        RoundStats {
            total: 2,
            completed: 2,
            in_progress: 0,
            scheduled: 0
        }
    );
}

#[test]
fn test_payout_lookup_by_round() {
    let payouts = test_payouts();
    assert_eq!(payouts.payout_for(Round::FirstRound), 25);
    assert_eq!(payouts.payout_for(Round::SweetSixteen), 100);
    assert_eq!(payouts.payout_for(Round::Championship), 1_000);
}

#[test]
fn test_payout_total_liability() {
    // 32*25 + 16*50 + 8*100 + 4*200 + 2*400 + 1*1000
    assert_eq!(test_payouts().total(), 5_000);
}

#[test]
fn test_payout_table_rejects_missing_round() {
    let mut amounts: BTreeMap<Round, u64> = Round::ALL.iter().map(|r| (*r, 10)).collect();
    amounts.remove(&Round::FinalFour);
    assert_eq!(
        PayoutTable::new(amounts),
        Err(PayoutTableError::MissingRound(Round::FinalFour))
    );
}

#[test]
fn test_payout_table_rejects_zero() {
    assert_eq!(
        PayoutTable::from_amounts([25, 0, 100, 200, 400, 1_000]),
        Err(PayoutTableError::ZeroPayout(Round::SecondRound))
    );
}

#[test]
fn test_payout_table_json_is_validated() {
    let json = r#"{"first_round":25,"second_round":50,"sweet_sixteen":100,"elite_eight":200,"final_four":400,"championship":1000}"#;
    let table: PayoutTable = serde_json::from_str(json).unwrap();
    assert_eq!(table, test_payouts());

    let missing = r#"{"first_round":25}"#;
    assert!(serde_json::from_str::<PayoutTable>(missing).is_err());
}

#[test]
fn test_game_json_shape() {
    let json = r#"{"id":"g1","round":"second_round","team1":"Duke","team2":"UNC","team1Score":78,"team2Score":74,"status":"completed"}"#;
    let game: Game = serde_json::from_str(json).unwrap();
    assert_eq!(game.round, Round::SecondRound);
    assert_eq!(game.score(TeamSlot::Team1), Some(78));
    assert_eq!(game.score(TeamSlot::Team2), Some(74));
    assert!(game.is_completed());

    // Missing scores and status fall back to an unscored, scheduled game.
    let bare: Game = serde_json::from_str(r#"{"id":"g2","round":"first_round"}"#).unwrap();
    assert_eq!(bare.status, GameStatus::Scheduled);
    assert_eq!(bare.team1_score, None);
}

#[test]
fn test_square_json_shape() {
    let json = r#"{"id":"sq-1","userId":"u-1","claimOrder":3,"paymentStatus":"paid"}"#;
    let square: Square = serde_json::from_str(json).unwrap();
    assert_eq!(square.claim_order, 3);
    assert_eq!(square.payment_status.as_deref(), Some("paid"));

    let assignment = Assignment::new(
        "sq-1",
        Placement {
            grid_position: 48,
            winning_team_number: 7,
            losing_team_number: 2,
        },
    );
    assert_eq!(assignment.row(), 4);
    assert_eq!(assignment.col(), 8);
    let encoded = serde_json::to_value(&assignment).unwrap();
    assert_eq!(encoded["squareId"], "sq-1");
    assert_eq!(encoded["gridPosition"], 48);
    assert_eq!(encoded["winningTeamNumber"], 7);
    assert_eq!(encoded["losingTeamNumber"], 2);
}
