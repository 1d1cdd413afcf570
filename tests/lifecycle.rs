//! Match lifecycle: report, confirm, dispute, clear, and delete.

use ladder_tournament_web::{
    clear_match, confirm_match, delete_match, dispute_match, initialize_tournament, report_match,
    BracketSize, CompetitionRef, Competitor, CompetitorRef, CompetitorType, DeletePolicy,
    EngineError, EngineStore, Ladder, LadderId, MatchStatus, Side, SideResult, Tournament,
};
use uuid::Uuid;

fn ladder_setup(uses_draws: bool) -> (EngineStore, LadderId, CompetitorRef, CompetitorRef) {
    let mut store = EngineStore::new();
    let x = Competitor::new("X", CompetitorType::Player);
    let y = Competitor::new("Y", CompetitorType::Player);
    let (xr, yr) = (x.reference(), y.reference());
    store.insert_competitor(x);
    store.insert_competitor(y);
    let ladder_id = store.insert_ladder(Ladder::new(CompetitorType::Player, 3, 1, 2, uses_draws));
    store.join_ladder(ladder_id, xr).unwrap();
    store.join_ladder(ladder_id, yr).unwrap();
    (store, ladder_id, xr, yr)
}

#[test]
fn report_then_confirm_produces_complementary_results() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "gg",
    )
    .unwrap();
    assert_eq!(store.match_record(id).unwrap().status, MatchStatus::Reported);
    assert_eq!(
        store.match_record(id).unwrap().two.result,
        SideResult::Unreported
    );

    confirm_match(&mut store, id, Side::Two, SideResult::Lost, "").unwrap();
    let m = store.match_record(id).unwrap();
    assert_eq!(m.status, MatchStatus::Confirmed);
    assert_eq!((m.one.result, m.two.result), (SideResult::Won, SideResult::Lost));
}

#[test]
fn draw_is_rejected_when_ladder_disables_draws() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    assert!(matches!(
        report_match(
            &mut store,
            CompetitionRef::Ladder(ladder_id),
            x,
            y,
            Side::One,
            SideResult::Draw,
            "",
        ),
        Err(EngineError::InvalidResult(_))
    ));
}

#[test]
fn confirming_a_scheduled_match_is_invalid() {
    // Tournament spot matches start out scheduled.
    let mut store = EngineStore::new();
    let mut refs = Vec::new();
    for i in 0..4 {
        let c = Competitor::new(format!("P{i}"), CompetitorType::Player);
        refs.push(c.reference());
        store.insert_competitor(c);
    }
    let t = Tournament::new(CompetitorType::Player, BracketSize::new(4).unwrap());
    let tid = store.insert_tournament(t);
    for r in &refs {
        store.register_entrant(tid, *r).unwrap();
    }
    initialize_tournament(&mut store, tid).unwrap();
    let spot1 = store.find_spot_match(tid, 1).unwrap();
    assert!(matches!(
        confirm_match(&mut store, spot1, Side::Two, SideResult::Lost, ""),
        Err(EngineError::InvalidState(_))
    ));
}

#[test]
fn the_reporting_side_cannot_confirm() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    assert!(matches!(
        confirm_match(&mut store, id, Side::One, SideResult::Won, ""),
        Err(EngineError::InvalidState(_))
    ));
}

#[test]
fn confirmation_must_complement_the_reported_result() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    assert!(matches!(
        confirm_match(&mut store, id, Side::Two, SideResult::Won, ""),
        Err(EngineError::InvalidResult(_))
    ));
    // The failed confirmation changed nothing.
    assert_eq!(store.match_record(id).unwrap().status, MatchStatus::Reported);
    assert_eq!(store.standing(ladder_id, x.id).unwrap().points, 0);
}

#[test]
fn dispute_flags_without_changing_status() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    dispute_match(&mut store, id).unwrap();
    let m = store.match_record(id).unwrap();
    assert!(m.disputed);
    assert_eq!(m.status, MatchStatus::Reported);

    confirm_match(&mut store, id, Side::Two, SideResult::Lost, "").unwrap();
    dispute_match(&mut store, id).unwrap();
    assert_eq!(store.match_record(id).unwrap().status, MatchStatus::Confirmed);
}

#[test]
fn clear_rolls_back_a_confirmed_match() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    confirm_match(&mut store, id, Side::Two, SideResult::Lost, "").unwrap();
    assert_eq!(store.standing(ladder_id, x.id).unwrap().points, 3);
    assert_eq!(store.competitor(x.id).unwrap().record.wins, 1);

    clear_match(&mut store, id).unwrap();
    let m = store.match_record(id).unwrap();
    assert_eq!(m.status, MatchStatus::Scheduled);
    assert_eq!(m.one.result, SideResult::Unreported);
    assert_eq!(m.two.result, SideResult::Unreported);
    assert!(!m.disputed);
    // Aggregates match the (now empty) set of confirmed results again.
    assert_eq!(store.standing(ladder_id, x.id).unwrap().points, 0);
    assert_eq!(store.standing(ladder_id, x.id).unwrap().wins, 0);
    assert_eq!(store.standing(ladder_id, y.id).unwrap().points, 0);
    assert_eq!(store.competitor(x.id).unwrap().record.wins, 0);
    assert_eq!(store.competitor(y.id).unwrap().record.losses, 0);
}

#[test]
fn confirmation_keeps_the_match_date() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    let reported_date = store.match_record(id).unwrap().match_date;
    confirm_match(&mut store, id, Side::Two, SideResult::Lost, "").unwrap();
    assert_eq!(store.match_record(id).unwrap().match_date, reported_date);
    // The confirmation time lands on the standing, not the match.
    let last = store.standing(ladder_id, x.id).unwrap().last_match_date;
    assert!(last.is_some());
}

#[test]
fn clearing_fails_whole_when_a_competitor_has_left() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    confirm_match(&mut store, id, Side::Two, SideResult::Lost, "").unwrap();
    store.leave_ladder(ladder_id, y.id).unwrap();

    assert!(matches!(
        clear_match(&mut store, id),
        Err(EngineError::NotFound { .. })
    ));
    // Nothing moved: the match is still confirmed and the remaining side's
    // aggregates still match it.
    assert_eq!(store.match_record(id).unwrap().status, MatchStatus::Confirmed);
    assert_eq!(store.standing(ladder_id, x.id).unwrap().wins, 1);
    assert_eq!(store.standing(ladder_id, x.id).unwrap().points, 3);
    assert_eq!(store.competitor(x.id).unwrap().record.wins, 1);
    assert_eq!(store.competitor(y.id).unwrap().record.losses, 1);
}

#[test]
fn delete_after_a_competitor_left_requires_leave_stats() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    confirm_match(&mut store, id, Side::Two, SideResult::Lost, "").unwrap();
    store.leave_ladder(ladder_id, y.id).unwrap();

    assert!(matches!(
        delete_match(&mut store, id, DeletePolicy::WithRollback),
        Err(EngineError::NotFound { .. })
    ));
    assert_eq!(store.match_record(id).unwrap().status, MatchStatus::Confirmed);
    assert_eq!(store.standing(ladder_id, x.id).unwrap().wins, 1);

    delete_match(&mut store, id, DeletePolicy::LeaveStats).unwrap();
    assert!(store.match_record(id).is_err());
    assert_eq!(store.standing(ladder_id, x.id).unwrap().wins, 1);
}

#[test]
fn delete_with_rollback_reverts_stats() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    confirm_match(&mut store, id, Side::Two, SideResult::Lost, "").unwrap();
    delete_match(&mut store, id, DeletePolicy::WithRollback).unwrap();
    assert!(matches!(
        store.match_record(id),
        Err(EngineError::NotFound { .. })
    ));
    assert_eq!(store.standing(ladder_id, x.id).unwrap().points, 0);
    assert_eq!(store.competitor(x.id).unwrap().record.wins, 0);
}

#[test]
fn delete_leave_stats_keeps_aggregates() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    confirm_match(&mut store, id, Side::Two, SideResult::Lost, "").unwrap();
    delete_match(&mut store, id, DeletePolicy::LeaveStats).unwrap();
    assert_eq!(store.standing(ladder_id, x.id).unwrap().points, 3);
    assert_eq!(store.competitor(x.id).unwrap().record.wins, 1);
}

#[test]
fn tournament_matches_cannot_be_deleted() {
    let mut store = EngineStore::new();
    let mut refs = Vec::new();
    for i in 0..4 {
        let c = Competitor::new(format!("P{i}"), CompetitorType::Player);
        refs.push(c.reference());
        store.insert_competitor(c);
    }
    let tid = store.insert_tournament(Tournament::new(
        CompetitorType::Player,
        BracketSize::new(4).unwrap(),
    ));
    for r in &refs {
        store.register_entrant(tid, *r).unwrap();
    }
    initialize_tournament(&mut store, tid).unwrap();
    let spot1 = store.find_spot_match(tid, 1).unwrap();
    assert!(matches!(
        delete_match(&mut store, spot1, DeletePolicy::WithRollback),
        Err(EngineError::InvalidState(_))
    ));
}

#[test]
fn stale_snapshot_commit_is_a_concurrency_conflict() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = report_match(
        &mut store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    let stale = store.match_record(id).unwrap().clone();
    // Someone else mutates the row; the stale snapshot's version is now old.
    dispute_match(&mut store, id).unwrap();
    assert!(matches!(
        store.commit_match(id, stale.version, stale.clone()),
        Err(EngineError::ConcurrencyConflict(_))
    ));
}

#[test]
fn reporting_references_must_exist() {
    let (mut store, ladder_id, x, _) = ladder_setup(false);
    let ghost = CompetitorRef {
        id: Uuid::new_v4(),
        kind: CompetitorType::Player,
    };
    assert!(matches!(
        report_match(
            &mut store,
            CompetitionRef::Ladder(ladder_id),
            x,
            ghost,
            Side::One,
            SideResult::Won,
            "",
        ),
        Err(EngineError::NotFound { .. })
    ));
}
