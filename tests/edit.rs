//! Result corrections: editing a confirmed match rolls back the old outcome
//! and applies the new one as a single net update.

use ladder_tournament_web::{
    confirm_match, edit_match, report_match, CompetitionRef, Competitor, CompetitorRef,
    CompetitorType, EngineError, EngineStore, Ladder, LadderId, Side, SideResult,
};

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

fn confirmed_win(
    store: &mut EngineStore,
    ladder_id: LadderId,
    x: CompetitorRef,
    y: CompetitorRef,
) -> ladder_tournament_web::MatchId {
    let id = report_match(
        store,
        CompetitionRef::Ladder(ladder_id),
        x,
        y,
        Side::One,
        SideResult::Won,
        "",
    )
    .unwrap();
    confirm_match(store, id, Side::Two, SideResult::Lost, "").unwrap();
    id
}

#[test]
fn editing_won_to_draw_corrects_points_and_counters() {
    // Scenario: win 3, loss 1, draw 2. X's points drop by 1, Y's rise by 1.
    let (mut store, ladder_id, x, y) = ladder_setup(true);
    let id = confirmed_win(&mut store, ladder_id, x, y);

    edit_match(&mut store, id, SideResult::Draw, "", SideResult::Draw, "").unwrap();

    let sx = store.standing(ladder_id, x.id).unwrap();
    assert_eq!(sx.points, 2);
    assert_eq!((sx.wins, sx.losses, sx.draws), (0, 0, 1));
    let sy = store.standing(ladder_id, y.id).unwrap();
    assert_eq!(sy.points, 2);
    assert_eq!((sy.wins, sy.losses, sy.draws), (0, 0, 1));

    let rx = store.competitor(x.id).unwrap().record;
    assert_eq!((rx.wins, rx.losses, rx.draws), (0, 0, 1));
    let ry = store.competitor(y.id).unwrap().record;
    assert_eq!((ry.wins, ry.losses, ry.draws), (0, 0, 1));
}

#[test]
fn editing_does_not_touch_streaks_or_last_match_date() {
    let (mut store, ladder_id, x, y) = ladder_setup(true);
    let id = confirmed_win(&mut store, ladder_id, x, y);
    let before = store.standing(ladder_id, x.id).unwrap().clone();

    edit_match(&mut store, id, SideResult::Lost, "", SideResult::Won, "").unwrap();

    let after = store.standing(ladder_id, x.id).unwrap();
    assert_eq!(after.streak, before.streak);
    assert_eq!(after.last_match_date, before.last_match_date);
    // Points did move though.
    assert_eq!(after.points, 1);
}

#[test]
fn editing_back_restores_the_original_aggregates() {
    let (mut store, ladder_id, x, y) = ladder_setup(true);
    let id = confirmed_win(&mut store, ladder_id, x, y);
    let before_x = store.standing(ladder_id, x.id).unwrap().clone();
    let before_y = store.standing(ladder_id, y.id).unwrap().clone();

    edit_match(&mut store, id, SideResult::Draw, "", SideResult::Draw, "").unwrap();
    edit_match(&mut store, id, SideResult::Won, "", SideResult::Lost, "").unwrap();

    assert_eq!(store.standing(ladder_id, x.id).unwrap(), &before_x);
    assert_eq!(store.standing(ladder_id, y.id).unwrap(), &before_y);
    assert_eq!(store.competitor(x.id).unwrap().record.wins, 1);
    assert_eq!(store.competitor(y.id).unwrap().record.losses, 1);
}

#[test]
fn comment_only_edits_move_no_stats() {
    let (mut store, ladder_id, x, y) = ladder_setup(true);
    let id = confirmed_win(&mut store, ladder_id, x, y);

    edit_match(
        &mut store,
        id,
        SideResult::Won,
        "clean sweep",
        SideResult::Lost,
        "rematch soon",
    )
    .unwrap();

    let m = store.match_record(id).unwrap();
    assert_eq!(m.one.comment, "clean sweep");
    assert_eq!(m.two.comment, "rematch soon");
    assert_eq!(store.standing(ladder_id, x.id).unwrap().points, 3);
    assert_eq!(store.competitor(x.id).unwrap().record.wins, 1);
}

#[test]
fn only_confirmed_matches_can_be_edited() {
    let (mut store, ladder_id, x, y) = ladder_setup(true);
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
        edit_match(&mut store, id, SideResult::Lost, "", SideResult::Won, ""),
        Err(EngineError::InvalidState(_))
    ));
}

#[test]
fn edits_must_form_a_complementary_pair() {
    let (mut store, ladder_id, x, y) = ladder_setup(true);
    let id = confirmed_win(&mut store, ladder_id, x, y);
    for (one, two) in [
        (SideResult::Won, SideResult::Won),
        (SideResult::Lost, SideResult::Lost),
        (SideResult::Draw, SideResult::Won),
        (SideResult::Unreported, SideResult::Unreported),
    ] {
        assert!(matches!(
            edit_match(&mut store, id, one, "", two, ""),
            Err(EngineError::InvalidResult(_))
        ));
    }
    // Nothing moved.
    assert_eq!(store.standing(ladder_id, x.id).unwrap().points, 3);
}

#[test]
fn edit_fails_whole_when_a_competitor_has_left() {
    let (mut store, ladder_id, x, y) = ladder_setup(true);
    let id = confirmed_win(&mut store, ladder_id, x, y);
    store.leave_ladder(ladder_id, y.id).unwrap();

    assert!(matches!(
        edit_match(&mut store, id, SideResult::Draw, "", SideResult::Draw, ""),
        Err(EngineError::NotFound { .. })
    ));
    // The match and the remaining side's aggregates are untouched.
    let m = store.match_record(id).unwrap();
    assert_eq!(m.one.result, SideResult::Won);
    assert_eq!(store.standing(ladder_id, x.id).unwrap().points, 3);
    assert_eq!(store.standing(ladder_id, x.id).unwrap().wins, 1);
    assert_eq!(store.competitor(x.id).unwrap().record.wins, 1);
    assert_eq!(store.competitor(y.id).unwrap().record.losses, 1);
}

#[test]
fn edit_to_draw_respects_the_ladder_configuration() {
    let (mut store, ladder_id, x, y) = ladder_setup(false);
    let id = confirmed_win(&mut store, ladder_id, x, y);
    assert!(matches!(
        edit_match(&mut store, id, SideResult::Draw, "", SideResult::Draw, ""),
        Err(EngineError::InvalidResult(_))
    ));
}
