//! Match lifecycle: report, confirm, dispute, clear, and delete.
//!
//! Transitions follow scheduled -> reported -> confirmed. Each operation
//! snapshots the match, validates everything that can fail, and only then
//! commits the row and applies the derived stat effects, so a surfaced error
//! leaves the store untouched.

use crate::logic::advancement::{execute_advancement, plan_advancement};
use crate::logic::standings::{career_delta, derive_rollback_delta, derive_standing_delta};
use crate::models::{
    CompetitionRef, CompetitorRef, EngineError, LadderStatus, MatchId, MatchRecord, MatchStatus,
    Side, SideResult, TournamentId, TournamentStatus,
};
use crate::store::EngineStore;
use chrono::Utc;
use serde::{Deserialize, Serialize};

/// What deleting a confirmed ladder match does to previously applied stats.
/// The choice is deliberate configuration, not a silent default; see
/// DESIGN.md.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeletePolicy {
    /// Roll back career and standing deltas before removing the record.
    #[default]
    WithRollback,
    /// Remove the record and leave all aggregates as they are.
    LeaveStats,
}

/// Report a result. For ladders this creates the match record; for
/// tournaments it locates the scheduled spot match pairing the two
/// competitors. The reporter's side is filled in, the other side stays
/// unreported, and status moves to `Reported`.
pub fn report_match(
    store: &mut EngineStore,
    competition: CompetitionRef,
    one: CompetitorRef,
    two: CompetitorRef,
    reporter: Side,
    result: SideResult,
    comment: impl Into<String>,
) -> Result<MatchId, EngineError> {
    if one.id == two.id {
        return Err(EngineError::InvalidState(
            "a competitor cannot play itself".into(),
        ));
    }
    store.competitor(one.id)?;
    store.competitor(two.id)?;
    validate_result(store, competition, result)?;

    let match_id = match competition {
        CompetitionRef::Ladder(ladder_id) => {
            let ladder = store.ladder(ladder_id)?;
            if ladder.status != LadderStatus::Active {
                return Err(EngineError::InvalidState("ladder is not active".into()));
            }
            if one.kind != ladder.competitor_type || two.kind != ladder.competitor_type {
                return Err(EngineError::InvalidState(
                    "competitor type does not match the ladder".into(),
                ));
            }
            // Both competitors must hold a standing before results count.
            store.standing(ladder_id, one.id)?;
            store.standing(ladder_id, two.id)?;
            store.insert_match(MatchRecord::new_ladder(ladder_id, one, two))
        }
        CompetitionRef::Tournament(tournament_id) => {
            let tournament = store.tournament(tournament_id)?;
            if tournament.status != TournamentStatus::InProgress {
                return Err(EngineError::InvalidState(
                    "tournament is not in progress".into(),
                ));
            }
            store
                .find_scheduled_pairing(tournament_id, one.id, two.id)
                .ok_or(EngineError::NotFound {
                    entity: "scheduled tournament match",
                    id: tournament_id,
                })?
        }
    };

    let snapshot = store.match_record(match_id)?.clone();
    if !snapshot.is_playable() {
        return Err(EngineError::InvalidState(
            "both competitor slots must be filled before a result can be reported".into(),
        ));
    }
    if snapshot.status != MatchStatus::Scheduled {
        return Err(EngineError::InvalidState(format!(
            "cannot report a match in {:?} status",
            snapshot.status
        )));
    }
    // `reporter` names a side of the (one, two) arguments. A located
    // tournament match may store the pairing in the opposite order, so the
    // result is written to the side the reporting competitor actually
    // occupies.
    let reporting = match reporter {
        Side::One => one,
        Side::Two => two,
    };
    let stored_side = snapshot
        .competitor_side(reporting.id)
        .ok_or_else(|| EngineError::InvalidState(
            "reporting competitor does not occupy this match".into(),
        ))?;

    let mut updated = snapshot.clone();
    let side = updated.side_mut(stored_side);
    side.result = result;
    side.comment = comment.into();
    updated.status = MatchStatus::Reported;
    store.commit_match(match_id, snapshot.version, updated)?;
    Ok(match_id)
}

/// A reported result must be an actual outcome, and draws are only allowed
/// on ladders configured for them. Tournaments always need a winner.
fn validate_result(
    store: &EngineStore,
    competition: CompetitionRef,
    result: SideResult,
) -> Result<(), EngineError> {
    match result {
        SideResult::Unreported => Err(EngineError::InvalidResult(
            "a result must be supplied when reporting".into(),
        )),
        SideResult::Draw => match competition {
            CompetitionRef::Ladder(ladder_id) => {
                if store.ladder(ladder_id)?.uses_draws {
                    Ok(())
                } else {
                    Err(EngineError::InvalidResult(
                        "this ladder does not allow draws".into(),
                    ))
                }
            }
            CompetitionRef::Tournament(_) => Err(EngineError::InvalidResult(
                "tournament matches cannot end in a draw".into(),
            )),
        },
        SideResult::Won | SideResult::Lost => Ok(()),
    }
}

/// Confirm a reported match. The confirmer must be the side that has not
/// reported; the complementary result is derived server-side from the
/// reported side, and a supplied result that contradicts it is rejected
/// rather than trusted. Confirmation applies career counters, the ladder
/// standing update, and (for tournaments) bracket advancement, all within
/// the same store borrow.
pub fn confirm_match(
    store: &mut EngineStore,
    match_id: MatchId,
    confirmer: Side,
    result: SideResult,
    comment: impl Into<String>,
) -> Result<(), EngineError> {
    let snapshot = store.match_record(match_id)?.clone();
    if snapshot.status != MatchStatus::Reported {
        return Err(EngineError::InvalidState(format!(
            "only a reported match can be confirmed (status is {:?})",
            snapshot.status
        )));
    }
    if snapshot.side(confirmer).result != SideResult::Unreported {
        return Err(EngineError::InvalidState(
            "the reporting side cannot confirm its own match".into(),
        ));
    }
    let derived = snapshot.side(confirmer.other()).result.complement();
    if derived == SideResult::Unreported {
        return Err(EngineError::InvalidState(
            "no reported result to confirm against".into(),
        ));
    }
    if result != derived {
        return Err(EngineError::InvalidResult(format!(
            "confirmed result must complement the reported result (expected {derived:?})"
        )));
    }

    // The confirmation time feeds the standing's last-match date only; the
    // match keeps its own date.
    let confirmed_at = Utc::now();
    let mut updated = snapshot.clone();
    let side = updated.side_mut(confirmer);
    side.result = derived;
    side.comment = comment.into();
    updated.status = MatchStatus::Confirmed;

    let one = populated(&updated, Side::One)?;
    let two = populated(&updated, Side::Two)?;

    // Validate every effect before the row is committed so a failure cannot
    // strand a confirmed match with half-applied stats.
    let advancement = match updated.competition {
        CompetitionRef::Ladder(ladder_id) => {
            store.standing(ladder_id, one.id)?;
            store.standing(ladder_id, two.id)?;
            None
        }
        CompetitionRef::Tournament(_) => {
            let winner = updated.winner().ok_or_else(|| {
                EngineError::InvalidResult("a tournament match must have a winner".into())
            })?;
            Some(plan_advancement(store, &updated, winner)?)
        }
    };

    store.commit_match(match_id, snapshot.version, updated.clone())?;

    store.apply_career_delta(one.id, career_delta(updated.one.result))?;
    store.apply_career_delta(two.id, career_delta(updated.two.result))?;

    match updated.competition {
        CompetitionRef::Ladder(ladder_id) => {
            let ladder = store.ladder(ladder_id)?.clone();
            for side in [Side::One, Side::Two] {
                let competitor = populated(&updated, side)?;
                let delta = derive_standing_delta(&ladder, updated.side(side).result, confirmed_at)?;
                store.apply_standing_delta(ladder_id, competitor.id, &delta)?;
            }
        }
        CompetitionRef::Tournament(tournament_id) => {
            if let Some((winner, plan)) = updated.winner().zip(advancement) {
                execute_advancement(store, tournament_id, winner, plan)?;
            }
        }
    }
    Ok(())
}

/// Flag a reported or confirmed match as disputed. Status is unchanged; an
/// administrator resolves the dispute through clear/edit.
pub fn dispute_match(store: &mut EngineStore, match_id: MatchId) -> Result<(), EngineError> {
    let snapshot = store.match_record(match_id)?.clone();
    if !matches!(
        snapshot.status,
        MatchStatus::Reported | MatchStatus::Confirmed
    ) {
        return Err(EngineError::InvalidState(
            "only a reported or confirmed match can be disputed".into(),
        ));
    }
    let mut updated = snapshot.clone();
    updated.disputed = true;
    store.commit_match(match_id, snapshot.version, updated)?;
    log::warn!("match {match_id} flagged as disputed; administrator review required");
    Ok(())
}

/// Administrative reset: both sides' result and comment are emptied, the
/// disputed flag drops, and status returns to `Scheduled`. Clearing a
/// confirmed match first rolls back its career and standing deltas so
/// aggregates keep matching the set of confirmed results. Competitor slots
/// are kept; for tournaments this is how a spot is made re-playable before
/// re-advancing.
pub fn clear_match(store: &mut EngineStore, match_id: MatchId) -> Result<(), EngineError> {
    let snapshot = store.match_record(match_id)?.clone();
    if snapshot.status == MatchStatus::Confirmed {
        roll_back_confirmed(store, &snapshot)?;
        reopen_if_final(store, &snapshot)?;
    }
    let mut updated = snapshot.clone();
    for side in [Side::One, Side::Two] {
        let s = updated.side_mut(side);
        s.result = SideResult::Unreported;
        s.comment.clear();
    }
    updated.status = MatchStatus::Scheduled;
    updated.disputed = false;
    store.commit_match(match_id, snapshot.version, updated)
}

/// Delete a ladder match. Tournament matches are cleared, never deleted, so
/// the bracket structure survives.
pub fn delete_match(
    store: &mut EngineStore,
    match_id: MatchId,
    policy: DeletePolicy,
) -> Result<(), EngineError> {
    let snapshot = store.match_record(match_id)?.clone();
    if !matches!(snapshot.competition, CompetitionRef::Ladder(_)) {
        return Err(EngineError::InvalidState(
            "tournament matches are cleared, not deleted".into(),
        ));
    }
    if snapshot.status == MatchStatus::Confirmed && policy == DeletePolicy::WithRollback {
        roll_back_confirmed(store, &snapshot)?;
    }
    store.remove_match(match_id)?;
    Ok(())
}

/// Inverse career and standing deltas for a confirmed match. Streaks and
/// last-match dates stay as they are; they cannot be rebuilt without the
/// full match history. Both sides' rows are validated up front: if a
/// competitor has since left the ladder the rollback fails whole, with no
/// delta applied to either side.
pub(crate) fn roll_back_confirmed(
    store: &mut EngineStore,
    record: &MatchRecord,
) -> Result<(), EngineError> {
    let one = populated(record, Side::One)?;
    let two = populated(record, Side::Two)?;
    store.competitor(one.id)?;
    store.competitor(two.id)?;
    if let CompetitionRef::Ladder(ladder_id) = record.competition {
        store.standing(ladder_id, one.id)?;
        store.standing(ladder_id, two.id)?;
    }
    for side in [Side::One, Side::Two] {
        let competitor = populated(record, side)?;
        let result = record.side(side).result;
        store.apply_career_delta(competitor.id, career_delta(result).inverse())?;
        if let CompetitionRef::Ladder(ladder_id) = record.competition {
            let ladder = store.ladder(ladder_id)?.clone();
            let delta = derive_rollback_delta(&ladder, result)?;
            store.apply_standing_delta(ladder_id, competitor.id, &delta)?;
        }
    }
    Ok(())
}

/// Clearing the final spot of a completed tournament reopens it.
fn reopen_if_final(store: &mut EngineStore, record: &MatchRecord) -> Result<(), EngineError> {
    let CompetitionRef::Tournament(tournament_id) = record.competition else {
        return Ok(());
    };
    reopen_tournament(store, tournament_id, record.spot)
}

fn reopen_tournament(
    store: &mut EngineStore,
    tournament_id: TournamentId,
    spot: Option<u32>,
) -> Result<(), EngineError> {
    let tournament = store.tournament(tournament_id)?;
    if tournament.status == TournamentStatus::Complete
        && spot == Some(tournament.bracket_size.total_spots())
    {
        store.set_tournament_status(tournament_id, TournamentStatus::InProgress)?;
    }
    Ok(())
}

pub(crate) fn populated(record: &MatchRecord, side: Side) -> Result<CompetitorRef, EngineError> {
    record
        .side(side)
        .competitor
        .ok_or_else(|| EngineError::InvalidState("match is not fully populated".into()))
}
