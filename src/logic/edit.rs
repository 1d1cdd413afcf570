//! Correction of already-confirmed results: rollback the old outcome and
//! apply the new one as a single net update per competitor, so aggregates
//! can never drift from the set of confirmed results.

use crate::logic::lifecycle::populated;
use crate::logic::standings::{career_delta, derive_correction_delta};
use crate::models::{CompetitionRef, EngineError, MatchId, MatchStatus, Side, SideResult};
use crate::store::EngineStore;

/// Edit a confirmed match's results and comments (administrative path).
///
/// The new pair must be complementary and permitted by the competition
/// configuration. Career counters and ladder points/counters are corrected;
/// streaks and last-match dates are left alone since an exact rebuild would
/// need the full match history.
pub fn edit_match(
    store: &mut EngineStore,
    match_id: MatchId,
    new_one_result: SideResult,
    new_one_comment: impl Into<String>,
    new_two_result: SideResult,
    new_two_comment: impl Into<String>,
) -> Result<(), EngineError> {
    let snapshot = store.match_record(match_id)?.clone();
    if snapshot.status != MatchStatus::Confirmed {
        return Err(EngineError::InvalidState(
            "only a confirmed match can be edited".into(),
        ));
    }
    if new_one_result == SideResult::Unreported || new_two_result != new_one_result.complement() {
        return Err(EngineError::InvalidResult(
            "edited results must form a complementary pair".into(),
        ));
    }
    match snapshot.competition {
        CompetitionRef::Ladder(ladder_id) => {
            let ladder = store.ladder(ladder_id)?;
            if new_one_result == SideResult::Draw && !ladder.uses_draws {
                return Err(EngineError::InvalidResult(
                    "draws are not enabled on this ladder".into(),
                ));
            }
        }
        CompetitionRef::Tournament(_) => {
            if new_one_result == SideResult::Draw {
                return Err(EngineError::InvalidResult(
                    "tournaments do not allow draws".into(),
                ));
            }
        }
    }

    // Every row the correction will touch must exist before anything is
    // written; a competitor who has left the ladder fails the edit whole.
    let one = populated(&snapshot, Side::One)?;
    let two = populated(&snapshot, Side::Two)?;
    store.competitor(one.id)?;
    store.competitor(two.id)?;
    if let CompetitionRef::Ladder(ladder_id) = snapshot.competition {
        store.standing(ladder_id, one.id)?;
        store.standing(ladder_id, two.id)?;
    }

    // The pre-edit result. two_result is always its complement, so one value
    // determines both rollback deltas.
    let old_one_result = snapshot.one.result;

    let mut updated = snapshot.clone();
    updated.one.result = new_one_result;
    updated.one.comment = new_one_comment.into();
    updated.two.result = new_two_result;
    updated.two.comment = new_two_comment.into();
    store.commit_match(match_id, snapshot.version, updated.clone())?;

    if old_one_result == new_one_result {
        // Comments only; no stat movement.
        return Ok(());
    }

    let corrections = [
        (Side::One, old_one_result, new_one_result),
        (Side::Two, old_one_result.complement(), new_two_result),
    ];
    for (side, old, new) in corrections {
        let competitor = populated(&updated, side)?;
        let net = career_delta(old).inverse().combine(career_delta(new));
        if !net.is_zero() {
            store.apply_career_delta(competitor.id, net)?;
        }
        if let CompetitionRef::Ladder(ladder_id) = updated.competition {
            let ladder = store.ladder(ladder_id)?.clone();
            let delta = derive_correction_delta(&ladder, old, new)?;
            store.apply_standing_delta(ladder_id, competitor.id, &delta)?;
        }
    }
    Ok(())
}
