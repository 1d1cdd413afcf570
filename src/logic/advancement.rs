//! Tournament bracket: initialization, winner advancement, and competitor
//! replacement.

use crate::logic::bracket::{parent_spot, round_of_spot, spot_range, spots_in_round};
use crate::models::{
    CompetitionRef, CompetitorId, CompetitorRef, EngineError, MatchId, MatchRecord, MatchStatus,
    Side, TournamentId, TournamentStatus,
};
use crate::store::EngineStore;

/// Where a confirmed match's winner goes, computed before any write so a
/// conflicting advancement can be rejected without touching the bracket.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Advancement {
    /// The final spot: the tournament is decided.
    Final,
    /// Fill `side` of the parent `spot`.
    Parent { spot: u32, side: Side },
}

/// Create the `size - 1` scheduled spot records and seed the registered
/// entrants, in seed order, into round 1. All later spots stay empty pending
/// advancement.
pub fn initialize_tournament(
    store: &mut EngineStore,
    tournament_id: TournamentId,
) -> Result<(), EngineError> {
    let tournament = store.tournament(tournament_id)?.clone();
    if !matches!(
        tournament.status,
        TournamentStatus::Created | TournamentStatus::Open
    ) {
        return Err(EngineError::InvalidState(
            "tournament bracket is already initialized".into(),
        ));
    }
    if tournament.entrants.len() < 2 {
        return Err(EngineError::InvalidState(
            "at least two entrants are required".into(),
        ));
    }

    let size = tournament.bracket_size;
    for spot in 1..=size.total_spots() {
        let mut record = MatchRecord::new_tournament_spot(tournament_id, spot);
        if spot <= spots_in_round(size, 1) {
            let seed = ((spot - 1) * 2) as usize;
            record.one.competitor = tournament.entrants.get(seed).copied();
            record.two.competitor = tournament.entrants.get(seed + 1).copied();
        }
        store.insert_match(record);
    }
    store.set_tournament_status(tournament_id, TournamentStatus::InProgress)?;
    log::info!(
        "initialized tournament {tournament_id}: {} spots, {} entrants",
        size.total_spots(),
        tournament.entrants.len()
    );
    Ok(())
}

/// Write a confirmed match's winner into its parent spot (administrative
/// entry point; confirmation advances through the same plan/execute pair).
/// The winner must be one of the match's competitors. Advancing the final
/// spot completes the tournament.
pub fn advance_match(
    store: &mut EngineStore,
    match_id: MatchId,
    winner_competitor_id: CompetitorId,
) -> Result<(), EngineError> {
    let record = store.match_record(match_id)?.clone();
    if record.status != MatchStatus::Confirmed {
        return Err(EngineError::InvalidState(
            "only a confirmed match can advance its winner".into(),
        ));
    }
    let side = record
        .competitor_side(winner_competitor_id)
        .ok_or_else(|| integrity("winner is not a competitor of this match"))?;
    let winner = record.side(side).competitor.ok_or_else(|| {
        integrity("winner is not a competitor of this match")
    })?;
    let tournament_id = tournament_of(&record)?;
    let plan = plan_advancement(store, &record, winner)?;
    execute_advancement(store, tournament_id, winner, plan)
}

/// Administrative override: swap a competitor at a spot for another
/// registered entrant that does not already occupy a spot in the same round
/// (an entity must never face itself).
pub fn replace_competitor(
    store: &mut EngineStore,
    tournament_id: TournamentId,
    match_id: MatchId,
    old_competitor_id: CompetitorId,
    new_competitor_id: CompetitorId,
) -> Result<(), EngineError> {
    let tournament = store.tournament(tournament_id)?.clone();
    let snapshot = store.match_record(match_id)?.clone();
    if snapshot.competition != CompetitionRef::Tournament(tournament_id) {
        return Err(EngineError::NotFound {
            entity: "match",
            id: match_id,
        });
    }
    let replacement = tournament
        .entrants
        .iter()
        .copied()
        .find(|e| e.id == new_competitor_id)
        .ok_or_else(|| integrity("replacement competitor is not a registered entrant"))?;
    let side = snapshot
        .competitor_side(old_competitor_id)
        .ok_or_else(|| integrity("competitor to replace does not occupy this match"))?;

    let spot = snapshot
        .spot
        .ok_or_else(|| integrity("tournament match has no spot"))?;
    let round = round_of_spot(tournament.bracket_size, spot)?;
    let (first, last) = spot_range(tournament.bracket_size, round);
    for sibling in first..=last {
        if let Some(id) = store.find_spot_match(tournament_id, sibling) {
            if store
                .match_record(id)?
                .competitor_side(new_competitor_id)
                .is_some()
            {
                return Err(integrity(format!(
                    "competitor already occupies spot {sibling} in round {round}"
                )));
            }
        }
    }

    let mut updated = snapshot.clone();
    updated.side_mut(side).competitor = Some(replacement);
    store.commit_match(match_id, snapshot.version, updated)
}

/// Compute the advancement target and reject conflicts without writing.
pub(crate) fn plan_advancement(
    store: &EngineStore,
    record: &MatchRecord,
    winner: CompetitorRef,
) -> Result<Advancement, EngineError> {
    let tournament_id = tournament_of(record)?;
    if record.competitor_side(winner.id).is_none() {
        return Err(integrity("winner is not a competitor of this match"));
    }
    let spot = record
        .spot
        .ok_or_else(|| integrity("tournament match has no spot"))?;
    let tournament = store.tournament(tournament_id)?;
    match parent_spot(tournament.bracket_size, spot)? {
        None => Ok(Advancement::Final),
        Some((parent, side)) => {
            if let Some(parent_id) = store.find_spot_match(tournament_id, parent) {
                check_slot_writable(store.match_record(parent_id)?, parent, side, winner)?;
            }
            Ok(Advancement::Parent { spot: parent, side })
        }
    }
}

/// Apply a planned advancement: mark the tournament complete, or write the
/// winner into the parent spot, lazily creating its record if needed.
pub(crate) fn execute_advancement(
    store: &mut EngineStore,
    tournament_id: TournamentId,
    winner: CompetitorRef,
    plan: Advancement,
) -> Result<(), EngineError> {
    match plan {
        Advancement::Final => {
            store.set_tournament_status(tournament_id, TournamentStatus::Complete)?;
            log::info!("tournament {tournament_id} complete; winner is {}", winner.id);
            Ok(())
        }
        Advancement::Parent { spot, side } => {
            let parent_id = match store.find_spot_match(tournament_id, spot) {
                Some(id) => id,
                None => store.insert_match(MatchRecord::new_tournament_spot(tournament_id, spot)),
            };
            let snapshot = store.match_record(parent_id)?.clone();
            check_slot_writable(&snapshot, spot, side, winner)?;
            if snapshot.side(side).competitor.map(|c| c.id) == Some(winner.id) {
                // Re-advancing the same winner is a no-op.
                return Ok(());
            }
            let mut updated = snapshot.clone();
            updated.side_mut(side).competitor = Some(winner);
            store.commit_match(parent_id, snapshot.version, updated)
        }
    }
}

/// A slot holding a different competitor may only be overwritten while the
/// parent is still scheduled (i.e. after an explicit clear); once the parent
/// has been played, a conflicting advancement corrupts the bracket.
fn check_slot_writable(
    parent: &MatchRecord,
    spot: u32,
    side: Side,
    winner: CompetitorRef,
) -> Result<(), EngineError> {
    match parent.side(side).competitor {
        Some(existing) if existing.id != winner.id && parent.status != MatchStatus::Scheduled => {
            Err(integrity(format!(
                "spot {spot} already has a different competitor on the {side:?} side"
            )))
        }
        _ => Ok(()),
    }
}

fn tournament_of(record: &MatchRecord) -> Result<TournamentId, EngineError> {
    match record.competition {
        CompetitionRef::Tournament(id) => Ok(id),
        CompetitionRef::Ladder(_) => Err(EngineError::InvalidState(
            "only tournament matches advance".into(),
        )),
    }
}

/// Bracket integrity failures are logged for administrator review; the rest
/// of the bracket is left untouched.
fn integrity(message: impl Into<String>) -> EngineError {
    let message = message.into();
    log::warn!("bracket integrity: {message}");
    EngineError::BracketIntegrity(message)
}
