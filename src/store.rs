//! In-memory engine store: match, standing, competitor, ladder, and
//! tournament tables.
//!
//! All mutations run while the caller holds an exclusive borrow (the web
//! layer wraps the store in one `RwLock` and holds the write guard for a
//! whole handler), so each engine operation is a single transaction. Match
//! rows additionally carry an optimistic version token: `commit_match`
//! rejects a write whose snapshot is stale with `ConcurrencyConflict`, so a
//! caller that read state, dropped the lock, and came back cannot clobber an
//! interleaved edit.

use crate::logic::standings::{next_streak, StandingDelta};
use crate::models::{
    add_signed, CareerDelta, CompetitionRef, Competitor, CompetitorId, CompetitorRef, EngineError,
    Ladder, LadderId, LadderStanding, MatchId, MatchRecord, MatchStatus, Tournament, TournamentId,
    TournamentStatus,
};
use serde::Serialize;
use std::collections::HashMap;

/// One ranked row of a ladder's standings. Rank is the position in the
/// returned vector; it is derived at read time, never stored.
#[derive(Clone, Debug, Serialize)]
pub struct StandingRow {
    pub competitor: CompetitorRef,
    pub name: String,
    #[serde(flatten)]
    pub standing: LadderStanding,
}

#[derive(Clone, Debug, Default)]
pub struct EngineStore {
    matches: HashMap<MatchId, MatchRecord>,
    ladders: HashMap<LadderId, Ladder>,
    standings: HashMap<(LadderId, CompetitorId), LadderStanding>,
    tournaments: HashMap<TournamentId, Tournament>,
    competitors: HashMap<CompetitorId, Competitor>,
}

impl EngineStore {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- competitors ----

    pub fn insert_competitor(&mut self, competitor: Competitor) -> CompetitorId {
        let id = competitor.id;
        self.competitors.insert(id, competitor);
        id
    }

    pub fn competitor(&self, id: CompetitorId) -> Result<&Competitor, EngineError> {
        self.competitors.get(&id).ok_or(EngineError::NotFound {
            entity: "competitor",
            id,
        })
    }

    /// Atomic signed update of a competitor's career counters.
    pub fn apply_career_delta(
        &mut self,
        id: CompetitorId,
        delta: CareerDelta,
    ) -> Result<(), EngineError> {
        let competitor = self.competitors.get_mut(&id).ok_or(EngineError::NotFound {
            entity: "competitor",
            id,
        })?;
        competitor.record.apply(delta);
        Ok(())
    }

    // ---- ladders and standings ----

    pub fn insert_ladder(&mut self, ladder: Ladder) -> LadderId {
        let id = ladder.id;
        self.ladders.insert(id, ladder);
        id
    }

    pub fn ladder(&self, id: LadderId) -> Result<&Ladder, EngineError> {
        self.ladders.get(&id).ok_or(EngineError::NotFound {
            entity: "ladder",
            id,
        })
    }

    /// Create a zeroed standing row for a competitor joining a ladder.
    pub fn join_ladder(
        &mut self,
        ladder_id: LadderId,
        competitor: CompetitorRef,
    ) -> Result<(), EngineError> {
        let ladder = self.ladder(ladder_id)?;
        if competitor.kind != ladder.competitor_type {
            return Err(EngineError::InvalidState(
                "competitor type does not match the ladder".into(),
            ));
        }
        self.competitor(competitor.id)?;
        let key = (ladder_id, competitor.id);
        if self.standings.contains_key(&key) {
            return Err(EngineError::InvalidState(
                "competitor has already joined this ladder".into(),
            ));
        }
        self.standings.insert(key, LadderStanding::default());
        Ok(())
    }

    /// Delete the standing row for a competitor leaving a ladder.
    pub fn leave_ladder(
        &mut self,
        ladder_id: LadderId,
        competitor_id: CompetitorId,
    ) -> Result<(), EngineError> {
        self.standings
            .remove(&(ladder_id, competitor_id))
            .map(|_| ())
            .ok_or(EngineError::NotFound {
                entity: "standing",
                id: competitor_id,
            })
    }

    pub fn standing(
        &self,
        ladder_id: LadderId,
        competitor_id: CompetitorId,
    ) -> Result<&LadderStanding, EngineError> {
        self.standings
            .get(&(ladder_id, competitor_id))
            .ok_or(EngineError::NotFound {
                entity: "standing",
                id: competitor_id,
            })
    }

    /// Atomic application of a standing delta: points, counters, streak, and
    /// last-match date in one write.
    pub fn apply_standing_delta(
        &mut self,
        ladder_id: LadderId,
        competitor_id: CompetitorId,
        delta: &StandingDelta,
    ) -> Result<(), EngineError> {
        let standing = self
            .standings
            .get_mut(&(ladder_id, competitor_id))
            .ok_or(EngineError::NotFound {
                entity: "standing",
                id: competitor_id,
            })?;
        standing.points += delta.points;
        standing.wins = add_signed(standing.wins, delta.wins);
        standing.losses = add_signed(standing.losses, delta.losses);
        standing.draws = add_signed(standing.draws, delta.draws);
        if let Some(result) = delta.streak_result {
            standing.streak = next_streak(standing.streak, result);
        }
        if let Some(at) = delta.confirmed_at {
            standing.last_match_date = Some(at);
        }
        Ok(())
    }

    /// Standings sorted by points descending; ties broken by name so the
    /// order is deterministic.
    pub fn standings_ranked(&self, ladder_id: LadderId) -> Result<Vec<StandingRow>, EngineError> {
        self.ladder(ladder_id)?;
        let mut rows: Vec<StandingRow> = self
            .standings
            .iter()
            .filter(|((lid, _), _)| *lid == ladder_id)
            .map(|((_, cid), standing)| {
                let competitor = self.competitor(*cid)?;
                Ok(StandingRow {
                    competitor: competitor.reference(),
                    name: competitor.name.clone(),
                    standing: standing.clone(),
                })
            })
            .collect::<Result<_, EngineError>>()?;
        rows.sort_by(|a, b| {
            b.standing
                .points
                .cmp(&a.standing.points)
                .then_with(|| a.name.cmp(&b.name))
        });
        Ok(rows)
    }

    // ---- tournaments ----

    pub fn insert_tournament(&mut self, tournament: Tournament) -> TournamentId {
        let id = tournament.id;
        self.tournaments.insert(id, tournament);
        id
    }

    pub fn tournament(&self, id: TournamentId) -> Result<&Tournament, EngineError> {
        self.tournaments.get(&id).ok_or(EngineError::NotFound {
            entity: "tournament",
            id,
        })
    }

    pub fn register_entrant(
        &mut self,
        tournament_id: TournamentId,
        competitor: CompetitorRef,
    ) -> Result<(), EngineError> {
        self.competitor(competitor.id)?;
        let tournament = self
            .tournaments
            .get_mut(&tournament_id)
            .ok_or(EngineError::NotFound {
                entity: "tournament",
                id: tournament_id,
            })?;
        tournament.register_entrant(competitor)
    }

    pub fn set_tournament_status(
        &mut self,
        id: TournamentId,
        status: TournamentStatus,
    ) -> Result<(), EngineError> {
        let tournament = self.tournaments.get_mut(&id).ok_or(EngineError::NotFound {
            entity: "tournament",
            id,
        })?;
        tournament.status = status;
        Ok(())
    }

    // ---- matches ----

    pub fn insert_match(&mut self, record: MatchRecord) -> MatchId {
        let id = record.id;
        self.matches.insert(id, record);
        id
    }

    pub fn match_record(&self, id: MatchId) -> Result<&MatchRecord, EngineError> {
        self.matches.get(&id).ok_or(EngineError::NotFound {
            entity: "match",
            id,
        })
    }

    /// Replace a match row, enforcing the optimistic version check. The
    /// stored version is bumped so any other snapshot taken before this
    /// commit becomes stale.
    pub fn commit_match(
        &mut self,
        id: MatchId,
        expected_version: u64,
        mut updated: MatchRecord,
    ) -> Result<(), EngineError> {
        let current = self.matches.get_mut(&id).ok_or(EngineError::NotFound {
            entity: "match",
            id,
        })?;
        if current.version != expected_version {
            return Err(EngineError::ConcurrencyConflict(id));
        }
        updated.version = expected_version + 1;
        *current = updated;
        Ok(())
    }

    pub fn remove_match(&mut self, id: MatchId) -> Result<MatchRecord, EngineError> {
        self.matches.remove(&id).ok_or(EngineError::NotFound {
            entity: "match",
            id,
        })
    }

    /// The match occupying a bracket spot, if it has been created.
    pub fn find_spot_match(&self, tournament_id: TournamentId, spot: u32) -> Option<MatchId> {
        self.matches
            .values()
            .find(|m| {
                m.competition == CompetitionRef::Tournament(tournament_id) && m.spot == Some(spot)
            })
            .map(|m| m.id)
    }

    /// The scheduled tournament match pairing two competitors, in either
    /// side order.
    pub fn find_scheduled_pairing(
        &self,
        tournament_id: TournamentId,
        a: CompetitorId,
        b: CompetitorId,
    ) -> Option<MatchId> {
        self.matches
            .values()
            .find(|m| {
                m.competition == CompetitionRef::Tournament(tournament_id)
                    && m.status == MatchStatus::Scheduled
                    && m.competitor_side(a).is_some()
                    && m.competitor_side(b).is_some()
            })
            .map(|m| m.id)
    }

    /// All of a tournament's matches in spot order (bracket view).
    pub fn tournament_matches(&self, tournament_id: TournamentId) -> Vec<&MatchRecord> {
        let mut matches: Vec<&MatchRecord> = self
            .matches
            .values()
            .filter(|m| m.competition == CompetitionRef::Tournament(tournament_id))
            .collect();
        matches.sort_by_key(|m| m.spot);
        matches
    }

    /// All of a ladder's matches (unordered).
    pub fn ladder_matches(&self, ladder_id: LadderId) -> Vec<&MatchRecord> {
        self.matches
            .values()
            .filter(|m| m.competition == CompetitionRef::Ladder(ladder_id))
            .collect()
    }
}
