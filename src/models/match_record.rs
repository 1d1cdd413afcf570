//! Match records: the central mutable entity of the engine.

use crate::models::competitor::{CompetitorId, CompetitorRef};
use crate::models::ladder::LadderId;
use crate::models::tournament::TournamentId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a match.
pub type MatchId = Uuid;

/// Which side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    One,
    Two,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::One => Side::Two,
            Side::Two => Side::One,
        }
    }
}

/// Outcome recorded for one side of a match. `Unreported` replaces the
/// empty-string sentinel of loosely typed schemas; matching is exhaustive.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SideResult {
    #[default]
    Unreported,
    Won,
    Lost,
    Draw,
}

impl SideResult {
    /// The result the opposite side must hold for the pair to be
    /// complementary: (won, lost), (lost, won), or (draw, draw).
    pub fn complement(self) -> Self {
        match self {
            SideResult::Unreported => SideResult::Unreported,
            SideResult::Won => SideResult::Lost,
            SideResult::Lost => SideResult::Won,
            SideResult::Draw => SideResult::Draw,
        }
    }
}

/// Lifecycle status: scheduled -> reported -> confirmed. The disputed flag is
/// orthogonal and never changes status.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Scheduled,
    Reported,
    Confirmed,
}

/// Which competition a match belongs to.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(tag = "competition_type", content = "competition_id")]
pub enum CompetitionRef {
    #[serde(rename = "ladders")]
    Ladder(LadderId),
    #[serde(rename = "tournaments")]
    Tournament(TournamentId),
}

/// One side of a match: the competitor (empty until seeded or advanced for
/// tournament spots), their reported result, and a free-form comment.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchSide {
    pub competitor: Option<CompetitorRef>,
    pub result: SideResult,
    pub comment: String,
}

/// A match between two competitors, on a ladder or at a tournament spot.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    pub id: MatchId,
    pub competition: CompetitionRef,
    /// Bracket spot (tournaments only, 1-indexed).
    pub spot: Option<u32>,
    pub one: MatchSide,
    pub two: MatchSide,
    pub match_date: DateTime<Utc>,
    pub status: MatchStatus,
    pub disputed: bool,
    /// Bumped by the store on every committed mutation; optimistic
    /// concurrency token.
    pub version: u64,
}

impl MatchRecord {
    /// New scheduled ladder match with both competitors known up front.
    pub fn new_ladder(ladder: LadderId, one: CompetitorRef, two: CompetitorRef) -> Self {
        Self {
            id: Uuid::new_v4(),
            competition: CompetitionRef::Ladder(ladder),
            spot: None,
            one: MatchSide {
                competitor: Some(one),
                ..MatchSide::default()
            },
            two: MatchSide {
                competitor: Some(two),
                ..MatchSide::default()
            },
            match_date: Utc::now(),
            status: MatchStatus::Scheduled,
            disputed: false,
            version: 0,
        }
    }

    /// New empty scheduled placeholder for a tournament bracket spot.
    pub fn new_tournament_spot(tournament: TournamentId, spot: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            competition: CompetitionRef::Tournament(tournament),
            spot: Some(spot),
            one: MatchSide::default(),
            two: MatchSide::default(),
            match_date: Utc::now(),
            status: MatchStatus::Scheduled,
            disputed: false,
            version: 0,
        }
    }

    pub fn side(&self, side: Side) -> &MatchSide {
        match side {
            Side::One => &self.one,
            Side::Two => &self.two,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut MatchSide {
        match side {
            Side::One => &mut self.one,
            Side::Two => &mut self.two,
        }
    }

    /// Which side a competitor occupies, if any.
    pub fn competitor_side(&self, id: CompetitorId) -> Option<Side> {
        if self.one.competitor.map(|c| c.id) == Some(id) {
            Some(Side::One)
        } else if self.two.competitor.map(|c| c.id) == Some(id) {
            Some(Side::Two)
        } else {
            None
        }
    }

    /// A match is playable once both competitor slots are populated.
    pub fn is_playable(&self) -> bool {
        self.one.competitor.is_some() && self.two.competitor.is_some()
    }

    /// The confirmed winner, if any. Draws and unfinished matches have none.
    pub fn winner(&self) -> Option<CompetitorRef> {
        if self.status != MatchStatus::Confirmed {
            return None;
        }
        match (self.one.result, self.two.result) {
            (SideResult::Won, _) => self.one.competitor,
            (_, SideResult::Won) => self.two.competitor,
            _ => None,
        }
    }
}
