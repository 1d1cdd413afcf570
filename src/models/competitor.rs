//! Competitors: players and teams with career win/loss/draw counters.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a competitor (player or team).
pub type CompetitorId = Uuid;

/// Whether a competitor is an individual player or a team.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompetitorType {
    Player,
    Team,
}

/// Reference to a competitor: id plus kind. Matches and ladders store these;
/// the full record lives in the competitor store.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct CompetitorRef {
    pub id: CompetitorId,
    pub kind: CompetitorType,
}

/// Career aggregate counters. Mutated only via `CareerDelta` so that
/// corrections can be applied as a single net update.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct CareerRecord {
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
}

impl CareerRecord {
    /// Apply a signed delta to the counters.
    pub fn apply(&mut self, delta: CareerDelta) {
        self.wins = add_signed(self.wins, delta.wins);
        self.losses = add_signed(self.losses, delta.losses);
        self.draws = add_signed(self.draws, delta.draws);
    }
}

/// Signed change to a career record. A rollback and a re-apply combine into
/// one delta so the store writes each competitor exactly once per edit.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct CareerDelta {
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
}

impl CareerDelta {
    /// The exact inverse of this delta (used for rollback).
    pub fn inverse(self) -> Self {
        Self {
            wins: -self.wins,
            losses: -self.losses,
            draws: -self.draws,
        }
    }

    /// Sum of two deltas.
    pub fn combine(self, other: Self) -> Self {
        Self {
            wins: self.wins + other.wins,
            losses: self.losses + other.losses,
            draws: self.draws + other.draws,
        }
    }

    pub fn is_zero(self) -> bool {
        self.wins == 0 && self.losses == 0 && self.draws == 0
    }
}

/// Add a signed delta to an unsigned counter, saturating at zero.
pub(crate) fn add_signed(value: u32, delta: i32) -> u32 {
    if delta >= 0 {
        value.saturating_add(delta as u32)
    } else {
        value.saturating_sub(delta.unsigned_abs())
    }
}

/// A registered competitor with display name and career record.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Competitor {
    pub id: CompetitorId,
    pub kind: CompetitorType,
    pub name: String,
    pub record: CareerRecord,
}

impl Competitor {
    /// Create a new competitor with zeroed counters.
    pub fn new(name: impl Into<String>, kind: CompetitorType) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            name: name.into(),
            record: CareerRecord::default(),
        }
    }

    pub fn reference(&self) -> CompetitorRef {
        CompetitorRef {
            id: self.id,
            kind: self.kind,
        }
    }
}
