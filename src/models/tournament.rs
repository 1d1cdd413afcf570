//! Tournaments: single-elimination bracket competitions of a fixed size.

use crate::models::competitor::{CompetitorRef, CompetitorType};
use crate::models::error::EngineError;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a tournament.
pub type TournamentId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TournamentStatus {
    #[default]
    Created,
    Open,
    InProgress,
    Complete,
}

/// Bracket size: a power of two between 4 and 256. Fixes the number of leaf
/// spots and therefore the number of rounds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct BracketSize(u32);

impl BracketSize {
    pub fn new(size: u32) -> Result<Self, EngineError> {
        match size {
            4 | 8 | 16 | 32 | 64 | 128 | 256 => Ok(Self(size)),
            _ => Err(EngineError::BracketIntegrity(format!(
                "{size} is not a valid bracket size (must be a power of two between 4 and 256)"
            ))),
        }
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// log2(size): number of rounds in the bracket.
    pub fn rounds(self) -> u32 {
        self.0.trailing_zeros()
    }

    /// Number of real match spots; the final is spot `size - 1`.
    pub fn total_spots(self) -> u32 {
        self.0 - 1
    }
}

impl TryFrom<u32> for BracketSize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        BracketSize::new(value).map_err(|e| e.to_string())
    }
}

impl From<BracketSize> for u32 {
    fn from(size: BracketSize) -> u32 {
        size.0
    }
}

/// A single-elimination tournament with a seed-ordered entrant list.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tournament {
    pub id: TournamentId,
    pub competitor_type: CompetitorType,
    pub bracket_size: BracketSize,
    pub status: TournamentStatus,
    /// Registered entrants in seed order; consumed by bracket initialization.
    pub entrants: Vec<CompetitorRef>,
}

impl Tournament {
    pub fn new(competitor_type: CompetitorType, bracket_size: BracketSize) -> Self {
        Self {
            id: Uuid::new_v4(),
            competitor_type,
            bracket_size,
            status: TournamentStatus::Created,
            entrants: Vec::new(),
        }
    }

    /// Register an entrant at the next seed. Only valid before the bracket is
    /// initialized; entrants must match the tournament's competitor type.
    pub fn register_entrant(&mut self, competitor: CompetitorRef) -> Result<(), EngineError> {
        if !matches!(self.status, TournamentStatus::Created | TournamentStatus::Open) {
            return Err(EngineError::InvalidState(
                "tournament registration is closed".into(),
            ));
        }
        if competitor.kind != self.competitor_type {
            return Err(EngineError::InvalidState(
                "competitor type does not match the tournament".into(),
            ));
        }
        if self.entrants.iter().any(|e| e.id == competitor.id) {
            return Err(EngineError::InvalidState(
                "competitor is already registered".into(),
            ));
        }
        if self.entrants.len() as u32 >= self.bracket_size.get() {
            return Err(EngineError::BracketIntegrity(format!(
                "bracket of {} is full",
                self.bracket_size.get()
            )));
        }
        self.entrants.push(competitor);
        Ok(())
    }
}
