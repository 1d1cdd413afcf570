//! Ladders and per-competitor standings.

use crate::models::competitor::CompetitorType;
use crate::models::match_record::SideResult;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a ladder.
pub type LadderId = Uuid;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LadderStatus {
    #[default]
    Active,
    Inactive,
}

/// A persistent competition. Point values are fixed per ladder and applied
/// uniformly to every confirmed match on it.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Ladder {
    pub id: LadderId,
    pub competitor_type: CompetitorType,
    pub win_points: i64,
    pub loss_points: i64,
    pub draw_points: i64,
    pub uses_draws: bool,
    pub status: LadderStatus,
}

impl Ladder {
    pub fn new(
        competitor_type: CompetitorType,
        win_points: i64,
        loss_points: i64,
        draw_points: i64,
        uses_draws: bool,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            competitor_type,
            win_points,
            loss_points,
            draw_points,
            uses_draws,
            status: LadderStatus::Active,
        }
    }

    /// Points awarded for one side's confirmed result.
    pub fn points_for(&self, result: SideResult) -> i64 {
        match result {
            SideResult::Won => self.win_points,
            SideResult::Lost => self.loss_points,
            SideResult::Draw => self.draw_points,
            SideResult::Unreported => 0,
        }
    }
}

/// Running totals for one competitor on one ladder. Created when the
/// competitor joins, deleted when they leave. `streak` is signed: positive is
/// a win streak, negative a loss streak, zero after a draw.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct LadderStanding {
    pub points: i64,
    pub wins: u32,
    pub losses: u32,
    pub draws: u32,
    pub streak: i32,
    pub last_match_date: Option<DateTime<Utc>>,
}
