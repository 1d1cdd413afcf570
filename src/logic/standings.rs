//! Stat arithmetic: career and standing deltas derived from results.
//!
//! These are pure functions composed by the transition handlers, so the
//! point/streak rules can be tested without any store.

use crate::models::{CareerDelta, EngineError, Ladder, SideResult};
use chrono::{DateTime, Utc};

/// Net change to one ladder standing. Produced by the derive functions below
/// and applied atomically by the store.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct StandingDelta {
    pub points: i64,
    pub wins: i32,
    pub losses: i32,
    pub draws: i32,
    /// Result driving the streak update; `None` leaves the streak untouched
    /// (corrections and rollbacks cannot rebuild a streak exactly).
    pub streak_result: Option<SideResult>,
    /// Confirmation time; `None` leaves `last_match_date` untouched.
    pub confirmed_at: Option<DateTime<Utc>>,
}

impl StandingDelta {
    /// Sum of two deltas; the right-hand side wins for streak/date fields.
    pub fn combine(self, other: Self) -> Self {
        Self {
            points: self.points + other.points,
            wins: self.wins + other.wins,
            losses: self.losses + other.losses,
            draws: self.draws + other.draws,
            streak_result: other.streak_result.or(self.streak_result),
            confirmed_at: other.confirmed_at.or(self.confirmed_at),
        }
    }
}

/// Career counter change for one side's result.
pub fn career_delta(result: SideResult) -> CareerDelta {
    match result {
        SideResult::Won => CareerDelta {
            wins: 1,
            ..CareerDelta::default()
        },
        SideResult::Lost => CareerDelta {
            losses: 1,
            ..CareerDelta::default()
        },
        SideResult::Draw => CareerDelta {
            draws: 1,
            ..CareerDelta::default()
        },
        SideResult::Unreported => CareerDelta::default(),
    }
}

fn counter_deltas(result: SideResult) -> Result<(i32, i32, i32), EngineError> {
    match result {
        SideResult::Won => Ok((1, 0, 0)),
        SideResult::Lost => Ok((0, 1, 0)),
        SideResult::Draw => Ok((0, 0, 1)),
        SideResult::Unreported => Err(EngineError::InvalidResult(
            "cannot derive a standing delta from an unreported result".into(),
        )),
    }
}

/// Standing delta for one side's newly confirmed result: points per the
/// ladder configuration, one counter increment, streak and last-match date
/// updated.
pub fn derive_standing_delta(
    ladder: &Ladder,
    result: SideResult,
    confirmed_at: DateTime<Utc>,
) -> Result<StandingDelta, EngineError> {
    let (wins, losses, draws) = counter_deltas(result)?;
    Ok(StandingDelta {
        points: ladder.points_for(result),
        wins,
        losses,
        draws,
        streak_result: Some(result),
        confirmed_at: Some(confirmed_at),
    })
}

/// Exact inverse of a confirmed result's standing delta, minus the streak and
/// last-match date (those are not reversible without history).
pub fn derive_rollback_delta(ladder: &Ladder, result: SideResult) -> Result<StandingDelta, EngineError> {
    let (wins, losses, draws) = counter_deltas(result)?;
    Ok(StandingDelta {
        points: -ladder.points_for(result),
        wins: -wins,
        losses: -losses,
        draws: -draws,
        streak_result: None,
        confirmed_at: None,
    })
}

/// Net correction when a confirmed result changes from `old` to `new`:
/// rollback of `old` combined with application of `new`, as one delta so the
/// store writes the standing exactly once.
pub fn derive_correction_delta(
    ladder: &Ladder,
    old: SideResult,
    new: SideResult,
) -> Result<StandingDelta, EngineError> {
    let rollback = derive_rollback_delta(ladder, old)?;
    let (wins, losses, draws) = counter_deltas(new)?;
    let apply = StandingDelta {
        points: ladder.points_for(new),
        wins,
        losses,
        draws,
        streak_result: None,
        confirmed_at: None,
    };
    Ok(rollback.combine(apply))
}

/// Streak transition: a result matching the current run extends it by one,
/// anything else resets. Draws reset to zero.
pub fn next_streak(current: i32, result: SideResult) -> i32 {
    match result {
        SideResult::Won => {
            if current > 0 {
                current + 1
            } else {
                1
            }
        }
        SideResult::Lost => {
            if current < 0 {
                current - 1
            } else {
                -1
            }
        }
        SideResult::Draw => 0,
        SideResult::Unreported => current,
    }
}
