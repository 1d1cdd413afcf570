//! Engine logic: bracket arithmetic, match lifecycle, corrections, standings,
//! and advancement.

mod advancement;
pub mod bracket;
mod edit;
mod lifecycle;
pub mod standings;

pub use advancement::{advance_match, initialize_tournament, replace_competitor};
pub use edit::edit_match;
pub use lifecycle::{
    clear_match, confirm_match, delete_match, dispute_match, report_match, DeletePolicy,
};
pub use standings::{
    career_delta, derive_correction_delta, derive_rollback_delta, derive_standing_delta,
    next_streak, StandingDelta,
};
