//! Ladder and tournament result engine: library with models, logic, and store.

pub mod logic;
pub mod models;
pub mod store;

pub use logic::{
    advance_match, clear_match, confirm_match, delete_match, dispute_match, edit_match,
    initialize_tournament, replace_competitor, report_match, DeletePolicy,
};
pub use models::{
    BracketSize, CareerDelta, CareerRecord, CompetitionRef, Competitor, CompetitorId,
    CompetitorRef, CompetitorType, EngineError, Ladder, LadderId, LadderStanding, LadderStatus,
    MatchId, MatchRecord, MatchSide, MatchStatus, Side, SideResult, Tournament, TournamentId,
    TournamentStatus,
};
pub use store::{EngineStore, StandingRow};
