//! Data structures for the engine: competitors, ladders, tournaments, match records.

mod competitor;
mod error;
mod ladder;
mod match_record;
mod tournament;

pub use competitor::{
    CareerDelta, CareerRecord, Competitor, CompetitorId, CompetitorRef, CompetitorType,
};
pub(crate) use competitor::add_signed;
pub use error::EngineError;
pub use ladder::{Ladder, LadderId, LadderStanding, LadderStatus};
pub use match_record::{
    CompetitionRef, MatchId, MatchRecord, MatchSide, MatchStatus, Side, SideResult,
};
pub use tournament::{BracketSize, Tournament, TournamentId, TournamentStatus};
