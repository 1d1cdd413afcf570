//! Bracket indexer: pure spot arithmetic for single-elimination brackets.
//!
//! A bracket of `size` competitors linearizes into `size - 1` match spots,
//! numbered consecutively across rounds starting at 1. Round 1 occupies spots
//! `1..=size/2`, round 2 the next `size/4`, and so on; the final is spot
//! `size - 1`. Two consecutive spots of round `r` feed one spot of round
//! `r + 1`: the odd spot fills side one of the parent, the even spot side two.

use crate::models::{BracketSize, EngineError, Side};

/// Number of spots in `round` (1-indexed, `1..=size.rounds()`).
pub fn spots_in_round(size: BracketSize, round: u32) -> u32 {
    size.get() >> round
}

/// First spot number of `round`. Rounds before it hold
/// `size/2 + size/4 + ... = size - size/2^(round-1)` spots.
pub fn first_spot_of_round(size: BracketSize, round: u32) -> u32 {
    size.get() - (size.get() >> (round - 1)) + 1
}

/// Inclusive spot range of `round`.
pub fn spot_range(size: BracketSize, round: u32) -> (u32, u32) {
    let first = first_spot_of_round(size, round);
    (first, first + spots_in_round(size, round) - 1)
}

/// Round containing `spot`, or `BracketIntegrity` if the spot is out of range.
pub fn round_of_spot(size: BracketSize, spot: u32) -> Result<u32, EngineError> {
    if spot == 0 || spot > size.total_spots() {
        return Err(EngineError::BracketIntegrity(format!(
            "spot {spot} is out of range for a bracket of {}",
            size.get()
        )));
    }
    let mut round = 1;
    while spot >= first_spot_of_round(size, round + 1) {
        round += 1;
    }
    Ok(round)
}

/// Where the winner of `spot` advances: the parent spot and which of its
/// sides the winner fills. `None` for the final spot.
pub fn parent_spot(size: BracketSize, spot: u32) -> Result<Option<(u32, Side)>, EngineError> {
    let round = round_of_spot(size, spot)?;
    if round == size.rounds() {
        return Ok(None);
    }
    let offset = spot - first_spot_of_round(size, round);
    let parent = first_spot_of_round(size, round + 1) + offset / 2;
    let side = if spot % 2 == 1 { Side::One } else { Side::Two };
    Ok(Some((parent, side)))
}
