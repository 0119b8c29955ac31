use crate::board::Board;
use crate::constants::{BOUNCE_FROM_CELL, FINAL_CELL};
use crate::types::Hazard;

/// Where a single die roll takes a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Movement {
    /// Cell the die lands on, after the overshoot rule.
    pub landed: u8,
    pub bounced: bool,
    /// Snake or ladder starting at `landed`.
    pub hazard: Option<Hazard>,
}

impl Movement {
    /// Position once the hazard, if any, has been taken.
    pub fn final_position(&self) -> u8 {
        self.hazard.map(|hazard| hazard.to).unwrap_or(self.landed)
    }
}

/// Applies `roll` to `position`.
///
/// From `BOUNCE_FROM_CELL` upward a roll past the final cell reflects back
/// off it; from lower cells it is clamped to the final cell.
pub fn resolve(position: u8, roll: u8, board: &Board) -> Movement {
    let target = position as u16 + roll as u16;
    let last = FINAL_CELL as u16;
    let (landed, bounced) = if position >= BOUNCE_FROM_CELL && target > last {
        ((last - (target - last)) as u8, true)
    } else {
        (target.min(last) as u8, false)
    };
    Movement {
        landed,
        bounced,
        hazard: board.hazard_at(landed),
    }
}
