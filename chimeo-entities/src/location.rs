use crate::{address::*, geo::*, time::*};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Location {
    /// `None` until the address has been resolved.
    pub pos: Option<MapPoint>,
    pub address: Option<Address>,
}

impl Location {
    pub fn has_valid_pos(&self) -> bool {
        self.pos.is_some_and(|pos| !pos.is_null_island())
    }
}

/// A partial write of a resolved location.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationUpdate {
    pub pos: MapPoint,
    pub address: Address,
    pub updated_at: Timestamp,
}
