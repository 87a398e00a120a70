use std::collections::BTreeMap;

use crate::{address::*, contact::*, geo::*, id::*, location::*, time::*};

/// An organization listed in the directory.
///
/// Copies held by a client are snapshots of the backend document and
/// may be stale.
#[derive(Debug, Clone, PartialEq)]
pub struct Organization {
    pub id: Id,
    pub name: String,
    /// Category label, e.g. "Fire Department".
    pub kind: String,
    pub description: String,
    pub location: Location,
    /// Address fields stored at the top level of the document by
    /// older clients. Only consulted if the location lacks them.
    pub address: Address,
    pub verified: bool,
    pub follower_count: u64,
    pub contact: Contact,
    /// User id to membership flag.
    pub admin_ids: BTreeMap<String, bool>,
    pub created_at: Timestamp,
    pub updated_at: Option<Timestamp>,
}

impl Organization {
    pub fn pos(&self) -> Option<MapPoint> {
        self.location.pos
    }

    pub fn is_admin(&self, user_id: &str) -> bool {
        self.admin_ids.get(user_id).copied().unwrap_or(false)
    }

    pub fn apply_location_update(&mut self, update: &LocationUpdate) {
        self.location.pos = Some(update.pos);
        self.location.address = Some(update.address.clone());
        self.updated_at = Some(update.updated_at);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builders::*;

    #[test]
    fn admin_membership() {
        let org = Organization::build()
            .admin("alice")
            .admin_ids(vec![("bob", false)])
            .finish();
        assert!(org.is_admin("alice"));
        assert!(!org.is_admin("bob"));
        assert!(!org.is_admin("carol"));
    }

    #[test]
    fn apply_location_update_keeps_flat_address() {
        let flat = Address::build().street("1 Old Rd").finish();
        let mut org = Organization::build().flat_address(flat.clone()).finish();
        let update = LocationUpdate {
            pos: MapPoint::try_from_lat_lng_deg(33.2148, -97.1331).unwrap(),
            address: Address::build().street("123 Main St").city("Denton").finish(),
            updated_at: Timestamp::from_secs(1_700_000_000),
        };
        org.apply_location_update(&update);
        assert_eq!(Some(update.pos), org.pos());
        assert_eq!(Some(update.address), org.location.address);
        assert_eq!(Some(update.updated_at), org.updated_at);
        assert_eq!(flat, org.address);
    }
}
