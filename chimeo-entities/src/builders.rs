pub trait Builder {
    type Build;
    fn build() -> Self::Build;
}

pub use self::{address_builder::*, organization_builder::*};

pub mod organization_builder {

    use super::*;
    use crate::{
        address::*, contact::*, geo::*, id::*, location::*, organization::*, time::*,
    };

    #[derive(Debug)]
    pub struct OrganizationBuild {
        org: Organization,
    }

    impl OrganizationBuild {
        pub fn id(mut self, id: &str) -> Self {
            self.org.id = id.into();
            self
        }
        pub fn name(mut self, name: &str) -> Self {
            self.org.name = name.into();
            self
        }
        pub fn kind(mut self, kind: &str) -> Self {
            self.org.kind = kind.into();
            self
        }
        pub fn pos(mut self, pos: MapPoint) -> Self {
            self.org.location.pos = Some(pos);
            self
        }
        pub fn lat_lng(self, lat: f64, lng: f64) -> Self {
            self.pos(MapPoint::try_from_lat_lng_deg(lat, lng).unwrap())
        }
        pub fn location_address(mut self, address: Address) -> Self {
            self.org.location.address = Some(address);
            self
        }
        pub fn flat_address(mut self, address: Address) -> Self {
            self.org.address = address;
            self
        }
        pub fn admin(mut self, user_id: &str) -> Self {
            self.org.admin_ids.insert(user_id.into(), true);
            self
        }
        pub fn admin_ids(mut self, ids: Vec<(&str, bool)>) -> Self {
            for (id, member) in ids {
                self.org.admin_ids.insert(id.into(), member);
            }
            self
        }
        pub fn finish(self) -> Organization {
            self.org
        }
    }

    impl Builder for Organization {
        type Build = OrganizationBuild;
        fn build() -> OrganizationBuild {
            OrganizationBuild {
                org: Organization {
                    id: Id::new(),
                    name: "".into(),
                    kind: "".into(),
                    description: "".into(),
                    location: Location::default(),
                    address: Address::default(),
                    verified: false,
                    follower_count: 0,
                    contact: Contact::default(),
                    admin_ids: Default::default(),
                    created_at: Timestamp::now(),
                    updated_at: None,
                },
            }
        }
    }
}

pub mod address_builder {

    use super::*;
    use crate::address::*;

    #[derive(Debug)]
    pub struct AddressBuild {
        addr: Address,
    }

    impl AddressBuild {
        pub fn street(mut self, x: &str) -> Self {
            self.addr.street = Some(x.into());
            self
        }
        pub fn city(mut self, x: &str) -> Self {
            self.addr.city = Some(x.into());
            self
        }
        pub fn state(mut self, x: &str) -> Self {
            self.addr.state = Some(x.into());
            self
        }
        pub fn zip(mut self, x: &str) -> Self {
            self.addr.zip = Some(x.into());
            self
        }
        pub fn country(mut self, x: &str) -> Self {
            self.addr.country = Some(x.into());
            self
        }
        pub fn finish(self) -> Address {
            self.addr
        }
    }

    impl Builder for Address {
        type Build = AddressBuild;
        fn build() -> AddressBuild {
            AddressBuild {
                addr: Address::default(),
            }
        }
    }
}
