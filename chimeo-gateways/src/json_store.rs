use std::{
    collections::BTreeMap,
    io,
    path::{Path, PathBuf},
};

use chimeo_core::{
    entities::*,
    repositories::{Error as RepoError, OrganizationRepo},
};
use jfs::Store;
use serde::{Deserialize, Serialize};
use serde_json::Value;

type Result<T> = std::result::Result<T, RepoError>;

/// Organization documents stored as one JSON file per record.
///
/// The documents keep the camelCase layout of the cloud document
/// store, so exported collections can be used as they are.
#[derive(Clone)]
pub struct JsonFileStore {
    json_store: Store,
}

impl std::fmt::Debug for JsonFileStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore")
            .field("path", &self.path())
            .finish()
    }
}

impl JsonFileStore {
    pub fn try_new<P: AsRef<Path>>(directory: P) -> io::Result<Self> {
        let json_store = Store::new(directory)?;
        Ok(Self { json_store })
    }

    pub fn path(&self) -> PathBuf {
        self.json_store.path().to_path_buf()
    }

    fn load(&self, id: &str) -> Result<JsonOrganization> {
        self.json_store.get(id).map_err(|err| match err.kind() {
            io::ErrorKind::NotFound => RepoError::NotFound,
            _ => err.into(),
        })
    }

    fn save(&self, id: &str, doc: &JsonOrganization) -> Result<()> {
        self.json_store.save_with_id(doc, id)?;
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonLocation {
    #[serde(default)]
    latitude: Option<f64>,
    #[serde(default)]
    longitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zip_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    country: Option<String>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonOrganization {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<JsonLocation>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    zip_code: Option<String>,
    #[serde(default)]
    verified: bool,
    #[serde(default)]
    follower_count: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    #[serde(default)]
    admin_ids: BTreeMap<String, bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    created_at: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    updated_at: Option<i64>,
    /// Fields this store does not know about are written back untouched.
    #[serde(flatten)]
    other: BTreeMap<String, Value>,
}

impl JsonLocation {
    fn pos(&self, id: &str) -> Option<MapPoint> {
        let (lat, lng) = (self.latitude?, self.longitude?);
        match MapPoint::try_from_lat_lng_deg(lat, lng) {
            // Written by older clients for "no position"
            Ok(pos) if pos.is_null_island() => None,
            Ok(pos) => Some(pos),
            Err(err) => {
                log::warn!("Ignoring invalid position of organization {id}: {err}");
                None
            }
        }
    }

    fn address(&self) -> Address {
        let Self {
            address,
            city,
            state,
            zip_code,
            country,
            ..
        } = self.clone();
        Address {
            street: address,
            city,
            state,
            zip: zip_code,
            country,
        }
    }

    fn set_address(&mut self, addr: &Address) {
        let Address {
            street,
            city,
            state,
            zip,
            country,
        } = addr.clone();
        self.address = street;
        self.city = city;
        self.state = state;
        self.zip_code = zip;
        self.country = country;
    }

    fn set_pos(&mut self, pos: Option<MapPoint>) {
        self.latitude = pos.map(MapPoint::lat_deg);
        self.longitude = pos.map(MapPoint::lng_deg);
    }
}

impl JsonOrganization {
    fn into_organization(self, id: &str) -> Organization {
        let JsonOrganization {
            name,
            kind,
            description,
            location,
            address,
            city,
            state,
            zip_code,
            verified,
            follower_count,
            website,
            phone,
            email,
            admin_ids,
            created_at,
            updated_at,
            other: _,
        } = self;
        let location = location
            .map(|loc| Location {
                pos: loc.pos(id),
                address: Some(loc.address()).filter(|a| !a.is_empty()),
            })
            .unwrap_or_default();
        Organization {
            id: id.into(),
            name,
            kind,
            description,
            location,
            address: Address {
                street: address,
                city,
                state,
                zip: zip_code,
                country: None,
            },
            verified,
            follower_count,
            contact: Contact {
                website,
                phone,
                email,
            },
            admin_ids,
            created_at: Timestamp::from_secs(created_at.unwrap_or_default()),
            updated_at: updated_at.map(Timestamp::from_secs),
        }
    }
}

impl From<Organization> for JsonOrganization {
    fn from(from: Organization) -> Self {
        let Organization {
            id: _,
            name,
            kind,
            description,
            location,
            address,
            verified,
            follower_count,
            contact,
            admin_ids,
            created_at,
            updated_at,
        } = from;
        let mut json_location = JsonLocation::default();
        json_location.set_pos(location.pos);
        if let Some(addr) = &location.address {
            json_location.set_address(addr);
        }
        let Contact {
            website,
            phone,
            email,
        } = contact;
        Self {
            name,
            kind,
            description,
            location: Some(json_location),
            address: address.street,
            city: address.city,
            state: address.state,
            zip_code: address.zip,
            verified,
            follower_count,
            website,
            phone,
            email,
            admin_ids,
            created_at: Some(created_at.as_secs()),
            updated_at: updated_at.map(Timestamp::as_secs),
            other: BTreeMap::new(),
        }
    }
}

impl OrganizationRepo for JsonFileStore {
    fn create_organization(&self, org: Organization) -> Result<()> {
        let id = org.id.to_string();
        match self.load(&id) {
            Ok(_) => return Err(RepoError::AlreadyExists),
            Err(RepoError::NotFound) => {}
            Err(err) => return Err(err),
        }
        self.save(&id, &org.into())
    }

    fn get_organization(&self, id: &str) -> Result<Organization> {
        Ok(self.load(id)?.into_organization(id))
    }

    fn all_organizations(&self) -> Result<Vec<Organization>> {
        let docs = self.json_store.all::<JsonOrganization>()?;
        Ok(docs
            .into_iter()
            .map(|(id, doc)| doc.into_organization(&id))
            .collect())
    }

    fn update_location(&self, id: &str, update: &LocationUpdate) -> Result<()> {
        let mut doc = self.load(id)?;
        let location = doc.location.get_or_insert_with(Default::default);
        location.set_pos(Some(update.pos));
        location.set_address(&update.address);
        doc.updated_at = Some(update.updated_at.as_secs());
        self.save(id, &doc)
    }
}
