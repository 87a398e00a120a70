// Low-level store access traits.
// Each repository is responsible for a single entity.
// Writes are partial: a location update never touches
// any other field of the stored document.

use crate::entities::*;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The requested object could not be found")]
    NotFound,
    #[error("The object already exists")]
    AlreadyExists,
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

type Result<T> = std::result::Result<T, Error>;

pub trait OrganizationRepo {
    fn create_organization(&self, org: Organization) -> Result<()>;

    fn get_organization(&self, id: &str) -> Result<Organization>;
    fn all_organizations(&self) -> Result<Vec<Organization>>;

    fn update_location(&self, id: &str, update: &LocationUpdate) -> Result<()>;
}
