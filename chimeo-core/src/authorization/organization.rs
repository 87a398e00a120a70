use chimeo_entities::organization::Organization;

use std::result::Result as StdResult;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("user is not an admin of the organization")]
    NotAnAdmin,
}

pub type Result<T> = StdResult<T, Error>;

pub fn authorize_organization_admin(org: &Organization, user_id: &str) -> Result<()> {
    if !org.is_admin(user_id) {
        log::debug!("User {user_id} is not an admin of organization {}", org.id);
        return Err(Error::NotAnAdmin);
    }
    Ok(())
}
