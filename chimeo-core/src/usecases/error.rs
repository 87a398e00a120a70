use crate::{authorization, gateways::geocode::GeocodeError, repositories};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("The organization has no usable address")]
    AddressUnavailable,
    #[error("The address could not be resolved")]
    GeocodeNotFound,
    #[error("The geocoding service failed: {0}")]
    GeocodeTransient(String),
    #[error("Failed to store the location: {0}")]
    Persistence(#[from] repositories::Error),
    #[error("The reconciliation has been cancelled")]
    Cancelled,
    #[error("This is not allowed")]
    Forbidden,
}

impl Error {
    /// Failures that may disappear if the same organization
    /// is reconciled again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::GeocodeTransient(_) => true,
            Self::Persistence(err) => !matches!(err, repositories::Error::NotFound),
            _ => false,
        }
    }

    /// Failures that will reoccur until the stored record changes.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::GeocodeNotFound
                | Self::AddressUnavailable
                | Self::Persistence(repositories::Error::NotFound)
        )
    }
}

impl From<GeocodeError> for Error {
    fn from(err: GeocodeError) -> Self {
        match err {
            GeocodeError::NotFound => Self::GeocodeNotFound,
            GeocodeError::Transient(msg) => Self::GeocodeTransient(msg),
        }
    }
}

impl From<authorization::organization::Error> for Error {
    fn from(_: authorization::organization::Error) -> Self {
        Self::Forbidden
    }
}
