mod detect_drift;
mod error;
mod geocoding_query;
mod reconcile_location;


pub use self::{detect_drift::*, error::Error, geocoding_query::*, reconcile_location::*};

mod prelude {
    pub use super::error::Error;
    pub type Result<T> = std::result::Result<T, Error>;
    pub use crate::{entities::*, gateways::geocode::*, repositories::*};
}
