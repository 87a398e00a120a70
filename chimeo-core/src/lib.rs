//! # chimeo-core
//!
//! Business logic for keeping the positions of organizations in sync
//! with their postal addresses.

pub mod authorization;
pub mod gateways;
pub mod repositories;
pub mod usecases;

pub mod entities {
    pub use chimeo_entities::{
        address::*, contact::*, geo::*, id::*, location::*, organization::*, time::*,
    };
}
