//! # chimeo-application
//!
//! Runs reconciliation passes over many organizations: bounded
//! concurrency, one writer per organization, cancellation and retries.

mod locks;
mod reconcile;
mod report;

pub mod prelude {
    pub use super::{reconcile::*, report::*};
    pub use tokio_util::sync::{CancellationToken, DropGuard};
}

pub(crate) use chimeo_core::{
    authorization,
    entities::*,
    gateways::geocode::*,
    repositories::OrganizationRepo,
    usecases,
};

#[cfg(test)]
pub(crate) mod tests;
