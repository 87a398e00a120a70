use super::{detect_drift::DriftDetector, geocoding_query::*, prelude::*};

#[derive(Debug, Clone, PartialEq)]
pub enum LocationPlan {
    /// The stored position is close enough to the geocoded one.
    Unchanged { drift: Distance },
    Update(LocationUpdate),
}

#[derive(Debug, Clone, PartialEq)]
pub enum LocationOutcome {
    Updated(LocationUpdate),
    Unchanged { drift: Distance },
}

/// Address components reported by the geocoder replace the stored ones.
/// The street is never replaced.
fn merge_address(previous: Address, resolved: GeocodeResult) -> Address {
    let Address {
        street,
        city,
        state,
        zip,
        country,
    } = previous;
    let GeocodeResult {
        city: resolved_city,
        state: resolved_state,
        zip: resolved_zip,
        country: resolved_country,
        ..
    } = resolved;
    Address {
        street,
        city: resolved_city.or(city),
        state: resolved_state.or(state),
        zip: resolved_zip.or(zip),
        country: resolved_country.or(country),
    }
}

/// Resolve the address of an organization and decide if its
/// stored position has to be replaced.
///
/// Nothing is written.
pub fn plan_location_update<G>(
    gateway: &G,
    detector: &DriftDetector,
    org: &Organization,
) -> Result<LocationPlan>
where
    G: GeoCodingGateway + ?Sized,
{
    let query = geocoding_query(org);
    if query.is_empty() {
        log::debug!("Organization {} has no usable address", org.id);
        return Err(Error::AddressUnavailable);
    }
    let resolved = gateway.resolve_address(&query)?;
    if let Some(formatted) = &resolved.formatted {
        log::debug!("Resolved '{query}' of organization {} as '{formatted}'", org.id);
    }
    let stored = org.pos();
    if !detector.needs_update(stored, resolved.pos) {
        let drift = detector.drift(stored, resolved.pos).unwrap_or_default();
        log::debug!(
            "Position of organization {} drifted only {drift} from '{query}'",
            org.id
        );
        return Ok(LocationPlan::Unchanged { drift });
    }
    let pos = resolved.pos;
    let address = merge_address(effective_address(org), resolved);
    Ok(LocationPlan::Update(LocationUpdate {
        pos,
        address,
        updated_at: Timestamp::now(),
    }))
}

pub fn apply_location_update<R>(repo: &R, id: &str, update: &LocationUpdate) -> Result<()>
where
    R: OrganizationRepo + ?Sized,
{
    repo.update_location(id, update).map_err(|err| {
        log::warn!("Failed to store location of organization {id}: {err}");
        err
    })?;
    log::info!("Updated position of organization {id} to {}", update.pos);
    Ok(())
}

/// Plan and apply a location update for a single organization.
pub fn reconcile_organization_location<R, G>(
    repo: &R,
    gateway: &G,
    detector: &DriftDetector,
    org: &Organization,
) -> Result<LocationOutcome>
where
    R: OrganizationRepo + ?Sized,
    G: GeoCodingGateway + ?Sized,
{
    match plan_location_update(gateway, detector, org)? {
        LocationPlan::Unchanged { drift } => Ok(LocationOutcome::Unchanged { drift }),
        LocationPlan::Update(update) => {
            apply_location_update(repo, org.id.as_str(), &update)?;
            Ok(LocationOutcome::Updated(update))
        }
    }
}
