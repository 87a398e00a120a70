use super::prelude::*;
use itertools::Itertools;

fn non_blank(component: &Option<String>) -> Option<&str> {
    component
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn components(addr: &Address) -> [&Option<String>; 5] {
    [
        &addr.street,
        &addr.city,
        &addr.state,
        &addr.zip,
        &addr.country,
    ]
}

/// The address of an organization with every component taken from the
/// nested location if present there, or else from the flat top-level
/// fields. Blank components are dropped.
pub fn effective_address(org: &Organization) -> Address {
    let flat = components(&org.address);
    let nested = org.location.address.as_ref().map(components);
    let [street, city, state, zip, country]: [Option<String>; 5] = std::array::from_fn(|i| {
        nested
            .and_then(|nested| non_blank(nested[i]))
            .or_else(|| non_blank(flat[i]))
            .map(ToOwned::to_owned)
    });
    Address {
        street,
        city,
        state,
        zip,
        country,
    }
}

fn format_query(addr: &Address) -> String {
    let state_zip = [&addr.state, &addr.zip].into_iter().flatten().join(" ");
    // The joined string must be owned before `state_zip` is dropped
    let query = [
        addr.street.as_deref(),
        addr.city.as_deref(),
        Some(state_zip.as_str()).filter(|s| !s.is_empty()),
        addr.country.as_deref(),
    ]
    .into_iter()
    .flatten()
    .join(", ");
    query
}

/// Free-text query for a geocoding service, e.g. `123 Main St, Denton, TX 76201`.
///
/// Returns an empty string if the organization has no usable address.
pub fn geocoding_query(org: &Organization) -> String {
    format_query(&effective_address(org))
}
