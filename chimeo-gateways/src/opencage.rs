use std::collections::HashMap;

use chimeo_core::{
    entities::MapPoint,
    gateways::geocode::{GeoCodingGateway, GeocodeError, GeocodeResult},
};
use geocoding::{opencage::NOBOX, Opencage};
use serde_json::Value;

// Component keys in order of preference.
const CITY_KEYS: &[&str] = &["city", "town", "village", "municipality"];
const STATE_KEYS: &[&str] = &["state_code", "state"];
const ZIP_KEYS: &[&str] = &["postcode"];
const COUNTRY_KEYS: &[&str] = &["country"];

/// Forward geocoding with the OpenCage API.
///
/// Requests are blocking and must not be issued from an async context.
#[derive(Debug, Clone)]
pub struct OpenCage {
    api_key: String,
}

impl OpenCage {
    pub fn new(api_key: String) -> Self {
        Self { api_key }
    }
}

fn first_component(components: &HashMap<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| components.get(*key))
        .find_map(|value| match value {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        })
}

fn geocode_result(
    geometry: &HashMap<String, f64>,
    components: &HashMap<String, Value>,
    formatted: String,
) -> Option<GeocodeResult> {
    let lat = *geometry.get("lat")?;
    let lng = *geometry.get("lng")?;
    let pos = MapPoint::try_from_lat_lng_deg(lat, lng)
        .map_err(|err| log::warn!("OpenCage returned an invalid position: {err}"))
        .ok()?;
    Some(GeocodeResult {
        pos,
        city: first_component(components, CITY_KEYS),
        state: first_component(components, STATE_KEYS),
        zip: first_component(components, ZIP_KEYS),
        country: first_component(components, COUNTRY_KEYS),
        formatted: Some(formatted).filter(|f| !f.is_empty()),
    })
}

impl GeoCodingGateway for OpenCage {
    fn resolve_address(&self, query: &str) -> Result<GeocodeResult, GeocodeError> {
        let oc_req = Opencage::new(self.api_key.clone());
        let res = oc_req.forward_full(query, NOBOX).map_err(|err| {
            log::warn!("Failed to resolve address location '{query}': {err}");
            GeocodeError::Transient(err.to_string())
        })?;
        let Some(first) = res.results.into_iter().next() else {
            log::debug!("No location found for '{query}'");
            return Err(GeocodeError::NotFound);
        };
        let resolved = geocode_result(&first.geometry, &first.components, first.formatted)
            .ok_or(GeocodeError::NotFound)?;
        log::debug!("Resolved address location '{query}': {}", resolved.pos);
        Ok(resolved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn components(value: Value) -> HashMap<String, Value> {
        serde_json::from_value(value).unwrap()
    }

    fn geometry(lat: f64, lng: f64) -> HashMap<String, f64> {
        [("lat".to_owned(), lat), ("lng".to_owned(), lng)]
            .into_iter()
            .collect()
    }

    #[test]
    fn read_us_placemark() {
        let components = components(json!({
            "_type": "building",
            "house_number": "123",
            "road": "Main Street",
            "city": "Denton",
            "county": "Denton County",
            "state": "Texas",
            "state_code": "TX",
            "postcode": "76201",
            "country": "United States",
            "country_code": "us"
        }));
        let res = geocode_result(
            &geometry(33.2148, -97.1331),
            &components,
            "123 Main Street, Denton, TX 76201, United States of America".into(),
        )
        .unwrap();
        assert_eq!(
            MapPoint::try_from_lat_lng_deg(33.2148, -97.1331).unwrap(),
            res.pos
        );
        assert_eq!(Some("Denton".into()), res.city);
        assert_eq!(Some("TX".into()), res.state);
        assert_eq!(Some("76201".into()), res.zip);
        assert_eq!(Some("United States".into()), res.country);
        assert!(res.formatted.is_some());
    }

    #[test]
    fn fall_back_to_town_and_state_name() {
        let components = components(json!({
            "town": "Sanger",
            "state": "Texas",
            "postcode": 76266
        }));
        let res = geocode_result(&geometry(33.36, -97.17), &components, "".into()).unwrap();
        assert_eq!(Some("Sanger".into()), res.city);
        assert_eq!(Some("Texas".into()), res.state);
        assert_eq!(Some("76266".into()), res.zip);
        assert_eq!(None, res.country);
        assert_eq!(None, res.formatted);
    }

    #[test]
    fn reject_incomplete_or_invalid_geometry() {
        let components = HashMap::new();
        let mut incomplete = geometry(33.2, -97.1);
        incomplete.remove("lng");
        assert!(geocode_result(&incomplete, &components, "".into()).is_none());
        assert!(geocode_result(&geometry(91.0, 0.0), &components, "".into()).is_none());
    }
}
