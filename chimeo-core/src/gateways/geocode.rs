use chimeo_entities::geo::MapPoint;
use thiserror::Error;

/// The first placemark a geocoding service resolved for an address.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    pub pos: MapPoint,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip: Option<String>,
    pub country: Option<String>,
    /// The full address as formatted by the service.
    pub formatted: Option<String>,
}

impl GeocodeResult {
    pub fn new(pos: MapPoint) -> Self {
        Self {
            pos,
            city: None,
            state: None,
            zip: None,
            country: None,
            formatted: None,
        }
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeocodeError {
    #[error("No location found for the address")]
    NotFound,
    #[error("Geocoding service unavailable: {0}")]
    Transient(String),
}

pub trait GeoCodingGateway {
    fn resolve_address(&self, query: &str) -> Result<GeocodeResult, GeocodeError>;
}
