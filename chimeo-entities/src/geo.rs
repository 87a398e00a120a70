use std::fmt;

use thiserror::Error;

const LAT_DEG_MIN: f64 = -90.0;
const LAT_DEG_MAX: f64 = 90.0;
const LNG_DEG_MIN: f64 = -180.0;
const LNG_DEG_MAX: f64 = 180.0;

/// A WGS84 position in degrees.
///
/// Only valid positions can be constructed: both coordinates are finite
/// and within their respective ranges.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MapPoint {
    lat: f64,
    lng: f64,
}

#[derive(Debug, Error, PartialEq)]
pub enum MapPointError {
    #[error("Invalid latitude degrees: {0}")]
    Latitude(f64),
    #[error("Invalid longitude degrees: {0}")]
    Longitude(f64),
}

impl MapPoint {
    pub fn try_from_lat_lng_deg<LAT: Into<f64>, LNG: Into<f64>>(
        lat: LAT,
        lng: LNG,
    ) -> Result<Self, MapPointError> {
        let lat = lat.into();
        let lng = lng.into();
        if !lat.is_finite() || !(LAT_DEG_MIN..=LAT_DEG_MAX).contains(&lat) {
            return Err(MapPointError::Latitude(lat));
        }
        if !lng.is_finite() || !(LNG_DEG_MIN..=LNG_DEG_MAX).contains(&lng) {
            return Err(MapPointError::Longitude(lng));
        }
        Ok(Self { lat, lng })
    }

    pub const fn lat_deg(self) -> f64 {
        self.lat
    }

    pub const fn lng_deg(self) -> f64 {
        self.lng
    }

    pub fn to_lat_lng_rad(self) -> (f64, f64) {
        (self.lat.to_radians(), self.lng.to_radians())
    }

    /// Older clients stored `(0.0, 0.0)` to mean "no position".
    pub fn is_null_island(self) -> bool {
        self.lat == 0.0 && self.lng == 0.0
    }
}

impl fmt::Display for MapPoint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd)]
pub struct Distance(f64);

impl Distance {
    pub const fn from_meters(meters: f64) -> Self {
        Self(meters)
    }

    pub const fn to_meters(self) -> f64 {
        self.0
    }

    pub fn is_valid(self) -> bool {
        self.0 >= 0.0
    }
}

impl fmt::Display for Distance {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{:.1} m", self.0)
    }
}

const MEAN_EARTH_RADIUS: Distance = Distance::from_meters(6_371_200.0);

impl MapPoint {
    /// Calculate the great-circle distance on the surface
    /// of the earth using a special case of the Vincenty
    /// formula for numerical accuracy.
    /// Reference: <https://en.wikipedia.org/wiki/Great-circle_distance>
    ///
    /// The result does not depend on the order of the arguments.
    pub fn distance(p1: MapPoint, p2: MapPoint) -> Distance {
        let (p1, p2) = if (p1.lat, p1.lng) <= (p2.lat, p2.lng) {
            (p1, p2)
        } else {
            (p2, p1)
        };
        let (lat1_rad, lng1_rad) = p1.to_lat_lng_rad();
        let (lat2_rad, lng2_rad) = p2.to_lat_lng_rad();

        let (lat1_sin, lat1_cos) = lat1_rad.sin_cos();
        let (lat2_sin, lat2_cos) = lat2_rad.sin_cos();

        let dlng = (lng1_rad - lng2_rad).abs();
        let (dlng_sin, dlng_cos) = dlng.sin_cos();

        let nom1 = lat2_cos * dlng_sin;
        let nom2 = lat1_cos * lat2_sin - lat1_sin * lat2_cos * dlng_cos;

        let nom = (nom1 * nom1 + nom2 * nom2).sqrt();
        let denom = lat1_sin * lat2_sin + lat1_cos * lat2_cos * dlng_cos;

        Distance::from_meters(MEAN_EARTH_RADIUS.to_meters() * nom.atan2(denom))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> MapPoint {
        MapPoint::try_from_lat_lng_deg(lat, lng).unwrap()
    }

    #[test]
    fn reject_out_of_range_coordinates() {
        assert_eq!(
            Err(MapPointError::Latitude(90.000001)),
            MapPoint::try_from_lat_lng_deg(90.000001, 0.0)
        );
        assert_eq!(
            Err(MapPointError::Longitude(-180.000001)),
            MapPoint::try_from_lat_lng_deg(0.0, -180.000001)
        );
        assert!(MapPoint::try_from_lat_lng_deg(f64::NAN, 0.0).is_err());
        assert!(MapPoint::try_from_lat_lng_deg(0.0, f64::INFINITY).is_err());
        assert!(MapPoint::try_from_lat_lng_deg(-90, 180).is_ok());
    }

    #[test]
    fn null_island() {
        assert!(pt(0.0, 0.0).is_null_island());
        assert!(!pt(0.0, 0.0001).is_null_island());
        assert!(!pt(33.2148, -97.1331).is_null_island());
    }

    #[test]
    fn no_distance() {
        let p1 = pt(0.0, 0.0);
        assert_eq!(MapPoint::distance(p1, p1).to_meters(), 0.0);

        let p2 = pt(-25.0, 55.0);
        assert_eq!(MapPoint::distance(p2, p2).to_meters(), 0.0);

        let p1 = pt(-15.0, -180.0);
        let p2 = pt(-15.0, 180.0);
        assert!(MapPoint::distance(p1, p2).to_meters() < 0.000001);
    }

    #[test]
    fn real_distance() {
        let denton = pt(33.2148, -97.1331);
        let dallas = pt(32.7767, -96.7970);
        assert!(MapPoint::distance(denton, dallas) > Distance::from_meters(57_000.0));
        assert!(MapPoint::distance(denton, dallas) < Distance::from_meters(59_000.0));

        let new_york = pt(40.714268, -74.005974);
        let sidney = pt(-33.867138, 151.207108);
        assert!(MapPoint::distance(new_york, sidney) > Distance::from_meters(15_985_000.0));
        assert!(MapPoint::distance(new_york, sidney) < Distance::from_meters(15_995_000.0));
    }

    #[test]
    fn symetric_distance() {
        let a = pt(80.0, 0.0);
        let b = pt(90.0, 20.0);
        assert_eq!(MapPoint::distance(a, b), MapPoint::distance(b, a));

        let a = pt(0.0, 0.0);
        let b = pt(10.0, 0.0);
        assert_eq!(MapPoint::distance(a, b), MapPoint::distance(b, a));

        let denton = pt(33.2148, -97.1331);
        let dallas = pt(32.7767, -96.7970);
        assert_eq!(
            MapPoint::distance(denton, dallas),
            MapPoint::distance(dallas, denton)
        );
    }

    #[test]
    fn short_distance() {
        // One thousandth of a degree of latitude is roughly 111 meters.
        let a = pt(33.2148, -97.1331);
        let b = pt(33.2158, -97.1331);
        let d = MapPoint::distance(a, b).to_meters();
        assert!(d > 110.0 && d < 112.0, "{d}");
    }
}
