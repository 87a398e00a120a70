use super::prelude::*;

pub const DEFAULT_DRIFT_THRESHOLD: Distance = Distance::from_meters(75.0);

/// Decides if a freshly geocoded position should replace the stored one.
///
/// The threshold is a heuristic that absorbs jitter between geocoder
/// responses for the same address. It is not an accuracy guarantee.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftDetector {
    threshold: Distance,
}

impl Default for DriftDetector {
    fn default() -> Self {
        Self::new(DEFAULT_DRIFT_THRESHOLD)
    }
}

impl DriftDetector {
    pub const fn new(threshold: Distance) -> Self {
        Self { threshold }
    }

    pub const fn threshold(&self) -> Distance {
        self.threshold
    }

    /// Distance between the stored and the geocoded position, if the
    /// stored position is set. The legacy `(0,0)` sentinel counts as unset.
    pub fn drift(&self, stored: Option<MapPoint>, geocoded: MapPoint) -> Option<Distance> {
        stored
            .filter(|pos| !pos.is_null_island())
            .map(|pos| MapPoint::distance(pos, geocoded))
    }

    /// A drift of exactly the threshold is tolerated.
    pub fn needs_update(&self, stored: Option<MapPoint>, geocoded: MapPoint) -> bool {
        match self.drift(stored, geocoded) {
            Some(drift) => drift > self.threshold,
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(lat: f64, lng: f64) -> MapPoint {
        MapPoint::try_from_lat_lng_deg(lat, lng).unwrap()
    }

    #[test]
    fn unset_position_always_needs_update() {
        let detector = DriftDetector::default();
        for geocoded in [pt(0.0, 0.0), pt(33.2148, -97.1331), pt(-89.9, 179.9)] {
            assert!(detector.needs_update(None, geocoded));
            assert!(detector.needs_update(Some(pt(0.0, 0.0)), geocoded));
        }
    }

    #[test]
    fn identical_position_needs_no_update() {
        let detector = DriftDetector::default();
        let denton = pt(33.2148, -97.1331);
        assert!(!detector.needs_update(Some(denton), denton));
        assert_eq!(
            Some(Distance::from_meters(0.0)),
            detector.drift(Some(denton), denton)
        );
    }

    #[test]
    fn default_threshold_of_75_meters() {
        let detector = DriftDetector::default();
        assert_eq!(DEFAULT_DRIFT_THRESHOLD, detector.threshold());
        let stored = pt(33.2148, -97.1331);
        // ~55 m north
        assert!(!detector.needs_update(Some(stored), pt(33.2153, -97.1331)));
        // ~111 m north
        assert!(detector.needs_update(Some(stored), pt(33.2158, -97.1331)));
    }

    #[test]
    fn threshold_boundary_is_tolerated() {
        let a = pt(48.7755, 9.1827);
        let b = pt(48.7760, 9.1830);
        let d = MapPoint::distance(a, b);

        assert!(!DriftDetector::new(d).needs_update(Some(a), b));
        assert!(DriftDetector::new(Distance::from_meters(d.to_meters() - 0.001))
            .needs_update(Some(a), b));
        assert!(!DriftDetector::new(Distance::from_meters(d.to_meters() + 0.001))
            .needs_update(Some(a), b));
    }

    #[test]
    fn configurable_threshold() {
        let stored = pt(33.2148, -97.1331);
        let geocoded = pt(33.2153, -97.1331);
        assert!(!DriftDetector::default().needs_update(Some(stored), geocoded));
        assert!(DriftDetector::new(Distance::from_meters(10.0)).needs_update(Some(stored), geocoded));
    }
}
