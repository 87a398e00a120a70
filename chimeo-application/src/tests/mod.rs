
pub mod prelude {

    use std::{
        collections::HashMap,
        sync::atomic::{AtomicUsize, Ordering},
        thread,
        time::Duration,
    };

    use parking_lot::Mutex;

    pub use crate::prelude::*;
    pub use chimeo_core::{
        entities::*,
        gateways::geocode::*,
        repositories::{Error as RepoError, OrganizationRepo},
        usecases,
    };
    pub use chimeo_entities::builders::*;
    pub use std::sync::Arc;

    pub fn pt(lat: f64, lng: f64) -> MapPoint {
        MapPoint::try_from_lat_lng_deg(lat, lng).unwrap()
    }

    pub fn geocoded(lat: f64, lng: f64) -> GeocodeResult {
        GeocodeResult::new(pt(lat, lng))
    }

    pub fn denton_address() -> Address {
        Address::build()
            .street("123 Main St")
            .city("Denton")
            .state("TX")
            .zip("76201")
            .finish()
    }

    pub const DENTON_QUERY: &str = "123 Main St, Denton, TX 76201";

    pub fn org_at(id: &str, lat: f64, lng: f64, street: &str) -> Organization {
        Organization::build()
            .id(id)
            .lat_lng(lat, lng)
            .flat_address(Address::build().street(street).finish())
            .admin("admin")
            .finish()
    }

    pub fn fast_retries(max_attempts: u32) -> ReconcilerConfig {
        ReconcilerConfig {
            retry: RetryPolicy {
                max_attempts,
                backoff: Duration::from_millis(1),
            },
            ..Default::default()
        }
    }

    #[derive(Default)]
    pub struct MockDb {
        pub orgs: Mutex<Vec<Organization>>,
        pub writes: AtomicUsize,
        pub failing_writes: AtomicUsize,
    }

    impl MockDb {
        pub fn with(orgs: Vec<Organization>) -> Self {
            Self {
                orgs: Mutex::new(orgs),
                ..Default::default()
            }
        }

        pub fn writes(&self) -> usize {
            self.writes.load(Ordering::SeqCst)
        }

        pub fn fail_next_writes(&self, count: usize) {
            self.failing_writes.store(count, Ordering::SeqCst);
        }
    }

    impl OrganizationRepo for MockDb {
        fn create_organization(&self, org: Organization) -> Result<(), RepoError> {
            let mut orgs = self.orgs.lock();
            if orgs.iter().any(|x| x.id == org.id) {
                return Err(RepoError::AlreadyExists);
            }
            orgs.push(org);
            Ok(())
        }

        fn get_organization(&self, id: &str) -> Result<Organization, RepoError> {
            self.orgs
                .lock()
                .iter()
                .find(|x| x.id.as_str() == id)
                .cloned()
                .ok_or(RepoError::NotFound)
        }

        fn all_organizations(&self) -> Result<Vec<Organization>, RepoError> {
            Ok(self.orgs.lock().clone())
        }

        fn update_location(&self, id: &str, update: &LocationUpdate) -> Result<(), RepoError> {
            if self
                .failing_writes
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(RepoError::Io(std::io::Error::other("disk full")));
            }
            let mut orgs = self.orgs.lock();
            let org = orgs
                .iter_mut()
                .find(|x| x.id.as_str() == id)
                .ok_or(RepoError::NotFound)?;
            org.apply_location_update(update);
            self.writes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    /// Resolves the queries it has been told about, everything else is not found.
    #[derive(Default)]
    pub struct MockGeocoder {
        responses: HashMap<String, Result<GeocodeResult, GeocodeError>>,
        /// Number of calls that fail with a service error before
        /// the configured responses are returned.
        failing_calls: AtomicUsize,
        delay: Option<Duration>,
        cancel_on_call: Option<CancellationToken>,
        pub calls: AtomicUsize,
        in_flight: AtomicUsize,
        pub max_in_flight: AtomicUsize,
    }

    impl MockGeocoder {
        pub fn with(mut self, query: &str, response: Result<GeocodeResult, GeocodeError>) -> Self {
            self.responses.insert(query.to_owned(), response);
            self
        }

        pub fn failing_first(self, count: usize) -> Self {
            self.failing_calls.store(count, Ordering::SeqCst);
            self
        }

        pub fn delayed(mut self, delay: Duration) -> Self {
            self.delay = Some(delay);
            self
        }

        pub fn cancel_on_call(mut self, token: CancellationToken) -> Self {
            self.cancel_on_call = Some(token);
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl GeoCodingGateway for MockGeocoder {
        fn resolve_address(&self, query: &str) -> Result<GeocodeResult, GeocodeError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let in_flight = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(in_flight, Ordering::SeqCst);
            if let Some(delay) = self.delay {
                thread::sleep(delay);
            }
            if let Some(token) = &self.cancel_on_call {
                token.cancel();
            }
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if self
                .failing_calls
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok()
            {
                return Err(GeocodeError::Transient("503 Service Unavailable".into()));
            }
            self.responses
                .get(query)
                .cloned()
                .unwrap_or(Err(GeocodeError::NotFound))
        }
    }
}
