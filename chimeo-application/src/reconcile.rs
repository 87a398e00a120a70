use std::{collections::HashSet, sync::Arc, time::Duration};

use tokio::{
    sync::{OwnedMutexGuard, Semaphore},
    task::JoinSet,
};
use tokio_util::sync::CancellationToken;

use crate::{
    authorization::organization::authorize_organization_admin,
    locks::LockTable,
    report::{OrganizationResult, ReconciliationReport},
    usecases::{self, DriftDetector, Error, LocationOutcome, LocationPlan},
    Distance, GeoCodingGateway, Id, Organization, OrganizationRepo,
};

type Result<T> = std::result::Result<T, Error>;

/// Which organizations of a list take part in a pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    /// Only organizations without a valid position.
    MissingPosition,
    All,
}

impl Selection {
    fn includes(self, org: &Organization) -> bool {
        match self {
            Self::MissingPosition => !org.location.has_valid_pos(),
            Self::All => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Including the first attempt.
    pub max_attempts: u32,
    /// Fixed delay between two attempts.
    pub backoff: Duration,
}

impl RetryPolicy {
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            backoff: Duration::ZERO,
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_millis(500),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilerConfig {
    pub drift_threshold: Distance,
    /// Number of organizations that are processed at the same time.
    pub max_concurrency: usize,
    pub retry: RetryPolicy,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            drift_threshold: usecases::DEFAULT_DRIFT_THRESHOLD,
            max_concurrency: 1,
            retry: RetryPolicy::default(),
        }
    }
}

/// Keeps the stored positions of organizations in sync with their addresses.
///
/// Store and gateway calls are blocking and run on the blocking thread pool.
/// All passes of one reconciler share the per-organization locks, so two
/// passes never write the same organization concurrently.
pub struct Reconciler<R, G> {
    worker: Worker<R, G>,
    max_concurrency: usize,
}

struct Worker<R, G> {
    repo: Arc<R>,
    gateway: Arc<G>,
    detector: DriftDetector,
    retry: RetryPolicy,
    locks: LockTable,
}

impl<R, G> Clone for Worker<R, G> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            gateway: Arc::clone(&self.gateway),
            detector: self.detector,
            retry: self.retry,
            locks: self.locks.clone(),
        }
    }
}

async fn run_blocking<T, F>(f: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    match tokio::task::spawn_blocking(f).await {
        Ok(res) => res,
        Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
        // The runtime is shutting down
        Err(_) => Err(Error::Cancelled),
    }
}

impl<R, G> Worker<R, G>
where
    R: OrganizationRepo + Send + Sync + 'static,
    G: GeoCodingGateway + Send + Sync + 'static,
{
    async fn with_retries<T, F>(&self, id: &Id, cancel: &CancellationToken, op: F) -> Result<T>
    where
        F: Fn() -> Result<T> + Send + Sync + 'static,
        T: Send + 'static,
    {
        let op = Arc::new(op);
        let mut attempt = 1;
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            let next = Arc::clone(&op);
            match run_blocking(move || (*next)()).await {
                Err(err) if err.is_retryable() && attempt < self.retry.max_attempts => {
                    log::info!(
                        "Attempt {attempt} of {} for organization {id} failed: {err}",
                        self.retry.max_attempts
                    );
                    tokio::select! {
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        _ = tokio::time::sleep(self.retry.backoff) => {}
                    }
                    attempt += 1;
                }
                res => return res,
            }
        }
    }

    async fn lock(&self, id: &Id, cancel: &CancellationToken) -> Result<OwnedMutexGuard<()>> {
        tokio::select! {
            _ = cancel.cancelled() => Err(Error::Cancelled),
            guard = self.locks.lock(id) => Ok(guard),
        }
    }

    async fn load(&self, id: &Id) -> Result<Organization> {
        let repo = Arc::clone(&self.repo);
        let id = id.clone();
        run_blocking(move || Ok(repo.get_organization(id.as_str())?)).await
    }

    /// The caller must hold the lock of the organization.
    async fn reconcile_locked(
        &self,
        org: Organization,
        cancel: &CancellationToken,
    ) -> Result<LocationOutcome> {
        let id = org.id.clone();
        let plan = {
            let gateway = Arc::clone(&self.gateway);
            let detector = self.detector;
            self.with_retries(&id, cancel, move || {
                usecases::plan_location_update(&*gateway, &detector, &org)
            })
            .await?
        };
        let update = match plan {
            LocationPlan::Unchanged { drift } => return Ok(LocationOutcome::Unchanged { drift }),
            LocationPlan::Update(update) => update,
        };
        if cancel.is_cancelled() {
            log::info!("Discarding resolved position of organization {id}: cancelled");
            return Err(Error::Cancelled);
        }
        {
            let repo = Arc::clone(&self.repo);
            let org_id = id.clone();
            let update = update.clone();
            self.with_retries(&id, cancel, move || {
                usecases::apply_location_update(&*repo, org_id.as_str(), &update)
            })
            .await?;
        }
        Ok(LocationOutcome::Updated(update))
    }

    /// Returns the outcome together with the stored state of the
    /// organization after this step.
    async fn reconcile(
        &self,
        id: &Id,
        cancel: &CancellationToken,
    ) -> Result<(LocationOutcome, Organization)> {
        let _guard = self.lock(id, cancel).await?;
        // Reload under the lock: a concurrent pass may have
        // updated the organization in the meantime.
        let mut org = self.load(id).await?;
        let outcome = self.reconcile_locked(org.clone(), cancel).await?;
        if let LocationOutcome::Updated(update) = &outcome {
            org.apply_location_update(update);
        }
        Ok((outcome, org))
    }
}

fn log_result(id: &Id, result: &OrganizationResult) {
    match result {
        Ok(LocationOutcome::Updated(_)) => {}
        Ok(LocationOutcome::Unchanged { drift }) => {
            log::debug!("Position of organization {id} is up to date (drift: {drift})");
        }
        Err(Error::AddressUnavailable) => {
            log::warn!("Skipping organization {id}: no usable address");
        }
        Err(Error::Cancelled) => {
            log::debug!("Reconciliation of organization {id} has been cancelled");
        }
        Err(err) => {
            log::warn!("Failed to reconcile location of organization {id}: {err}");
        }
    }
}

impl<R, G> Reconciler<R, G>
where
    R: OrganizationRepo + Send + Sync + 'static,
    G: GeoCodingGateway + Send + Sync + 'static,
{
    pub fn new(repo: Arc<R>, gateway: Arc<G>, config: ReconcilerConfig) -> Self {
        let ReconcilerConfig {
            drift_threshold,
            max_concurrency,
            retry,
        } = config;
        let worker = Worker {
            repo,
            gateway,
            detector: DriftDetector::new(drift_threshold),
            retry,
            locks: LockTable::default(),
        };
        Self {
            worker,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Reconcile the selected organizations of a list.
    ///
    /// Every listed organization that has been reconciled is replaced
    /// by its stored state, including positions written by other passes. Failures of single organizations
    /// never abort the pass; they are collected in the report.
    pub async fn reconcile(
        &self,
        organizations: &mut [Organization],
        selection: Selection,
        cancel: &CancellationToken,
    ) -> ReconciliationReport {
        let workers = Arc::new(Semaphore::new(self.max_concurrency));
        let mut seen = HashSet::new();
        let mut tasks = JoinSet::new();
        for (index, org) in organizations.iter().enumerate() {
            if !selection.includes(org) {
                continue;
            }
            if !seen.insert(org.id.clone()) {
                log::debug!("Organization {} is listed more than once", org.id);
                continue;
            }
            let worker = self.worker.clone();
            let workers = Arc::clone(&workers);
            let cancel = cancel.clone();
            let id = org.id.clone();
            tasks.spawn(async move {
                let result = async {
                    let _permit = tokio::select! {
                        _ = cancel.cancelled() => return Err(Error::Cancelled),
                        permit = workers.acquire_owned() => permit.map_err(|_| Error::Cancelled)?,
                    };
                    worker.reconcile(&id, &cancel).await
                }
                .await;
                (index, id, result)
            });
        }
        log::info!("Reconciling the locations of {} organizations", tasks.len());

        let mut done = Vec::with_capacity(tasks.len());
        while let Some(joined) = tasks.join_next().await {
            let (index, id, result) = match joined {
                Ok(finished) => finished,
                Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
                Err(err) => {
                    log::error!("Reconciliation task has been aborted: {err}");
                    continue;
                }
            };
            let result = result.map(|(outcome, stored)| {
                if organizations[index] != stored {
                    log::debug!("Refreshing the listed copy of organization {id}");
                    organizations[index] = stored;
                }
                outcome
            });
            log_result(&id, &result);
            done.push((index, id, result));
        }
        done.sort_by_key(|(index, _, _)| *index);

        let mut report = ReconciliationReport::default();
        for (_, id, result) in done {
            report.push(id, result);
        }
        report.cancelled = cancel.is_cancelled();
        log::info!(
            "Reconciled {} organizations: {} updated, {} unchanged, {} skipped, {} failed{}",
            report.entries.len(),
            report.updated(),
            report.unchanged(),
            report.skipped(),
            report.failed(),
            if report.cancelled { " (cancelled)" } else { "" }
        );
        report
    }

    /// Load all organizations from the store and reconcile them.
    pub async fn reconcile_stored(
        &self,
        selection: Selection,
        cancel: &CancellationToken,
    ) -> Result<(Vec<Organization>, ReconciliationReport)> {
        let repo = Arc::clone(&self.worker.repo);
        let mut organizations = run_blocking(move || Ok(repo.all_organizations()?)).await?;
        let report = self.reconcile(&mut organizations, selection, cancel).await;
        Ok((organizations, report))
    }

    /// Reconcile a single organization on behalf of one of its admins.
    pub async fn reconcile_organization_as(
        &self,
        user_id: &str,
        id: &Id,
        cancel: &CancellationToken,
    ) -> Result<LocationOutcome> {
        let _guard = self.worker.lock(id, cancel).await?;
        let org = self.worker.load(id).await?;
        authorize_organization_admin(&org, user_id)?;
        let result = self.worker.reconcile_locked(org, cancel).await;
        log_result(id, &result);
        result
    }
}
