use std::{collections::HashMap, sync::Arc};

use parking_lot::Mutex;
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::Id;

/// One async lock per organization, shared by all passes of a reconciler.
///
/// Holding the guard is required for reading a fresh copy of an
/// organization and writing its location back.
#[derive(Debug, Default, Clone)]
pub(crate) struct LockTable {
    locks: Arc<Mutex<HashMap<Id, Arc<AsyncMutex<()>>>>>,
}

impl LockTable {
    pub(crate) async fn lock(&self, id: &Id) -> OwnedMutexGuard<()> {
        let lock = {
            let mut locks = self.locks.lock();
            // Drop entries nobody holds or waits for
            locks.retain(|_, lock| Arc::strong_count(lock) > 1);
            Arc::clone(locks.entry(id.clone()).or_default())
        };
        lock.lock_owned().await
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.locks.lock().len()
    }
}
