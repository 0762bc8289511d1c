use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::error::FeedResult;
use crate::grouping::{self, NotificationGroup};
use crate::model::{NotificationId, NotificationRecord, UserId};
use crate::store::NotificationStore;

/// State of a local read flip the store has not acknowledged yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStatus {
    InFlight,
    Failed,
}

/// Result of a local read flip and its store writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkOutcome {
    pub flipped: usize,
    /// Writes the store rejected; those records stay read locally.
    pub failed: usize,
}

/// Owns the in-memory record projection and its read flags.
///
/// Read flips are applied locally first and persisted afterwards. Every id
/// ever seen read is remembered, so reloading from the store can never turn
/// a record unread again. Unacknowledged flips live in a small command log;
/// failed ones are re-issued by [`ReadStateCoordinator::retry_unconfirmed`].
pub struct ReadStateCoordinator {
    store: Arc<dyn NotificationStore>,
    user_id: UserId,
    state: Mutex<ReadState>,
}

#[derive(Default)]
struct ReadState {
    records: Vec<NotificationRecord>,
    read_ids: HashSet<NotificationId>,
    unconfirmed: HashMap<NotificationId, WriteStatus>,
}

impl ReadState {
    /// Flips every unread record in `targets`, returning the ids that changed.
    fn flip(&mut self, targets: &HashSet<NotificationId>) -> Vec<NotificationId> {
        let mut flipped = Vec::new();
        for record in self
            .records
            .iter_mut()
            .filter(|r| !r.read && targets.contains(&r.id))
        {
            record.read = true;
            flipped.push(record.id.clone());
        }
        for id in &flipped {
            self.read_ids.insert(id.clone());
            self.unconfirmed.insert(id.clone(), WriteStatus::InFlight);
        }
        flipped
    }

    /// Merges locally known read flags into records fresh from the store.
    fn reconcile(&mut self, record: &mut NotificationRecord) {
        if record.read {
            self.read_ids.insert(record.id.clone());
        } else if self.read_ids.contains(&record.id) {
            record.read = true;
        }
    }
}

impl ReadStateCoordinator {
    pub fn new(store: Arc<dyn NotificationStore>, user_id: UserId) -> Self {
        Self {
            store,
            user_id,
            state: Mutex::new(ReadState::default()),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    pub fn records(&self) -> Vec<NotificationRecord> {
        self.state.lock().records.clone()
    }

    pub fn len(&self) -> usize {
        self.state.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.lock().records.is_empty()
    }

    pub fn groups(&self) -> Vec<NotificationGroup> {
        let state = self.state.lock();
        grouping::group(&state.records)
    }

    /// Always counted from the current records.
    pub fn unread_total(&self) -> usize {
        self.state.lock().records.iter().filter(|r| !r.read).count()
    }

    pub fn is_read(&self, id: &NotificationId) -> Option<bool> {
        self.state
            .lock()
            .records
            .iter()
            .find(|r| &r.id == id)
            .map(|r| r.read)
    }

    pub fn write_status(&self, id: &NotificationId) -> Option<WriteStatus> {
        self.state.lock().unconfirmed.get(id).copied()
    }

    /// Swaps in a freshly fetched record set, keeping local read flips.
    pub fn replace(&self, fresh: Vec<NotificationRecord>) {
        let mut state = self.state.lock();
        let mut seen = HashSet::new();
        let mut records = Vec::with_capacity(fresh.len());
        for mut record in fresh {
            if !seen.insert(record.id.clone()) {
                continue;
            }
            state.reconcile(&mut record);
            records.push(record);
        }
        debug!(count = records.len(), "Replaced notification records");
        state.records = records;
    }

    /// Appends a page, skipping ids already present. Returns how many were added.
    pub fn append(&self, page: Vec<NotificationRecord>) -> usize {
        let mut state = self.state.lock();
        let mut seen: HashSet<NotificationId> =
            state.records.iter().map(|r| r.id.clone()).collect();
        let mut added = 0;
        for mut record in page {
            if !seen.insert(record.id.clone()) {
                continue;
            }
            state.reconcile(&mut record);
            state.records.push(record);
            added += 1;
        }
        debug!(added, total = state.records.len(), "Appended notification records");
        added
    }

    /// Marks one record read. Nothing is flipped when it was already read or
    /// is unknown. A failed write keeps the local flip.
    pub async fn mark_read(&self, id: &NotificationId) -> MarkOutcome {
        let targets = HashSet::from([id.clone()]);
        let flipped = self.state.lock().flip(&targets);
        if flipped.is_empty() {
            debug!(%id, "Notification already read");
        }
        self.write_through(flipped).await
    }

    /// Marks every unread member of `group` read in one local update, then
    /// writes each of them to the store.
    pub async fn mark_group_read(&self, group: &NotificationGroup) -> MarkOutcome {
        let flipped = self.flip_group(group);
        self.write_through(flipped).await
    }

    /// Local half of [`mark_group_read`](Self::mark_group_read): flips the
    /// unread members and returns their ids for [`persist`](Self::persist).
    pub fn flip_group(&self, group: &NotificationGroup) -> Vec<NotificationId> {
        let targets: HashSet<NotificationId> = group.unread_ids().into_iter().collect();
        if targets.is_empty() {
            return Vec::new();
        }
        let flipped = self.state.lock().flip(&targets);
        debug!(group = %group.key(), count = flipped.len(), "Marking group read");
        flipped
    }

    /// Bulk write first; local records only change once the store confirms.
    pub async fn mark_all_read(&self) -> FeedResult<usize> {
        if let Err(e) = self.store.mark_all_read(&self.user_id).await {
            warn!(user_id = %self.user_id, error = %e, "Mark all read failed");
            return Err(e);
        }

        let mut state = self.state.lock();
        let mut flipped = Vec::new();
        for record in state.records.iter_mut().filter(|r| !r.read) {
            record.read = true;
            flipped.push(record.id.clone());
        }
        state.read_ids.extend(flipped.iter().cloned());
        state.unconfirmed.clear();
        info!(user_id = %self.user_id, count = flipped.len(), "Marked all notifications read");
        Ok(flipped.len())
    }

    /// Re-issues writes that previously failed. Returns how many were retried.
    pub async fn retry_unconfirmed(&self) -> usize {
        let retry: Vec<NotificationId> = {
            let mut state = self.state.lock();
            let failed: Vec<NotificationId> = state
                .unconfirmed
                .iter()
                .filter(|(_, status)| **status == WriteStatus::Failed)
                .map(|(id, _)| id.clone())
                .collect();
            for id in &failed {
                state.unconfirmed.insert(id.clone(), WriteStatus::InFlight);
            }
            failed
        };

        let count = retry.len();
        if count > 0 {
            info!(count, "Retrying unconfirmed read writes");
            self.persist(retry).await;
        }
        count
    }

    async fn write_through(&self, flipped: Vec<NotificationId>) -> MarkOutcome {
        let count = flipped.len();
        let failed = self.persist(flipped).await;
        MarkOutcome {
            flipped: count,
            failed,
        }
    }

    /// Writes already-flipped ids to the store. Returns how many writes failed.
    pub async fn persist(&self, ids: Vec<NotificationId>) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let writes = ids.iter().map(|id| self.store.mark_one_read(id));
        let results = join_all(writes).await;

        let mut failed = 0;
        let mut state = self.state.lock();
        for (id, result) in ids.iter().zip(results) {
            match result {
                Ok(()) => {
                    state.unconfirmed.remove(id);
                    debug!(%id, "Read state persisted");
                }
                Err(e) => {
                    // bulk mark-all may have confirmed it meanwhile
                    if state.unconfirmed.contains_key(id) {
                        state.unconfirmed.insert(id.clone(), WriteStatus::Failed);
                    }
                    warn!(%id, error = %e, "Failed to persist read state");
                    failed += 1;
                }
            }
        }
        failed
    }
}
