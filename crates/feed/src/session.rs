use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use crate::config::FeedConfig;
use crate::error::{FeedError, FeedResult};
use crate::gesture::{PullGesture, ScrollMetrics};
use crate::grouping::NotificationGroup;
use crate::model::{Cursor, Page, Payload, Subject, Tag, TagId, UserId};
use crate::read_state::ReadStateCoordinator;
use crate::store::NotificationStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
    Ready,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Haptic {
    /// Pull distance crossed the refresh threshold.
    Threshold,
    Success,
    Error,
}

/// Events for the screen layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedSignal {
    Haptic(Haptic),
    Navigate(Subject),
    OpenTag(Tag),
    TagNotFound(TagId),
    /// A read failed; the list on screen is the last good one.
    Stale,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    Applied { records: usize },
    Failed,
    /// A newer load or refresh was triggered while this one was in flight.
    Superseded,
    /// Preconditions not met; nothing was requested.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Activation {
    OpenedTag(Tag),
    TagNotFound(TagId),
    Navigated(Subject),
    Failed,
    Nothing,
}

/// Secondary button on a feed row. Never marks anything read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupAction {
    FollowBack(UserId),
    View(Subject),
}

impl GroupAction {
    pub fn for_group(group: &NotificationGroup) -> Option<Self> {
        match group.most_recent().payload() {
            Payload::Followed { actor } => actor.id.cloned().map(GroupAction::FollowBack),
            payload => payload.subject().map(GroupAction::View),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub phase: Phase,
    pub refreshing: bool,
    pub loading_more: bool,
    pub load_error: bool,
    pub has_more: bool,
    pub generation: u64,
    pub missing_tag: Option<TagId>,
    pub record_count: usize,
    pub unread_total: usize,
}

struct SessionState {
    phase: Phase,
    refreshing: bool,
    loading_more: bool,
    load_error: bool,
    /// Bumped by every load or refresh; responses from older generations are dropped.
    generation: u64,
    cursor: Option<Cursor>,
    has_more: bool,
    at_top: bool,
    pull: PullGesture,
    missing_tag: Option<TagId>,
}

impl SessionState {
    fn new(config: &FeedConfig) -> Self {
        Self {
            phase: Phase::Idle,
            refreshing: false,
            loading_more: false,
            load_error: false,
            generation: 0,
            cursor: None,
            has_more: true,
            at_top: true,
            pull: PullGesture::new(config.refresh_threshold),
            missing_tag: None,
        }
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    fn set_cursor(&mut self, next: Option<Cursor>) {
        self.cursor = next;
        self.has_more = next.is_some();
    }
}

/// One screen's view of the notification feed.
///
/// Owns the record list (through its [`ReadStateCoordinator`]), pagination
/// and the load/refresh state machine. State locks are never held across a
/// store call, so overlapping requests on the same session are fine.
pub struct FeedSession {
    user_id: UserId,
    store: Arc<dyn NotificationStore>,
    read_state: Arc<ReadStateCoordinator>,
    config: FeedConfig,
    state: Mutex<SessionState>,
    signal_tx: broadcast::Sender<FeedSignal>,
}

impl FeedSession {
    /// Returns `(session, signal_receiver)`.
    pub fn new(
        store: Arc<dyn NotificationStore>,
        user_id: UserId,
        config: FeedConfig,
    ) -> (Arc<Self>, broadcast::Receiver<FeedSignal>) {
        let (signal_tx, signal_rx) = broadcast::channel(config.signal_capacity.max(1));
        let read_state = Arc::new(ReadStateCoordinator::new(store.clone(), user_id.clone()));

        let session = Arc::new(Self {
            user_id,
            store,
            read_state,
            state: Mutex::new(SessionState::new(&config)),
            config,
            signal_tx,
        });

        (session, signal_rx)
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FeedSignal> {
        self.signal_tx.subscribe()
    }

    /// The coordinator behind this session, for process-wide unread badges.
    pub fn read_state(&self) -> &Arc<ReadStateCoordinator> {
        &self.read_state
    }

    pub fn groups(&self) -> Vec<NotificationGroup> {
        self.read_state.groups()
    }

    pub fn unread_total(&self) -> usize {
        self.read_state.unread_total()
    }

    pub fn phase(&self) -> Phase {
        self.state.lock().phase
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        let state = self.state.lock();
        SessionSnapshot {
            phase: state.phase,
            refreshing: state.refreshing,
            loading_more: state.loading_more,
            load_error: state.load_error,
            has_more: state.has_more,
            generation: state.generation,
            missing_tag: state.missing_tag.clone(),
            record_count: self.read_state.len(),
            unread_total: self.read_state.unread_total(),
        }
    }

    /// Initial load: `Idle -> Loading -> Ready`. A failure still ends in
    /// `Ready`, with an empty list and the error flag set.
    pub async fn load(&self) -> LoadOutcome {
        let generation = {
            let mut state = self.state.lock();
            if state.phase != Phase::Idle {
                return LoadOutcome::Skipped;
            }
            state.phase = Phase::Loading;
            state.next_generation()
        };

        info!(user_id = %self.user_id, "Loading notifications");
        let result = self.fetch_page(None).await;

        let outcome = {
            let mut state = self.state.lock();
            if state.generation != generation {
                return LoadOutcome::Superseded;
            }
            state.phase = Phase::Ready;
            self.apply_first_page(&mut state, result)
        };

        self.after_reload(outcome).await
    }

    /// Full reload that replaces the record set. Only valid from `Ready`
    /// while scrolled to the top.
    pub async fn on_refresh_requested(&self) -> LoadOutcome {
        let generation = {
            let mut state = self.state.lock();
            if state.phase != Phase::Ready || !state.at_top {
                debug!(phase = ?state.phase, at_top = state.at_top, "Refresh ignored");
                return LoadOutcome::Skipped;
            }
            state.refreshing = true;
            state.next_generation()
        };

        info!(user_id = %self.user_id, generation, "Refreshing notifications");
        let result = self.fetch_page(None).await;

        let outcome = {
            let mut state = self.state.lock();
            if state.generation != generation {
                debug!(
                    generation,
                    current = state.generation,
                    "Dropping superseded refresh response"
                );
                return LoadOutcome::Superseded;
            }
            state.refreshing = false;
            self.apply_first_page(&mut state, result)
        };

        if matches!(outcome, LoadOutcome::Applied { .. }) {
            self.signal(FeedSignal::Haptic(Haptic::Success));
        }
        self.after_reload(outcome).await
    }

    /// Tracks the pull distance. Returns `true` when this update crossed the
    /// refresh threshold.
    pub fn on_pull(&self, distance: f64) -> bool {
        let crossed = {
            let mut state = self.state.lock();
            if state.phase != Phase::Ready || !state.at_top {
                return false;
            }
            state.pull.update(distance)
        };
        if crossed {
            self.signal(FeedSignal::Haptic(Haptic::Threshold));
        }
        crossed
    }

    pub async fn on_pull_released(&self) -> LoadOutcome {
        let armed = self.state.lock().pull.release();
        if !armed {
            return LoadOutcome::Skipped;
        }
        self.on_refresh_requested().await
    }

    /// Records the scroll position and loads the next page once within the
    /// lookahead margin of the bottom.
    pub async fn on_scroll(&self, metrics: ScrollMetrics) -> LoadOutcome {
        {
            let mut state = self.state.lock();
            state.at_top = metrics.is_at_top();
            if !state.at_top {
                state.pull.reset();
            }
        }

        if metrics.is_near_bottom(self.config.scroll_lookahead) {
            self.on_scrolled_near_bottom().await
        } else {
            LoadOutcome::Skipped
        }
    }

    /// Appends the next page, if any, unless a load is already running.
    pub async fn on_scrolled_near_bottom(&self) -> LoadOutcome {
        let (generation, cursor) = {
            let mut state = self.state.lock();
            if state.phase != Phase::Ready
                || state.refreshing
                || state.loading_more
                || !state.has_more
            {
                return LoadOutcome::Skipped;
            }
            let Some(cursor) = state.cursor else {
                state.has_more = false;
                return LoadOutcome::Skipped;
            };
            state.loading_more = true;
            (state.generation, cursor)
        };

        debug!(user_id = %self.user_id, page = cursor.0, "Loading more notifications");
        let result = self.fetch_page(Some(cursor)).await;

        let mut state = self.state.lock();
        state.loading_more = false;
        if state.generation != generation {
            debug!(generation, current = state.generation, "Dropping superseded page");
            return LoadOutcome::Superseded;
        }

        match result {
            Ok(page) => {
                let added = self.read_state.append(page.records);
                state.set_cursor(page.next_cursor);
                if !state.has_more {
                    info!(user_id = %self.user_id, "Reached end of notifications");
                }
                LoadOutcome::Applied { records: added }
            }
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "Failed to load more notifications");
                state.load_error = true;
                drop(state);
                self.signal(FeedSignal::Stale);
                LoadOutcome::Failed
            }
        }
    }

    /// Row click: flips the whole group read, then opens the tag prompt for
    /// pending tags or navigates to the subject while the read writes are
    /// still in flight. Any rejected write ends in an error haptic.
    pub async fn on_group_activated(&self, group: &NotificationGroup) -> Activation {
        let flipped = self.read_state.flip_group(group);
        let (activation, failed) =
            tokio::join!(self.open_subject(group), self.read_state.persist(flipped));

        if failed > 0 {
            warn!(user_id = %self.user_id, group = %group.key(), failed, "Read writes rejected");
            self.signal(FeedSignal::Haptic(Haptic::Error));
        }
        activation
    }

    async fn open_subject(&self, group: &NotificationGroup) -> Activation {
        let payload = group.most_recent().payload();
        if let Payload::Tagged {
            tag_id: Some(tag_id),
            ..
        } = payload
        {
            return self.open_tag(tag_id).await;
        }

        match payload.subject() {
            Some(subject) => {
                self.signal(FeedSignal::Navigate(subject.clone()));
                Activation::Navigated(subject)
            }
            None => Activation::Nothing,
        }
    }

    /// Row button. Handled on its own so it never triggers the row's
    /// mark-read/open path.
    pub async fn on_group_action(&self, group: &NotificationGroup) -> Option<GroupAction> {
        let action = GroupAction::for_group(group)?;
        match &action {
            GroupAction::FollowBack(target) => {
                match self.store.follow_user(&self.user_id, target).await {
                    Ok(()) => {
                        info!(user_id = %self.user_id, target_id = %target, "Followed back");
                        self.signal(FeedSignal::Haptic(Haptic::Success));
                    }
                    Err(e) => {
                        warn!(user_id = %self.user_id, target_id = %target, error = %e, "Follow back failed");
                        self.signal(FeedSignal::Haptic(Haptic::Error));
                    }
                }
            }
            GroupAction::View(subject) => self.signal(FeedSignal::Navigate(subject.clone())),
        }
        Some(action)
    }

    /// Returns whether the store confirmed the bulk write.
    pub async fn on_mark_all_read_requested(&self) -> bool {
        match self.read_state.mark_all_read().await {
            Ok(_) => {
                self.signal(FeedSignal::Haptic(Haptic::Success));
                true
            }
            Err(_) => {
                self.signal(FeedSignal::Haptic(Haptic::Error));
                false
            }
        }
    }

    pub fn on_tag_not_found_dismissed(&self) {
        self.state.lock().missing_tag = None;
    }

    async fn open_tag(&self, tag_id: &TagId) -> Activation {
        match self.store.find_tag(tag_id).await {
            Ok(tag) => {
                self.state.lock().missing_tag = None;
                self.signal(FeedSignal::OpenTag(tag.clone()));
                Activation::OpenedTag(tag)
            }
            Err(FeedError::NotFound(_)) => {
                info!(%tag_id, "Tag no longer exists");
                self.state.lock().missing_tag = Some(tag_id.clone());
                self.signal(FeedSignal::TagNotFound(tag_id.clone()));
                Activation::TagNotFound(tag_id.clone())
            }
            Err(e) => {
                warn!(%tag_id, error = %e, "Failed to load tag");
                self.signal(FeedSignal::Haptic(Haptic::Error));
                Activation::Failed
            }
        }
    }

    async fn fetch_page(&self, cursor: Option<Cursor>) -> FeedResult<Page> {
        self.store
            .fetch_notifications(&self.user_id, cursor, self.config.page_size)
            .await
    }

    fn apply_first_page(&self, state: &mut SessionState, result: FeedResult<Page>) -> LoadOutcome {
        match result {
            Ok(page) => {
                let records = page.records.len();
                state.load_error = false;
                state.set_cursor(page.next_cursor);
                self.read_state.replace(page.records);
                info!(user_id = %self.user_id, records, has_more = state.has_more, "Notifications loaded");
                LoadOutcome::Applied { records }
            }
            Err(e) => {
                warn!(user_id = %self.user_id, error = %e, "Failed to load notifications");
                state.load_error = true;
                LoadOutcome::Failed
            }
        }
    }

    async fn after_reload(&self, outcome: LoadOutcome) -> LoadOutcome {
        match outcome {
            LoadOutcome::Applied { .. } => {
                self.read_state.retry_unconfirmed().await;
            }
            LoadOutcome::Failed => self.signal(FeedSignal::Stale),
            LoadOutcome::Superseded | LoadOutcome::Skipped => {}
        }
        outcome
    }

    fn signal(&self, signal: FeedSignal) {
        // no receivers is fine; the screen may not be listening yet
        let _ = self.signal_tx.send(signal);
    }
}
