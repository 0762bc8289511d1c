//! Notification aggregation and read-state engine.
//!
//! Raw per-event notification records come in from a [`NotificationStore`];
//! [`grouping`] folds them into feed rows, [`format`] writes each row's
//! summary, [`ReadStateCoordinator`] applies optimistic read flips and
//! [`FeedSession`] drives loading, refresh and pagination for one screen.

pub mod config;
pub mod error;
pub mod format;
pub mod gesture;
pub mod grouping;
pub mod model;
pub mod read_state;
pub mod session;
pub mod store;


pub use config::FeedConfig;
pub use error::{FeedError, FeedResult};
pub use gesture::{PullGesture, ScrollMetrics};
pub use grouping::{GroupKey, NotificationGroup, group};
pub use model::{
    Cursor, NotificationData, NotificationId, NotificationKind, NotificationRecord, Page, Payload,
    Subject, Tag, TagId, UserId,
};
pub use read_state::{MarkOutcome, ReadStateCoordinator, WriteStatus};
pub use session::{
    Activation, FeedSession, FeedSignal, GroupAction, Haptic, LoadOutcome, Phase, SessionSnapshot,
};
pub use store::NotificationStore;
