pub mod base;
pub mod follow;
pub mod notification;
pub mod tag;

pub use base::BaseDao;
pub use follow::FollowDao;
pub use notification::NotificationDao;
pub use tag::TagDao;
