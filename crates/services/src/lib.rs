pub mod dao;
pub mod store;

pub use dao::*;
pub use store::MongoNotificationStore;
