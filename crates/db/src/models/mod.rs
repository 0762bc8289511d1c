pub mod follow;
pub mod notification;
pub mod tag;

pub use follow::*;
pub use notification::*;
pub use tag::*;
