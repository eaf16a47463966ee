pub mod comments;
pub mod feed;
pub mod notifications;
pub mod posts;
pub mod sse;
pub mod users;
