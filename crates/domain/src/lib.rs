mod commands;
mod error;
mod events;
mod models;
pub mod mention;
pub mod presence;
pub mod thread;

pub use commands::{NewComment, NewPost, PostFilter, ProfileUpdate, Upload};
pub use error::ValidationError;
pub use events::FeedEvent;
pub use models::{
    AttachmentKind, Comment, Notification, NotificationDetail, Post, User, Username,
    DEFAULT_CATEGORY,
};
