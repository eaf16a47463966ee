mod comments;
mod notifications;
mod posts;
mod users;
