use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    Empty(&'static str),
    #[error("{0} is too long (max {1} chars)")]
    TooLong(&'static str, usize),
    #[error("invalid username '{0}': only ASCII letters, digits and '_' are allowed")]
    InvalidUsername(String),
}
