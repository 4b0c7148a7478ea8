#[derive(Debug, thiserror::Error)]
pub enum DashError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("invalid configuration: {0}")]
    Config(String),
    /// Fetch failures carry an already normalised, user-facing message.
    #[error("{0}")]
    Fetch(String),
    #[error("generation cancelled")]
    Cancelled,
}

pub type DashResult<T> = std::result::Result<T, DashError>;
