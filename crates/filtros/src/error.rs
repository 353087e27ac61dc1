use thiserror::Error;

/// Errors at the edges of the synchronizer. Parsing URLs never fails;
/// these cover names and settings supplied by the user.
#[derive(Debug, Error)]
pub enum FilterError {
    #[error("unknown filter field: {0}")]
    UnknownField(String),

    #[error("invalid keystroke '{0}', expected <ms>:<value>")]
    InvalidKeystroke(String),

    #[error("invalid value for {name}: {value}")]
    InvalidConfig { name: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, FilterError>;
