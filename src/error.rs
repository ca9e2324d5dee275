use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ShuffleError {
    #[error("cannot parse date {date:?} of {name:?}")]
    Parse { name: String, date: String },
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

pub type Result<T> = std::result::Result<T, ShuffleError>;
