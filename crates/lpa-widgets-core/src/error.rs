use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    #[error("Malformed stream message: {0}")]
    MalformedMessage(String),

    #[error("Malformed form snapshot: {0}")]
    MalformedSnapshot(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}
