use thiserror::Error;

#[derive(Error, Debug)]
pub enum RelayError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Observer not attached")]
    ObserverDetached,

    #[error("Notification failed: {0}")]
    NotifyFailed(String),
}

pub type Result<T> = std::result::Result<T, RelayError>;
