use thiserror::Error;

#[derive(Error, Debug)]
pub enum AdminError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    InvalidCredentials(String),

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Network error: {0}")]
    Network(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Course associations partially saved ({applied} change(s) applied): {source}")]
    PartialSync {
        applied: usize,
        #[source]
        source: Box<AdminError>,
    },

    #[error("Session storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl AdminError {
    /// Message suitable for showing inline next to the failed action.
    ///
    /// Backend-provided messages win; everything else falls back to `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            AdminError::InvalidCredentials(message) => message.clone(),
            AdminError::Api { message, .. } if !message.is_empty() => message.clone(),
            AdminError::SessionExpired => self.to_string(),
            AdminError::PartialSync { source, .. } => source.user_message(fallback),
            _ => fallback.to_string(),
        }
    }

    pub fn is_session_expired(&self) -> bool {
        match self {
            AdminError::SessionExpired => true,
            AdminError::PartialSync { source, .. } => source.is_session_expired(),
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, AdminError>;
