use serde::Serialize;

use crate::roster::RosterError;

/// All errors that can surface from a command or the API client.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Server returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("You are not signed in")]
    NotAuthenticated,

    #[error(transparent)]
    Roster(#[from] RosterError),

    #[error("Invalid character: {0}")]
    InvalidCharacter(String),

    #[error("{0}")]
    Custom(String),
}

// Tauri requires error types to implement Serialize for IPC transport.
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
