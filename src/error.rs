//! Error types for vault session, clipboard and screen operations.

use thiserror::Error;

/// Errors surfaced by the vault session and its collaborators.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum VaultError {
    /// The vault CLI could not be started or exited unexpectedly
    #[error("vault CLI `{command}` failed: {message}")]
    ExternalTool { command: String, message: String },

    /// Login or unlock was rejected
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("not logged in")]
    NotLoggedIn,

    #[error("no entry matching id {0} found")]
    NotFound(String),

    /// Output of the vault CLI could not be decoded
    #[error("could not decode `{command}` output: {source}")]
    Decode {
        command: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("clipboard error: {0}")]
    Clipboard(String),
}

impl VaultError {
    pub(crate) fn external(command: &str, message: impl Into<String>) -> Self {
        Self::ExternalTool {
            command: command.to_string(),
            message: message.into(),
        }
    }

    /// True for the single condition the UI recovers from by re-prompting.
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

pub type Result<T> = std::result::Result<T, VaultError>;
