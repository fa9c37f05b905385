use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum MaplistError {
    #[error("invalid collection id: {0}")]
    InvalidCollectionId(String),

    #[error("no collection id given and none remembered from a previous run")]
    #[diagnostic(help("pass --collection <ID or workshop URL>"))]
    MissingCollectionId,

    #[error("Steam request failed: {0}")]
    SteamHttp(String),

    #[error("Steam returned status {status}: {message}")]
    SteamStatus { status: u16, message: String },

    #[error("unexpected Steam response: {0}")]
    #[diagnostic(help("check that the collection id exists and is public"))]
    MalformedResponse(String),

    #[error("failed to read settings file at {0}")]
    SettingsRead(PathBuf),

    #[error("failed to parse settings: {0}")]
    SettingsParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),
}

/// Coarse classification used for exit codes and presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Input,
    Transport,
    MalformedResponse,
    Filesystem,
}

impl MaplistError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MaplistError::InvalidCollectionId(_) | MaplistError::MissingCollectionId => {
                ErrorKind::Input
            }
            MaplistError::SteamHttp(_) | MaplistError::SteamStatus { .. } => ErrorKind::Transport,
            MaplistError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            MaplistError::SettingsRead(_)
            | MaplistError::SettingsParse(_)
            | MaplistError::Filesystem(_) => ErrorKind::Filesystem,
        }
    }

    pub fn is_transport(&self) -> bool {
        self.kind() == ErrorKind::Transport
    }
}
