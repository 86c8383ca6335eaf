use crate::client::HttpError;
use std::fmt::Display;
use thiserror::Error;

/// Everything that can go wrong while talking to a wiki
#[derive(Debug, Error)]
pub enum MediaWikiError {
    /// The request couldn't be made, or the status was above 200
    #[error("Transport failure: {0}")]
    Transport(#[from] HttpError),
    /// The body was not a JSON object
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    /// Well-formed JSON without an expected field, or with a field of the wrong type
    #[error("Unexpected response at '{field}': {detail}")]
    Protocol { field: String, detail: String },
    /// The wiki refused the login
    #[error("Login rejected: {0}")]
    Auth(String),
    /// The wiki refused the edit (permissions, bad token, edit conflict, content model...)
    #[error("Edit rejected: {0}")]
    Edit(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl MediaWikiError {
    pub(crate) fn protocol(field: impl Display, detail: impl Display) -> Self {
        MediaWikiError::Protocol {
            field: field.to_string(),
            detail: detail.to_string(),
        }
    }
}

/// The step of [crate::MediaWikiClient::edit_section] that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditStage {
    ResolveSection,
    Login,
    CsrfToken,
    Submit,
}

impl Display for EditStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            EditStage::ResolveSection => "resolving the section",
            EditStage::Login => "logging in",
            EditStage::CsrfToken => "fetching the csrf token",
            EditStage::Submit => "submitting the edit",
        })
    }
}

/// An edit workflow that stopped, and where. No edit was applied.
#[derive(Debug, Error)]
#[error("Edit failed while {stage}: {source}")]
pub struct EditFailure {
    pub stage: EditStage,
    #[source]
    pub source: MediaWikiError,
}

impl EditFailure {
    pub(crate) fn at(stage: EditStage) -> impl FnOnce(MediaWikiError) -> Self {
        move |source| EditFailure { stage, source }
    }
}
