use crate::{
    MediaWikiClient,
    client::{ApiRequest, Endpoint, Transport},
    error::{EditFailure, EditStage, MediaWikiError},
    section::{SectionRef, heading_prefixed},
    session::{Credentials, Session},
    token::{Token, TokenKind},
};
use serde::{Deserialize, de::IgnoredAny};
use serde_json::Value;

pub const DEFAULT_CONTENT_MODEL: &str = "wikitext";

const EDIT_SUCCESS: &str = "Success";

/// One section of one page, and what to put there
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditRequest {
    title: String,
    section_title: String,
    markup: String,
    content_model: String,
    summary: Option<String>,
}

impl EditRequest {
    pub fn new(
        title: impl Into<String>,
        section_title: impl Into<String>,
        markup: impl Into<String>,
    ) -> Self {
        EditRequest {
            title: title.into(),
            section_title: section_title.into(),
            markup: markup.into(),
            content_model: DEFAULT_CONTENT_MODEL.to_string(),
            summary: None,
        }
    }

    pub fn content_model(self, content_model: impl Into<String>) -> Self {
        Self {
            content_model: content_model.into(),
            ..self
        }
    }

    pub fn summary(self, summary: impl Into<String>) -> Self {
        Self {
            summary: Some(summary.into()),
            ..self
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn section_title(&self) -> &str {
        &self.section_title
    }

    pub fn markup(&self) -> &str {
        &self.markup
    }

    pub fn get_content_model(&self) -> &str {
        &self.content_model
    }

    pub fn get_summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }
}

/// What the wiki reported for an accepted edit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditOutcome {
    pub section: SectionRef,
    /// The text as submitted, heading included for existing sections
    pub text: String,
    pub page_id: Option<u64>,
    pub old_revision: Option<u64>,
    pub new_revision: Option<u64>,
    /// The wiki saw identical content and made no new revision
    pub no_change: bool,
}

#[derive(Deserialize)]
struct EditResult {
    result: Option<String>,
    pageid: Option<u64>,
    oldrevid: Option<u64>,
    newrevid: Option<u64>,
    nochange: Option<IgnoredAny>,
}

impl<T: Transport> MediaWikiClient<T> {
    /// Create or replace the level 2 section `request.section_title()` of a page
    ///
    /// Resolves the section, logs in, fetches a csrf token with the login
    /// session and submits the edit once. Nothing is retried.
    ///
    /// # Errors
    ///
    /// An [EditFailure] naming the step that failed. No edit was made.
    pub fn edit_section(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
        request: &EditRequest,
    ) -> Result<EditOutcome, EditFailure> {
        let section = self
            .resolve_section(endpoint, &request.title, &request.section_title)
            .map_err(EditFailure::at(EditStage::ResolveSection))?;

        let session = self
            .login(endpoint, credentials)
            .map_err(EditFailure::at(EditStage::Login))?;

        // The csrf response's own cookies are not needed, the login session stays valid
        let (token, _) = self
            .fetch_token(endpoint, TokenKind::Csrf, Some(&session))
            .map_err(EditFailure::at(EditStage::CsrfToken))?;

        self.submit_edit(endpoint, request, &section, &token, &session)
            .map_err(EditFailure::at(EditStage::Submit))
    }

    /// Submit a single `action=edit` with an already fetched csrf token
    ///
    /// `token` must have been fetched with `session`, the wiki rejects it otherwise.
    ///
    /// # Errors
    ///
    /// [MediaWikiError::Edit] if the wiki refuses the edit,
    /// [MediaWikiError::Protocol] if the answer has no usable `edit` object
    pub fn submit_edit(
        &self,
        endpoint: &Endpoint,
        request: &EditRequest,
        section: &SectionRef,
        token: &Token,
        session: &Session,
    ) -> Result<EditOutcome, MediaWikiError> {
        if token.kind() != TokenKind::Csrf {
            return Err(MediaWikiError::InvalidArgument(format!(
                "Edits need a csrf token, got a {} token",
                token.kind()
            )));
        }

        let text = heading_prefixed(section, &request.section_title, &request.markup);

        let mut api_request = ApiRequest::post()
            .query("action", "edit")
            .form("bot", "1")
            .form("title", &request.title)
            .form("section", section)
            .form("sectiontitle", &request.section_title)
            .form("text", &text)
            .form("contentmodel", &request.content_model);

        if let Some(summary) = &request.summary {
            api_request = api_request.form("summary", summary);
        }

        let api_request = api_request
            .form("token", token.value())
            .with_session(session);

        let (response, _) = self.send(endpoint, &api_request)?;

        if let Some(error) = response.error() {
            return Err(MediaWikiError::Edit(format!(
                "error response for '{}': {error}",
                request.title
            )));
        }

        let edit = response.field::<Value>("edit")?;

        if !edit.is_object() {
            return Err(MediaWikiError::protocol(
                "edit",
                format!("expected an object, got {edit}"),
            ));
        }

        let result = EditResult::deserialize(&edit)
            .map_err(|err| MediaWikiError::protocol("edit", err))?;

        match result.result.as_deref() {
            Some(EDIT_SUCCESS) => {}
            Some(_) => {
                return Err(MediaWikiError::Edit(format!(
                    "unsuccessful edit of '{}': {edit}",
                    request.title
                )));
            }
            None => return Err(MediaWikiError::protocol("edit.result", "missing")),
        }

        let outcome = EditOutcome {
            section: section.clone(),
            text,
            page_id: result.pageid,
            old_revision: result.oldrevid,
            new_revision: result.newrevid,
            no_change: result.nochange.is_some(),
        };

        if outcome.no_change {
            log::info!("Edit of '{}' changed nothing", request.title);
        } else {
            log::info!(
                "Edited section '{}' of '{}', revision {:?}",
                section,
                request.title,
                outcome.new_revision
            );
        }

        Ok(outcome)
    }
}
