use mwclient::{ApiRequest, Endpoint, HttpError, MediaWikiClient, RawResponse, Transport};
use std::{cell::RefCell, collections::VecDeque};

pub const ENDPOINT: &str = "http://hefty.local/~ihar/ims/1.32.2";

pub fn endpoint() -> Endpoint {
    Endpoint::parse(ENDPOINT).expect("Test endpoint is valid")
}

/// Plays back canned responses in order and records every request
#[derive(Default)]
pub struct ScriptedTransport {
    responses: RefCell<VecDeque<RawResponse>>,
    requests: RefCell<Vec<ApiRequest>>,
}

impl ScriptedTransport {
    pub fn new(responses: impl IntoIterator<Item = RawResponse>) -> Self {
        ScriptedTransport {
            responses: RefCell::new(responses.into_iter().collect()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<ApiRequest> {
        self.requests.borrow().clone()
    }

    pub fn actions(&self) -> Vec<String> {
        self.requests
            .borrow()
            .iter()
            .map(|request| request.action().unwrap_or("none").to_string())
            .collect()
    }

    pub fn remaining(&self) -> usize {
        self.responses.borrow().len()
    }
}

impl Transport for ScriptedTransport {
    fn execute(
        &self,
        _endpoint: &Endpoint,
        request: &ApiRequest,
    ) -> Result<RawResponse, HttpError> {
        self.requests.borrow_mut().push(request.clone());

        self.responses
            .borrow_mut()
            .pop_front()
            .ok_or_else(|| HttpError::Custom("No scripted response left".to_string()))
    }
}

pub fn scripted(
    responses: impl IntoIterator<Item = RawResponse>,
) -> MediaWikiClient<ScriptedTransport> {
    MediaWikiClient::with_transport(ScriptedTransport::new(responses))
}

pub fn json(body: &str) -> RawResponse {
    RawResponse::new(200, body)
}

pub fn login_token() -> RawResponse {
    json(r#"{"batchcomplete": "", "query": {"tokens": {"logintoken": "d6c0ffee+\\"}}}"#)
        .cookie("my_wiki_session", "anonymous")
}

pub fn login_success() -> RawResponse {
    json(r#"{"login": {"result": "Success", "lguserid": 2, "lgusername": "Ihar"}}"#)
        .cookie("my_wiki_session", "authenticated")
        .cookie("my_wikiUserID", "2")
        .cookie("my_wikiUserName", "Ihar")
}

pub fn login_failed() -> RawResponse {
    json(
        r#"{"login": {"result": "Failed", "reason": "Incorrect username or password entered. Please try again."}}"#,
    )
}

pub fn csrf_token() -> RawResponse {
    json(r#"{"batchcomplete": "", "query": {"tokens": {"csrftoken": "5ca1ab1e+\\"}}}"#)
        .cookie("my_wiki_session", "csrf-response")
}

pub fn sections(entries: &[(&str, &str, &str)]) -> RawResponse {
    let sections = entries
        .iter()
        .map(|(level, line, index)| {
            format!(r#"{{"toclevel": 1, "level": "{level}", "line": "{line}", "number": "{index}", "index": "{index}"}}"#)
        })
        .collect::<Vec<String>>()
        .join(", ");

    json(format!(r#"{{"parse": {{"title": "User:Ihar", "pageid": 7, "sections": [{sections}]}}}}"#).as_str())
}

pub fn edit_success() -> RawResponse {
    json(
        r#"{"edit": {"result": "Success", "pageid": 7, "title": "User:Ihar", "contentmodel": "wikitext", "oldrevid": 41, "newrevid": 42, "newtimestamp": "2026-10-14T09:00:00Z"}}"#,
    )
}

/// A wiki that binds csrf tokens to the session cookie they were issued for
pub struct BindingWiki {
    issued: RefCell<u32>,
}

impl BindingWiki {
    pub fn new() -> Self {
        BindingWiki {
            issued: RefCell::new(0),
        }
    }

    fn session_of(request: &ApiRequest) -> Option<String> {
        request
            .session()
            .and_then(|session| session.get("my_wiki_session"))
            .map(str::to_string)
    }
}

impl Transport for BindingWiki {
    fn execute(
        &self,
        _endpoint: &Endpoint,
        request: &ApiRequest,
    ) -> Result<RawResponse, HttpError> {
        match request.action() {
            Some("query") => {
                // Every token request without a session starts a new one
                let session = Self::session_of(request).unwrap_or_else(|| {
                    let mut issued = self.issued.borrow_mut();
                    *issued += 1;
                    format!("session-{issued}")
                });

                Ok(json(
                    format!(r#"{{"query": {{"tokens": {{"csrftoken": "token-for-{session}"}}}}}}"#)
                        .as_str(),
                )
                .cookie("my_wiki_session", session))
            }
            Some("edit") => {
                let expected = Self::session_of(request)
                    .map(|session| format!("token-for-{session}"));

                if expected.as_deref() == request.form_value("token") {
                    Ok(edit_success())
                } else {
                    Ok(json(
                        r#"{"error": {"code": "badtoken", "info": "Invalid CSRF token."}}"#,
                    ))
                }
            }
            other => Err(HttpError::Custom(format!("Unexpected action {other:?}"))),
        }
    }
}
