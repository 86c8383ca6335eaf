mod common;

use common::{endpoint, json, login_failed, login_success, login_token, scripted};
use mwclient::{Cookie, Credentials, MediaWikiError, Method, RawResponse, Session, TokenKind};
use pretty_assertions::assert_eq;

fn credentials() -> Credentials {
    Credentials::new("Ihar@mw-publications", "not-the-real-password")
}

#[test]
fn login_returns_the_login_cookies() {
    let client = scripted([login_token(), login_success()]);

    let session = client
        .login(&endpoint(), &credentials())
        .expect("Login should succeed");

    assert!(!session.is_empty());
    assert_eq!(session.get("my_wiki_session"), Some("authenticated"));
    assert_eq!(session.get("my_wikiUserName"), Some("Ihar"));
}

#[test]
fn login_token_precedes_credentials() {
    let client = scripted([login_token(), login_success()]);

    client.login(&endpoint(), &credentials()).unwrap();

    let requests = client.transport().requests();

    assert_eq!(requests.len(), 2);

    let token_request = &requests[0];

    assert_eq!(token_request.query_value("meta"), Some("tokens"));
    assert_eq!(token_request.query_value("type"), Some("login"));
    assert!(token_request.session().is_none());

    let login = &requests[1];

    assert_eq!(login.method(), Method::Post);
    assert_eq!(login.form_value("action"), Some("login"));
    assert_eq!(login.form_value("lgname"), Some("Ihar@mw-publications"));
    assert_eq!(login.form_value("lgpassword"), Some("not-the-real-password"));
    assert_eq!(login.form_value("lgtoken"), Some("d6c0ffee+\\"));
    assert_eq!(
        login.cookie_header().as_deref(),
        Some("my_wiki_session=anonymous")
    );
}

#[test]
fn wrong_credentials_are_auth_error() {
    let client = scripted([login_token(), login_failed()]);

    let error = client
        .login(&endpoint(), &credentials())
        .expect_err("Login should fail");

    match error {
        MediaWikiError::Auth(message) => {
            assert!(message.contains("Failed"));
            assert!(message.contains("Incorrect username or password"));
            assert!(!message.contains("not-the-real-password"));
        }
        other => panic!("Expected an auth error, got {other:?}"),
    }
}

#[test]
fn top_level_error_is_auth_error() {
    let client = scripted([
        login_token(),
        json(r#"{"error": {"code": "badtoken", "info": "Invalid token"}}"#),
    ]);

    assert!(matches!(
        client.login(&endpoint(), &credentials()),
        Err(MediaWikiError::Auth(_))
    ));
}

#[test]
fn need_token_is_not_success() {
    let client = scripted([
        login_token(),
        json(r#"{"login": {"result": "NeedToken", "token": "abc"}}"#),
    ]);

    assert!(matches!(
        client.login(&endpoint(), &credentials()),
        Err(MediaWikiError::Auth(_))
    ));
}

#[test]
fn missing_login_object_is_protocol_error() {
    let client = scripted([login_token(), json(r#"{"warnings": {}}"#)]);

    assert!(matches!(
        client.login(&endpoint(), &credentials()),
        Err(MediaWikiError::Protocol { ref field, .. }) if field == "login"
    ));
}

#[test]
fn token_fetch_returns_fresh_cookies() {
    let client = scripted([json(r#"{"query": {"tokens": {"csrftoken": "abc+\\"}}}"#)
        .cookie("my_wiki_session", "rotated")]);

    let old = Session::from_cookies(vec![Cookie::new("my_wiki_session", "old")]);

    let (token, session) = client
        .fetch_token(&endpoint(), TokenKind::Csrf, Some(&old))
        .unwrap();

    assert_eq!(token.kind(), TokenKind::Csrf);
    assert_eq!(token.value(), "abc+\\");
    assert_eq!(session.get("my_wiki_session"), Some("rotated"));

    let requests = client.transport().requests();
    let request = &requests[0];

    assert_eq!(request.query_value("type"), Some("csrf"));
    assert_eq!(request.cookie_header().as_deref(), Some("my_wiki_session=old"));
}

#[test]
fn user_rights_token_uses_its_own_field() {
    let client = scripted([json(
        r#"{"query": {"tokens": {"userrightstoken": "rights+\\"}}}"#,
    )]);

    let (token, _) = client
        .fetch_token_named(&endpoint(), "user-rights", None)
        .unwrap();

    assert_eq!(token.value(), "rights+\\");
    assert_eq!(
        client.transport().requests()[0].query_value("type"),
        Some("userrights")
    );
}

#[test]
fn unknown_token_kind_sends_nothing() {
    let client = scripted(Vec::<RawResponse>::new());

    assert!(matches!(
        client.fetch_token_named(&endpoint(), "patrol-everything", None),
        Err(MediaWikiError::InvalidArgument(_))
    ));
    assert!(client.transport().requests().is_empty());
}

#[test]
fn malformed_token_responses_are_protocol_errors() {
    let cases = [
        (r#"{"batchcomplete": ""}"#, "query"),
        (r#"{"query": []}"#, "query"),
        (r#"{"query": {}}"#, "query.tokens"),
        (r#"{"query": {"tokens": "none"}}"#, "query.tokens"),
        (r#"{"query": {"tokens": {"csrftoken": ""}}}"#, "query.tokens.csrftoken"),
        (r#"{"query": {"tokens": {"logintoken": "abc"}}}"#, "query.tokens.csrftoken"),
    ];

    for (body, expected) in cases {
        let client = scripted([json(body)]);

        match client.fetch_token(&endpoint(), TokenKind::Csrf, None) {
            Err(MediaWikiError::Protocol { field, .. }) => assert_eq!(field, expected, "{body}"),
            other => panic!("Expected a protocol error for {body}, got {other:?}"),
        }
    }
}
