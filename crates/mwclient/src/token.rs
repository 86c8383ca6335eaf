use crate::{
    MediaWikiClient,
    client::{ApiRequest, Endpoint, Transport},
    error::MediaWikiError,
    session::Session,
};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::{fmt::Display, str::FromStr};

/// The kinds of `meta=tokens` token this client uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Login,
    Csrf,
    UserRights,
}

impl TokenKind {
    /// The value for the `type` parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Login => "login",
            TokenKind::Csrf => "csrf",
            TokenKind::UserRights => "userrights",
        }
    }

    /// The field of `query.tokens` the token comes back in
    pub fn response_field(&self) -> &'static str {
        match self {
            TokenKind::Login => "logintoken",
            TokenKind::Csrf => "csrftoken",
            TokenKind::UserRights => "userrightstoken",
        }
    }
}

impl FromStr for TokenKind {
    type Err = MediaWikiError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "login" => Ok(TokenKind::Login),
            "csrf" => Ok(TokenKind::Csrf),
            "userrights" | "user-rights" => Ok(TokenKind::UserRights),
            _ => Err(MediaWikiError::InvalidArgument(format!(
                "Token type is not recognized: '{s}'"
            ))),
        }
    }
}

impl Display for TokenKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A freshly fetched token, only valid with the session it was fetched with
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    kind: TokenKind,
    value: String,
}

impl Token {
    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

// Tokens are credentials of a sort, keep them out of logs
impl std::fmt::Debug for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Token")
            .field("kind", &self.kind)
            .field("value", &"<redacted>")
            .finish()
    }
}

#[derive(Deserialize)]
struct TokenSet {
    logintoken: Option<String>,
    csrftoken: Option<String>,
    userrightstoken: Option<String>,
}

impl TokenSet {
    fn take(self, kind: TokenKind) -> Option<String> {
        match kind {
            TokenKind::Login => self.logintoken,
            TokenKind::Csrf => self.csrftoken,
            TokenKind::UserRights => self.userrightstoken,
        }
    }
}

impl<T: Transport> MediaWikiClient<T> {
    /// Fetch a token of the given kind, presenting `session` if there is one
    ///
    /// The returned session is made of the cookies of *this* response and is
    /// the one to carry forward with the token.
    ///
    /// # Errors
    ///
    /// This method fails if the request fails or the response carries no
    /// (or an empty) token of that kind
    pub fn fetch_token(
        &self,
        endpoint: &Endpoint,
        kind: TokenKind,
        session: Option<&Session>,
    ) -> Result<(Token, Session), MediaWikiError> {
        let mut request = ApiRequest::post()
            .query("action", "query")
            .query("meta", "tokens")
            .query("type", kind);

        if let Some(session) = session {
            request = request.with_session(session);
        }

        let (response, session) = self.send(endpoint, &request)?;

        if let Some(error) = response.error() {
            return Err(MediaWikiError::protocol("error", error));
        }

        let query = response.field::<Map<String, Value>>("query")?;

        let tokens = query
            .get("tokens")
            .ok_or_else(|| MediaWikiError::protocol("query.tokens", "missing"))
            .and_then(|tokens| {
                TokenSet::deserialize(tokens)
                    .map_err(|err| MediaWikiError::protocol("query.tokens", err))
            })?;

        let field = kind.response_field();

        let value = tokens
            .take(kind)
            .ok_or_else(|| MediaWikiError::protocol(format!("query.tokens.{field}"), "missing"))?;

        if value.is_empty() {
            return Err(MediaWikiError::protocol(
                format!("query.tokens.{field}"),
                "zero length token",
            ));
        }

        log::debug!("Fetched a {kind} token with {} cookie(s)", session.len());

        Ok((Token { kind, value }, session))
    }

    /// [MediaWikiClient::fetch_token] with the kind given by name
    ///
    /// # Errors
    ///
    /// [MediaWikiError::InvalidArgument] for an unknown kind, otherwise as
    /// [MediaWikiClient::fetch_token]
    pub fn fetch_token_named(
        &self,
        endpoint: &Endpoint,
        kind: &str,
        session: Option<&Session>,
    ) -> Result<(Token, Session), MediaWikiError> {
        self.fetch_token(endpoint, kind.parse()?, session)
    }
}
