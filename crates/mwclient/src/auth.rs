use crate::{
    MediaWikiClient,
    client::{ApiRequest, Endpoint, Transport},
    error::MediaWikiError,
    session::{Credentials, Session},
    token::TokenKind,
};
use serde::Deserialize;

const LOGIN_SUCCESS: &str = "Success";

#[derive(Deserialize)]
struct LoginResult {
    result: Option<String>,
    reason: Option<String>,
    lgusername: Option<String>,
}

impl<T: Transport> MediaWikiClient<T> {
    /// Log in with a bot account, two round trips: a login token, then the credentials
    ///
    /// The returned session is the cookies of the login response, present it
    /// (and a csrf token fetched with it) to make changes as this user.
    ///
    /// # Errors
    ///
    /// [MediaWikiError::Auth] if the wiki refuses the credentials, otherwise
    /// the failure of whichever request went wrong. No cookies are returned on
    /// failure.
    pub fn login(
        &self,
        endpoint: &Endpoint,
        credentials: &Credentials,
    ) -> Result<Session, MediaWikiError> {
        let (token, token_session) = self.fetch_token(endpoint, TokenKind::Login, None)?;

        let request = ApiRequest::post()
            .form("action", "login")
            .form("lgname", credentials.name())
            .form("lgpassword", credentials.password())
            .form("lgtoken", token.value())
            .with_session(&token_session);

        let (response, session) = self.send(endpoint, &request)?;

        if let Some(error) = response.error() {
            return Err(MediaWikiError::Auth(format!(
                "error response for '{}': {error}",
                credentials.name()
            )));
        }

        let login = response.field::<LoginResult>("login")?;

        match login.result.as_deref() {
            Some(LOGIN_SUCCESS) => {
                log::info!(
                    "Logged in as '{}'",
                    login.lgusername.as_deref().unwrap_or(credentials.name())
                );

                Ok(session)
            }
            result => Err(MediaWikiError::Auth(format!(
                "'{}' got result '{}'{}",
                credentials.name(),
                result.unwrap_or("none"),
                login
                    .reason
                    .map(|reason| format!(": {reason}"))
                    .unwrap_or_default()
            ))),
        }
    }
}
