use crate::{error::MediaWikiError, response::ApiResponse, session::Session};
use http::{HeaderMap, HeaderName, HeaderValue};
use std::{str::FromStr, time::Duration};
use thiserror::Error;

mod request;

pub use request::{ApiRequest, Endpoint, Method, RawResponse};

cfg_if::cfg_if! {
    if #[cfg(feature = "ureq")] {
        mod native;

        pub use native::UreqTransport;
    }
}

const CLIENT_REDIRECTS: u32 = 2;

const USER_AGENT: &str = concat!(
    std::env!("CARGO_PKG_NAME"),
    "/",
    std::env!("CARGO_PKG_VERSION")
);

/// The Errors that may occur while talking HTTP to a wiki
#[derive(Debug, Error)]
pub enum HttpError {
    /// An error from the ureq backend
    #[cfg(feature = "ureq")]
    #[error("Error with HTTP backend: {0}")]
    Backend(#[from] ureq::Error),
    /// An error from a custom [Transport]
    #[error("Error with HTTP backend: {0}")]
    Custom(String),
    /// Anything above 200 is refused, 201 and 204 included
    #[error("Bad HTTP status: '{0}'")]
    Status(u16),
}

#[derive(Error, Debug)]
pub enum HeaderError {
    #[error("{0}")]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),
    #[error("{0}")]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
    #[error("{0}")]
    HeaderMapMaxSizeReached(#[from] http::header::MaxSizeReached),
}

/// Executes one [ApiRequest] against an endpoint, exactly once
///
/// Implementations must not retry and must not follow their own cookie jar,
/// the cookies to send are carried by the request itself.
pub trait Transport {
    /// # Errors
    ///
    /// Fails when the request can't be sent or the response can't be read.
    /// A response with any status code is *not* an error at this level.
    fn execute(&self, endpoint: &Endpoint, request: &ApiRequest)
    -> Result<RawResponse, HttpError>;
}

pub struct MediaWikiClientConfig {
    timeout: Option<Duration>,
    max_redirects: u32,
    // Only non defaults
    headers: HeaderMap<HeaderValue>,
}

impl MediaWikiClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn user_agent(self, user_agent: impl std::fmt::Display) -> Result<Self, HeaderError> {
        self.add_header(http::header::USER_AGENT, user_agent)
    }

    /// No timeout is set by default, a stalled wiki blocks the call
    pub fn timeout(self, timeout: Option<Duration>) -> Self {
        Self { timeout, ..self }
    }

    pub fn max_redirects(self, max_redirects: u32) -> Self {
        Self {
            max_redirects,
            ..self
        }
    }

    pub fn add_header(
        mut self,
        name: impl std::fmt::Display,
        value: impl std::fmt::Display,
    ) -> Result<Self, HeaderError> {
        self.headers.try_insert(
            HeaderName::from_str(name.to_string().as_str())?,
            HeaderValue::from_str(value.to_string().as_str())?,
        )?;

        Ok(self)
    }

    pub fn headers(&self) -> &HeaderMap<HeaderValue> {
        &self.headers
    }

    pub fn get_timeout(&self) -> Option<Duration> {
        self.timeout
    }

    pub fn get_max_redirects(&self) -> u32 {
        self.max_redirects
    }
}

impl Default for MediaWikiClientConfig {
    fn default() -> Self {
        MediaWikiClientConfig {
            timeout: None,
            max_redirects: CLIENT_REDIRECTS,
            headers: HeaderMap::new(),
        }
        .user_agent(USER_AGENT)
        .expect("Default headers are invalid")
    }
}

/// A client for the MediaWiki action API
///
/// The client holds no wiki state: the endpoint, credentials and sessions
/// are handed in on every call.
pub struct MediaWikiClient<T: Transport> {
    transport: T,
}

impl<T: Transport> MediaWikiClient<T> {
    /// Wrap an existing transport, used for custom backends and test doubles
    pub fn with_transport(transport: T) -> Self {
        MediaWikiClient { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request and decode the JSON body
    ///
    /// Returns the decoded body together with the session made up of the
    /// cookies *this* response set.
    ///
    /// # Errors
    ///
    /// This method fails if the request fails, the status is above 200 or
    /// the body is not a JSON object
    pub fn send(
        &self,
        endpoint: &Endpoint,
        request: &ApiRequest,
    ) -> Result<(ApiResponse, Session), MediaWikiError> {
        log::info!(
            "Requesting action '{}' from '{}'",
            request.action().unwrap_or("none"),
            endpoint.api_url(request.query_pairs())
        );

        let response = self.transport.execute(endpoint, request)?;

        if response.status > 200 {
            log::warn!("Wiki responded with status {}", response.status);

            return Err(HttpError::Status(response.status).into());
        }

        let body = ApiResponse::from_json(&response.body)?;

        log::debug!(
            "Decoded response with keys [{}] and {} cookie(s)",
            itertools::join(body.keys(), ", "),
            response.cookies.len()
        );

        Ok((body, Session::from_cookies(response.cookies)))
    }

    /// Send a GET with the given query parameters, `format=json` is implied
    ///
    /// # Errors
    ///
    /// See [MediaWikiClient::send]
    pub fn get<'a>(
        &self,
        endpoint: &Endpoint,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Result<ApiResponse, MediaWikiError> {
        let request = params
            .into_iter()
            .fold(ApiRequest::get(), |request, (name, value)| {
                request.query(name, value)
            });

        self.send(endpoint, &request).map(|(body, _)| body)
    }

    /// Send a form-encoded POST with the cookies of a login session
    ///
    /// # Errors
    ///
    /// See [MediaWikiClient::send]
    pub fn post<'a>(
        &self,
        endpoint: &Endpoint,
        params: impl IntoIterator<Item = (&'a str, &'a str)>,
        session: &Session,
    ) -> Result<ApiResponse, MediaWikiError> {
        let request = params
            .into_iter()
            .fold(ApiRequest::post(), |request, (name, value)| {
                request.form(name, value)
            })
            .with_session(session);

        self.send(endpoint, &request).map(|(body, _)| body)
    }
}
