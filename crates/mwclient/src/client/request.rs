use crate::session::{Cookie, Session};
use std::fmt::Display;
use url::Url;

/// The base URI of a wiki, `<endpoint>/api.php` is the action API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    base: String,
    api: Url,
}

impl Endpoint {
    /// Parse an endpoint base, a trailing `/` is ignored
    ///
    /// # Errors
    ///
    /// This method fails if `<base>/api.php` is not a valid URL
    pub fn parse(base: impl AsRef<str>) -> Result<Self, url::ParseError> {
        let base = base.as_ref().trim_end_matches('/').to_string();

        let api = Url::parse(format!("{base}/api.php").as_str())?;

        Ok(Endpoint { base, api })
    }

    /// `<endpoint>/api.php` with `format=json` and the request's query string
    pub fn api_url(&self, query: &[(String, String)]) -> Url {
        let mut url = self.api.clone();

        {
            let mut pairs = url.query_pairs_mut();

            pairs.append_pair("format", "json");

            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }

        url
    }
}

impl Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.base)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

/// A single action API call, described independently of the HTTP backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    method: Method,
    query: Vec<(String, String)>,
    // Only sent for POST, always form-urlencoded
    form: Vec<(String, String)>,
    session: Option<Session>,
}

impl ApiRequest {
    pub fn get() -> Self {
        Self::new(Method::Get)
    }

    pub fn post() -> Self {
        Self::new(Method::Post)
    }

    fn new(method: Method) -> Self {
        ApiRequest {
            method,
            query: Vec::new(),
            form: Vec::new(),
            session: None,
        }
    }

    pub fn query(mut self, name: impl Display, value: impl Display) -> Self {
        self.query.push((name.to_string(), value.to_string()));

        self
    }

    pub fn form(mut self, name: impl Display, value: impl Display) -> Self {
        self.form.push((name.to_string(), value.to_string()));

        self
    }

    pub fn with_session(self, session: &Session) -> Self {
        Self {
            session: Some(session.clone()),
            ..self
        }
    }

    pub fn method(&self) -> Method {
        self.method
    }

    pub fn query_pairs(&self) -> &[(String, String)] {
        &self.query
    }

    pub fn form_pairs(&self) -> &[(String, String)] {
        &self.form
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn query_value(&self, name: &str) -> Option<&str> {
        lookup(&self.query, name)
    }

    pub fn form_value(&self, name: &str) -> Option<&str> {
        lookup(&self.form, name)
    }

    /// The `action` parameter, wherever it was placed
    pub fn action(&self) -> Option<&str> {
        self.query_value("action")
            .or_else(|| self.form_value("action"))
    }

    /// The value of the `Cookie` header, if any cookies are attached
    pub fn cookie_header(&self) -> Option<String> {
        self.session
            .as_ref()
            .filter(|session| !session.is_empty())
            .map(Session::cookie_header)
    }
}

fn lookup<'a>(pairs: &'a [(String, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

/// What a transport hands back before any status or JSON checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub cookies: Vec<Cookie>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        RawResponse {
            status,
            cookies: Vec::new(),
            body: body.into(),
        }
    }

    /// Add a cookie as if the server had sent it in a `Set-Cookie` header
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.push(Cookie::new(name, value));

        self
    }
}
