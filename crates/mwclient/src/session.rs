use itertools::Itertools;
use std::fmt::{Debug, Display};

/// One `name=value` pair from a `Set-Cookie` header, attributes dropped
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cookie {
    name: String,
    value: String,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Cookie {
            name: name.into(),
            value: value.into(),
        }
    }

    /// Parse the value of a `Set-Cookie` header, e.g. `wiki_session=abc; path=/; HttpOnly`
    pub fn parse_set_cookie(header: &str) -> Option<Self> {
        let pair = header.split(';').next()?;

        let (name, value) = pair.split_once('=')?;

        let name = name.trim();

        if name.is_empty() {
            return None;
        }

        Some(Cookie::new(name, value.trim()))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

impl Display for Cookie {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// The cookies one wiki response set, in the order they were received
///
/// Presenting them again is what makes later calls part of the same
/// (possibly logged in) session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    cookies: Vec<Cookie>,
}

impl Session {
    pub fn from_cookies(cookies: Vec<Cookie>) -> Self {
        Session { cookies }
    }

    pub fn cookies(&self) -> &[Cookie] {
        &self.cookies
    }

    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.cookies
            .iter()
            .find(|cookie| cookie.name == name)
            .map(Cookie::value)
    }

    /// The value for a `Cookie` request header
    pub fn cookie_header(&self) -> String {
        self.cookies.iter().join("; ")
    }
}

/// A bot account's login name and password
#[derive(Clone)]
pub struct Credentials {
    name: String,
    password: String,
}

impl Credentials {
    pub fn new(name: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            name: name.into(),
            password: password.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn password(&self) -> &str {
        &self.password
    }
}

impl Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}
