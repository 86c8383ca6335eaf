#![forbid(unsafe_code)]

mod client;

pub use client::{
    ApiRequest, Endpoint, HeaderError, HttpError, MediaWikiClient, MediaWikiClientConfig, Method,
    RawResponse, Transport,
};

cfg_if::cfg_if! {
    if #[cfg(feature = "ureq")] {
        pub use client::UreqTransport;
    }
}

mod error;

pub use error::{EditFailure, EditStage, MediaWikiError};

mod response;

pub use response::{ApiError, ApiResponse};

mod session;

pub use session::{Cookie, Credentials, Session};

mod token;

pub use token::{Token, TokenKind};

mod auth;

mod section;

pub use section::{SectionRef, heading_prefixed};

mod edit;

pub use edit::{DEFAULT_CONTENT_MODEL, EditOutcome, EditRequest};

mod query;

pub use query::PurgedPage;
