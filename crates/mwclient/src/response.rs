use crate::error::MediaWikiError;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use std::fmt::Display;

/// A decoded action API body, the top level is always an object
///
/// Operations narrow it with [ApiResponse::field] into the schema they
/// expect, so a missing or mistyped field is reported by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiResponse {
    body: Map<String, Value>,
}

/// The top-level `error` of a response
///
/// Older wikis send a bare string, current ones send `{"code": ..., "info": ...}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: String,
    pub info: String,
}

impl ApiError {
    /// `missingtitle`, the page doesn't exist (yet)
    pub fn is_missing_title(&self) -> bool {
        self.code == MISSING_TITLE
    }
}

const MISSING_TITLE: &str = "missingtitle";

#[derive(Deserialize)]
#[serde(untagged)]
enum RawApiError {
    Message(String),
    Detailed {
        #[serde(default)]
        code: String,
        #[serde(default)]
        info: String,
    },
}

impl Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.code.is_empty(), self.info.is_empty()) {
            (true, _) => f.write_str(&self.info),
            (false, true) => f.write_str(&self.code),
            (false, false) => write!(f, "{}: {}", self.code, self.info),
        }
    }
}

impl ApiResponse {
    /// # Errors
    ///
    /// Fails on malformed JSON or when the top level is not an object
    pub fn from_json(body: &str) -> Result<Self, serde_json::Error> {
        Ok(ApiResponse {
            body: serde_json::from_str(body)?,
        })
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.body.keys()
    }

    /// The top-level error, if one is present and non-empty
    pub fn error(&self) -> Option<ApiError> {
        let raw = RawApiError::deserialize(self.body.get("error")?).ok();

        match raw {
            Some(RawApiError::Message(info)) if info.is_empty() => None,
            Some(RawApiError::Message(info)) => Some(ApiError {
                code: String::new(),
                info,
            }),
            Some(RawApiError::Detailed { code, info }) => Some(ApiError { code, info }),
            // Something unexpected is sitting under "error", still an error
            None => Some(ApiError {
                code: String::new(),
                info: self.body.get("error").map(Value::to_string).unwrap_or_default(),
            }),
        }
    }

    /// Narrow a required top-level field into `T`
    ///
    /// # Errors
    ///
    /// [MediaWikiError::Protocol] naming `key` if it is absent or doesn't fit `T`
    pub fn field<T: DeserializeOwned>(&self, key: &str) -> Result<T, MediaWikiError> {
        self.optional_field(key)?
            .ok_or_else(|| MediaWikiError::protocol(key, "missing"))
    }

    /// Like [ApiResponse::field], but an absent (or `null`) field is `Ok(None)`
    ///
    /// # Errors
    ///
    /// [MediaWikiError::Protocol] naming `key` if it is present but doesn't fit `T`
    pub fn optional_field<T: DeserializeOwned>(
        &self,
        key: &str,
    ) -> Result<Option<T>, MediaWikiError> {
        match self.body.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(value) => T::deserialize(value)
                .map(Some)
                .map_err(|err| MediaWikiError::protocol(key, err)),
        }
    }
}

#[cfg(test)]
mod test {
    use super::{ApiError, ApiResponse};
    use crate::error::MediaWikiError;
    use pretty_assertions::assert_eq;
    use serde::Deserialize;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Inner {
        result: String,
    }

    #[test]
    fn string_error_is_found() {
        let response = ApiResponse::from_json(r#"{"error": "readonly"}"#).unwrap();

        assert_eq!(
            response.error(),
            Some(ApiError {
                code: String::new(),
                info: "readonly".to_string()
            })
        );
    }

    #[test]
    fn object_error_is_found() {
        let response = ApiResponse::from_json(
            r#"{"error": {"code": "badtoken", "info": "Invalid CSRF token.", "*": "See api.php"}}"#,
        )
        .unwrap();

        let error = response.error().unwrap();

        assert_eq!(error.code, "badtoken");
        assert_eq!(error.to_string(), "badtoken: Invalid CSRF token.");
        assert!(!error.is_missing_title());
    }

    #[test]
    fn missing_title_is_recognised_by_code() {
        let missing = ApiResponse::from_json(
            r#"{"error": {"code": "missingtitle", "info": "The page you specified doesn't exist."}}"#,
        )
        .unwrap();
        let bare = ApiResponse::from_json(r#"{"error": "missingtitle"}"#).unwrap();

        assert!(missing.error().unwrap().is_missing_title());
        // Without a code there is nothing to go on
        assert!(!bare.error().unwrap().is_missing_title());
    }

    #[test]
    fn empty_error_string_is_no_error() {
        let response = ApiResponse::from_json(r#"{"error": "", "edit": {}}"#).unwrap();

        assert_eq!(response.error(), None);
        assert_eq!(ApiResponse::from_json("{}").unwrap().error(), None);
    }

    #[test]
    fn missing_field_names_the_field() {
        let response = ApiResponse::from_json(r#"{"batchcomplete": ""}"#).unwrap();

        match response.field::<Inner>("edit") {
            Err(MediaWikiError::Protocol { field, detail }) => {
                assert_eq!(field, "edit");
                assert_eq!(detail, "missing");
            }
            other => panic!("Expected a protocol error, got {other:?}"),
        }
    }

    #[test]
    fn mistyped_field_is_protocol_error() {
        let response = ApiResponse::from_json(r#"{"edit": "Success"}"#).unwrap();

        assert!(matches!(
            response.field::<Inner>("edit"),
            Err(MediaWikiError::Protocol { field, .. }) if field == "edit"
        ));
    }

    #[test]
    fn present_field_is_narrowed() {
        let response = ApiResponse::from_json(r#"{"edit": {"result": "Success"}}"#).unwrap();

        assert_eq!(
            response.field::<Inner>("edit").unwrap(),
            Inner {
                result: "Success".to_string()
            }
        );
        assert_eq!(response.optional_field::<Inner>("login").unwrap(), None);
    }
}
