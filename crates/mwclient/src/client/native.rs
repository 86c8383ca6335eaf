use super::{
    ApiRequest, Endpoint, HttpError, MediaWikiClient, MediaWikiClientConfig, Method, RawResponse,
    Transport,
};
use crate::session::Cookie;
use ureq::Agent;

type InnerClient = ureq::Agent;

/// Blocking transport backed by a ureq [Agent]
///
/// The agent's own cookie store is never consulted, cookies travel with
/// each [ApiRequest].
pub struct UreqTransport {
    client: InnerClient,
    headers: http::HeaderMap,
}

impl UreqTransport {
    pub fn from_config(config: MediaWikiClientConfig) -> Self {
        let builder = ureq::config::Config::builder()
            .max_redirects(config.max_redirects)
            .timeout_global(config.timeout)
            // Statuses are judged by the client, not the backend
            .http_status_as_error(false);

        let client = Agent::new_with_config(builder.build());

        UreqTransport {
            client,
            headers: config.headers,
        }
    }

    /// Configured headers and the session cookies, shared by every method
    fn prepare<B>(
        &self,
        mut builder: ureq::RequestBuilder<B>,
        cookie: Option<String>,
    ) -> ureq::RequestBuilder<B> {
        for (name, value) in &self.headers {
            builder = builder.header(name, value);
        }

        match cookie {
            Some(cookie) => builder.header(http::header::COOKIE, cookie),
            None => builder,
        }
    }

    fn read(response: http::Response<ureq::Body>) -> Result<RawResponse, HttpError> {
        let status = response.status().as_u16();

        let cookies = set_cookies(response.headers());

        let body = response.into_body().read_to_string()?;

        Ok(RawResponse {
            status,
            cookies,
            body,
        })
    }
}

fn set_cookies(headers: &http::HeaderMap) -> Vec<Cookie> {
    headers
        .get_all(http::header::SET_COOKIE)
        .iter()
        .filter_map(|value| match value.to_str() {
            Ok(value) => Some(value),
            Err(_) => {
                log::debug!("Dropping Set-Cookie header that isn't visible ASCII: {value:?}");

                None
            }
        })
        .filter_map(Cookie::parse_set_cookie)
        .collect()
}

impl Transport for UreqTransport {
    fn execute(
        &self,
        endpoint: &Endpoint,
        request: &ApiRequest,
    ) -> Result<RawResponse, HttpError> {
        let url = endpoint.api_url(request.query_pairs());

        let cookie = request.cookie_header();

        let response = match request.method() {
            Method::Get => self.prepare(self.client.get(url.as_str()), cookie).call()?,
            Method::Post => {
                let builder = self.prepare(self.client.post(url.as_str()), cookie);

                if request.form_pairs().is_empty() {
                    builder.send_empty()?
                } else {
                    builder.send_form(
                        request
                            .form_pairs()
                            .iter()
                            .map(|(name, value)| (name.as_str(), value.as_str())),
                    )?
                }
            }
        };

        Self::read(response)
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::from_config(MediaWikiClientConfig::default())
    }
}

impl MediaWikiClient<UreqTransport> {
    pub fn from_config(config: MediaWikiClientConfig) -> Self {
        Self::with_transport(UreqTransport::from_config(config))
    }
}

impl Default for MediaWikiClient<UreqTransport> {
    fn default() -> Self {
        Self::from_config(MediaWikiClientConfig::default())
    }
}
