use reqwest::{Method, RequestBuilder, Url};
use serde::Serialize;
use tracing::debug;

use crate::config::RestConfig;
use crate::error::{RestError, RestResult};
use crate::reply::Reply;

const APPLICATION_ID_HEADER: &str = "X-Parse-Application-Id";
const REST_API_KEY_HEADER: &str = "X-Parse-REST-API-Key";

/// Authenticated handle to one object server.
///
/// Cheap to clone: the underlying connection pool is shared.
#[derive(Clone)]
pub struct RestClient {
    http: reqwest::Client,
    base_url: Url,
    application_id: String,
    rest_api_key: String,
}

impl RestClient {
    /// Build a client with its own connection pool and the configured timeout.
    pub fn new(config: &RestConfig) -> RestResult<Self> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Self::with_http_client(config, http)
    }

    /// Build a client on top of an existing `reqwest::Client`.
    pub fn with_http_client(config: &RestConfig, http: reqwest::Client) -> RestResult<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| RestError::InvalidBaseUrl {
            url: config.base_url.clone(),
            reason: e.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(RestError::InvalidBaseUrl {
                url: config.base_url.clone(),
                reason: "not a hierarchical URL".into(),
            });
        }
        Ok(Self {
            http,
            base_url,
            application_id: config.application_id.clone(),
            rest_api_key: config.rest_api_key.clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{segments...}` with each segment percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> RestResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| RestError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: "not a hierarchical URL".into(),
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header(APPLICATION_ID_HEADER, &self.application_id)
            .header(REST_API_KEY_HEADER, &self.rest_api_key)
    }

    /// Send a request without a body.
    pub(crate) async fn send(
        &self,
        method: Method,
        url: Url,
        query: &[(&str, String)],
    ) -> RestResult<Reply> {
        let mut builder = self.request(method.clone(), url.clone());
        if !query.is_empty() {
            builder = builder.query(query);
        }
        Self::execute(method, url, builder).await
    }

    /// Send a request with a JSON body.
    pub(crate) async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        url: Url,
        body: &B,
    ) -> RestResult<Reply> {
        // `.json()` sets `Content-Type: application/json`.
        let builder = self.request(method.clone(), url.clone()).json(body);
        Self::execute(method, url, builder).await
    }

    async fn execute(method: Method, url: Url, builder: RequestBuilder) -> RestResult<Reply> {
        let response = builder.send().await?;
        let status = response.status();
        let body = response.text().await?;
        debug!(%method, %url, %status, "server replied");
        Ok(Reply::new(status, body))
    }
}

impl std::fmt::Debug for RestClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestClient")
            .field("base_url", &self.base_url.as_str())
            .field("application_id", &self.application_id)
            .finish_non_exhaustive()
    }
}
