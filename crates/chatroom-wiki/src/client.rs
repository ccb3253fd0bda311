use std::time::Duration;

use async_trait::async_trait;
use chatroom_core::config::WikiConfig;
use reqwest::Url;
use tracing::{debug, warn};

use crate::error::LookupError;
use crate::response::{extract_summary, Summary};
use crate::SummaryLookup;

/// MediaWiki `prop=extracts` client: intro section, plain text, redirects
/// followed.
pub struct WikiClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl WikiClient {
    pub fn new(endpoint: &str, timeout: Option<Duration>) -> Result<Self, LookupError> {
        let endpoint = Url::parse(endpoint).map_err(|e| LookupError::Endpoint {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })?;

        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("chatroom/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
            endpoint,
        })
    }

    pub fn from_config(config: &WikiConfig) -> Result<Self, LookupError> {
        Self::new(
            &config.endpoint,
            config.timeout_secs.map(Duration::from_secs),
        )
    }

    /// Full request URL for `topic`. The topic is form-encoded as the
    /// `titles` value, so `&`, `#` and friends cannot alter the query.
    pub fn request_url(&self, topic: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("action", "query")
            .append_pair("prop", "extracts")
            .append_key_only("exintro")
            .append_key_only("explaintext")
            .append_pair("redirects", "1")
            .append_pair("titles", topic);
        url
    }
}

#[async_trait]
impl SummaryLookup for WikiClient {
    fn name(&self) -> &str {
        "wikipedia"
    }

    async fn summary(&self, topic: &str) -> Result<Summary, LookupError> {
        let url = self.request_url(topic);
        debug!(%url, "requesting page summary");

        let resp = self.client.get(url).send().await?;

        let status = resp.status().as_u16();
        if !resp.status().is_success() {
            let text = resp.text().await.unwrap_or_default();
            warn!(status, body = %text, "summary API error");
            return Err(LookupError::Api {
                status,
                message: text,
            });
        }

        let body = resp.text().await?;
        extract_summary(&body)
    }
}
