use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use tracing::trace;
use url::Url;

use crate::{
    application::ports::{ContentSource, FetchError},
    domain::fragments::FragmentId,
    infra::error::InfraError,
};

use super::{decode_body, plain_file_name};

/// Fetches fragments over HTTP from `<base>/<fragment id>`.
#[derive(Debug, Clone)]
pub struct HttpContentSource {
    client: Client,
    base: Url,
}

impl HttpContentSource {
    pub fn new(base_url: &str) -> Result<Self, InfraError> {
        let base = normalize_base_url(base_url)?;
        let client = Client::builder().user_agent(Self::user_agent()).build()?;
        Ok(Self { client, base })
    }

    pub fn user_agent() -> &'static str {
        concat!("hydrator/", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, fragment: &FragmentId) -> Result<Url, FetchError> {
        let name = plain_file_name(fragment)?;
        self.base
            .join(name)
            .map_err(|err| FetchError::transport(format!("invalid fragment url: {err}")))
    }
}

#[async_trait]
impl ContentSource for HttpContentSource {
    async fn fetch(&self, fragment: &FragmentId) -> Result<String, FetchError> {
        let url = self.url(fragment)?;
        trace!(target: "hydrator::content", url = %url, "requesting fragment");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|err| FetchError::transport(err.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound);
        }
        if !status.is_success() {
            return Err(FetchError::transport(format!("unexpected status {status}")));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|err| FetchError::transport(err.to_string()))?;
        Ok(decode_body(&bytes))
    }
}

/// The base must be an absolute http(s) URL; a trailing slash is added so
/// fragment names resolve inside it rather than replacing its last segment.
fn normalize_base_url(raw: &str) -> Result<Url, InfraError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(InfraError::configuration("content base url must not be empty"));
    }
    let with_slash = format!("{}/", trimmed.trim_end_matches('/'));
    let url = Url::parse(&with_slash).map_err(|err| {
        InfraError::configuration(format!("invalid content base url `{trimmed}`: {err}"))
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(InfraError::configuration(format!(
            "content base url `{trimmed}` must use http or https"
        )));
    }
    Ok(url)
}
