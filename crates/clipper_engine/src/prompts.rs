use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::transport::{build_client, ServerEndpoints};
use crate::types::map_reqwest_error;
use crate::{ClientSettings, EngineError, FailureKind, PromptError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptSummary {
    pub name: String,
    /// Display label; falls back to the name when the server sends none.
    #[serde(default)]
    pub label: Option<String>,
}

impl PromptSummary {
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptDetail {
    pub name: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
struct PromptListing {
    #[serde(default)]
    items: Vec<PromptSummary>,
}

/// Highlight-detection prompts offered by the server.
#[derive(Debug, Clone)]
pub struct PromptCatalog {
    client: reqwest::Client,
    endpoints: ServerEndpoints,
    request_timeout: Duration,
}

impl PromptCatalog {
    pub fn new(settings: &ClientSettings) -> Result<Self, EngineError> {
        Ok(Self::from_parts(
            build_client(settings)?,
            ServerEndpoints::parse(&settings.base_url)?,
            settings.request_timeout,
        ))
    }

    pub(crate) fn from_parts(
        client: reqwest::Client,
        endpoints: ServerEndpoints,
        request_timeout: Duration,
    ) -> Self {
        Self {
            client,
            endpoints,
            request_timeout,
        }
    }

    pub async fn list(&self) -> Result<Vec<PromptSummary>, PromptError> {
        let body = self.get(self.endpoints.prompts(), None).await?;
        let listing: PromptListing = parse(&body)?;
        Ok(listing.items)
    }

    pub async fn fetch(&self, name: &str) -> Result<PromptDetail, PromptError> {
        let body = self.get(self.endpoints.prompt(name), Some(name)).await?;
        parse(&body)
    }

    async fn get(&self, url: reqwest::Url, name: Option<&str>) -> Result<Vec<u8>, PromptError> {
        let response = self
            .client
            .get(url)
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| request_error(map_reqwest_error(&err), err.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            if let Some(name) = name {
                return Err(PromptError::NotFound {
                    name: name.to_string(),
                });
            }
        }
        if !status.is_success() {
            return Err(request_error(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| request_error(map_reqwest_error(&err), err.to_string()))?;
        Ok(body.to_vec())
    }
}

fn parse<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, PromptError> {
    serde_json::from_slice(body)
        .map_err(|err| request_error(FailureKind::MalformedResponse, err.to_string()))
}

fn request_error(kind: FailureKind, message: String) -> PromptError {
    PromptError::Request { kind, message }
}
