use std::time::Duration;

use clipper_core::{JobId, JobStatus};

use crate::transport::{build_client, ServerEndpoints};
use crate::types::map_reqwest_error;
use crate::{ClientSettings, EngineError, FailureKind, PollError};

/// Where the poller reads job status from.
#[async_trait::async_trait]
pub trait StatusSource: Send + Sync {
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatus, PollError>;
}

/// `GET /status/{id}` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpStatusSource {
    client: reqwest::Client,
    endpoints: ServerEndpoints,
    request_timeout: Duration,
}

impl HttpStatusSource {
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
}

#[async_trait::async_trait]
impl StatusSource for HttpStatusSource {
    async fn fetch_status(&self, job_id: &JobId) -> Result<JobStatus, PollError> {
        let response = self
            .client
            .get(self.endpoints.status(job_id.as_str()))
            .timeout(self.request_timeout)
            .send()
            .await
            .map_err(|err| PollError::new(map_reqwest_error(&err), err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(PollError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| PollError::new(map_reqwest_error(&err), err.to_string()))?;
        serde_json::from_slice(&body)
            .map_err(|err| PollError::new(FailureKind::MalformedResponse, err.to_string()))
    }
}
