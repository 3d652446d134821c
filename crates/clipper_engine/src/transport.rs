use reqwest::Url;

use crate::{ClientSettings, EngineError};

/// URLs of the processing server's HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoints {
    base: Url,
}

impl ServerEndpoints {
    pub fn parse(base_url: &str) -> Result<Self, EngineError> {
        let invalid = |message: String| EngineError::InvalidBaseUrl {
            url: base_url.to_string(),
            message,
        };
        let base = Url::parse(base_url).map_err(|err| invalid(err.to_string()))?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(invalid(format!("unsupported scheme {}", base.scheme())));
        }
        if base.cannot_be_a_base() {
            return Err(invalid("url cannot carry a path".to_string()));
        }
        Ok(Self { base })
    }

    pub fn upload(&self) -> Url {
        self.join(&["upload"])
    }

    pub fn status(&self, job_id: &str) -> Url {
        self.join(&["status", job_id])
    }

    pub fn download(&self, filename: &str) -> Url {
        self.join(&["download", filename])
    }

    pub fn prompts(&self) -> Url {
        self.join(&["api", "prompts", "detect_highlight"])
    }

    pub fn prompt(&self, name: &str) -> Url {
        self.join(&["api", "prompts", "detect_highlight", name])
    }

    // Segments are percent-encoded, so ids and file names cannot escape their slot.
    fn join(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

/// Shared HTTP client. Per-request deadlines are set by the callers.
pub(crate) fn build_client(settings: &ClientSettings) -> Result<reqwest::Client, EngineError> {
    reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .build()
        .map_err(|err| EngineError::Client(err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::ServerEndpoints;

    #[test]
    fn joins_paths_under_base_prefix() {
        let endpoints = ServerEndpoints::parse("http://localhost:8000/clipper/").unwrap();
        assert_eq!(
            endpoints.status("abc").as_str(),
            "http://localhost:8000/clipper/status/abc"
        );
        assert_eq!(
            endpoints.prompts().as_str(),
            "http://localhost:8000/clipper/api/prompts/detect_highlight"
        );
    }

    #[test]
    fn encodes_untrusted_segments() {
        let endpoints = ServerEndpoints::parse("http://localhost:8000").unwrap();
        assert_eq!(
            endpoints.download("a b/../x.mp4").as_str(),
            "http://localhost:8000/download/a%20b%2F..%2Fx.mp4"
        );
    }

    #[test]
    fn rejects_non_http_urls() {
        assert!(ServerEndpoints::parse("ftp://localhost").is_err());
        assert!(ServerEndpoints::parse("mailto:someone@example.com").is_err());
        assert!(ServerEndpoints::parse("not a url").is_err());
    }
}
