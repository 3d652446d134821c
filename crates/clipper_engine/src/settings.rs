use std::time::Duration;

use clipper_core::PhaseVocabulary;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// Applies to each status fetch and prompt call. Uploads and downloads
    /// are only bounded by `connect_timeout`.
    pub request_timeout: Duration,
    pub poll_interval: Duration,
    pub refresh_grace: Duration,
    pub max_consecutive_poll_failures: u32,
    pub upload_chunk_bytes: usize,
    pub vocabulary: PhaseVocabulary,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            poll_interval: Duration::from_millis(1500),
            refresh_grace: Duration::from_millis(1200),
            max_consecutive_poll_failures: 5,
            upload_chunk_bytes: 256 * 1024,
            vocabulary: PhaseVocabulary::default(),
        }
    }
}
