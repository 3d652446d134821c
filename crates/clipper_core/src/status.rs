use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

/// Monotonic submission counter. Results tagged with an older generation
/// belong to an abandoned session and are discarded.
pub type Generation = u64;

/// Opaque job identifier issued by the server after a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One status snapshot as returned by `GET /status/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JobStatus {
    #[serde(default)]
    pub step: String,
    /// Explicit 0-100 progress. Absent, null and negative values all read as `None`.
    #[serde(default, deserialize_with = "lenient_progress")]
    pub progress: Option<u8>,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl JobStatus {
    pub fn new(step: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            ..Self::default()
        }
    }

    pub fn with_progress(mut self, progress: u8) -> Self {
        self.progress = Some(progress.min(100));
        self
    }

    pub fn with_highlights<I, S>(mut self, highlights: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.highlights = highlights.into_iter().map(Into::into).collect();
        self
    }
}

// The server writes whatever number its pipeline computed; accept integers and
// floats, clamp into 0..=100.
fn lenient_progress<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<f64> = Option::deserialize(deserializer)?;
    Ok(raw.and_then(|value| {
        if value.is_nan() || value < 0.0 {
            None
        } else {
            Some(value.round().min(100.0) as u8)
        }
    }))
}
