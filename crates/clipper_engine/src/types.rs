use std::fmt;
use std::path::PathBuf;

use clipper_core::{Generation, JobId, Percent, ValidationError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadProgress {
        generation: Generation,
        sent: u64,
        total: u64,
    },
    UploadFinished {
        generation: Generation,
        result: Result<JobId, UploadError>,
    },
    StatusUpdated {
        generation: Generation,
        label: String,
        percent: Percent,
    },
    HighlightsChanged {
        generation: Generation,
        highlights: Vec<String>,
    },
    JobCompleted {
        generation: Generation,
    },
    PollFailed {
        generation: Generation,
        error: PollError,
    },
    RefreshDue {
        generation: Generation,
    },
    HighlightDownloaded {
        generation: Generation,
        filename: String,
        result: Result<PathBuf, DownloadError>,
    },
}

impl EngineEvent {
    pub fn generation(&self) -> Generation {
        match self {
            EngineEvent::UploadProgress { generation, .. }
            | EngineEvent::UploadFinished { generation, .. }
            | EngineEvent::StatusUpdated { generation, .. }
            | EngineEvent::HighlightsChanged { generation, .. }
            | EngineEvent::JobCompleted { generation }
            | EngineEvent::PollFailed { generation, .. }
            | EngineEvent::RefreshDue { generation }
            | EngineEvent::HighlightDownloaded { generation, .. } => *generation,
        }
    }
}

/// Transport-level failure classes shared by every request the client makes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    HttpStatus(u16),
    Timeout,
    Network,
    MalformedResponse,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadFailure {
    Invalid(ValidationError),
    AlreadyStarted,
    Transport(FailureKind),
}

impl fmt::Display for UploadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadFailure::Invalid(err) => write!(f, "invalid file: {err}"),
            UploadFailure::AlreadyStarted => write!(f, "upload already started"),
            UploadFailure::Transport(kind) => write!(f, "{kind}"),
        }
    }
}

/// `POST /upload` did not yield a job id. Never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("upload failed ({kind}): {message}")]
pub struct UploadError {
    pub kind: UploadFailure,
    pub message: String,
}

impl UploadError {
    pub(crate) fn new(kind: UploadFailure, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub(crate) fn transport(kind: FailureKind, message: impl Into<String>) -> Self {
        Self::new(UploadFailure::Transport(kind), message)
    }
}

impl From<ValidationError> for UploadError {
    fn from(err: ValidationError) -> Self {
        let message = err.to_string();
        Self::new(UploadFailure::Invalid(err), message)
    }
}

/// A `GET /status/{id}` cycle failed. `attempts` counts consecutive failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status polling failed after {attempts} attempt(s) ({kind}): {message}")]
pub struct PollError {
    pub kind: FailureKind,
    pub message: String,
    pub attempts: u32,
}

impl PollError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            attempts: 1,
        }
    }

    pub(crate) fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PromptError {
    #[error("prompt {name:?} not found")]
    NotFound { name: String },
    #[error("prompt request failed ({kind}): {message}")]
    Request { kind: FailureKind, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("refusing unsafe highlight file name {0:?}")]
    UnsafeFileName(String),
    #[error("output directory unusable: {0}")]
    OutputDir(String),
    #[error("download failed ({kind}): {message}")]
    Request { kind: FailureKind, message: String },
    #[error("write failed: {0}")]
    Write(String),
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("invalid server url {url:?}: {message}")]
    InvalidBaseUrl { url: String, message: String },
    #[error("failed to build http client: {0}")]
    Client(String),
    #[error(transparent)]
    Prompt(#[from] PromptError),
    #[error("engine thread is gone")]
    Disconnected,
}

pub(crate) fn map_reqwest_error(err: &reqwest::Error) -> FailureKind {
    if err.is_timeout() {
        FailureKind::Timeout
    } else if err.is_decode() {
        FailureKind::MalformedResponse
    } else {
        FailureKind::Network
    }
}
