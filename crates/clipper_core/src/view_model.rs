use std::path::PathBuf;

use crate::{Generation, JobId, PromptChoice, SessionState, UploadState};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeSeverity {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub severity: NoticeSeverity,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRow {
    pub filename: String,
    pub result: Result<PathBuf, String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub session: SessionState,
    pub generation: Generation,
    pub file_name: Option<String>,
    pub prompt: Option<PromptChoice>,
    pub upload_state: UploadState,
    pub job_id: Option<JobId>,
    pub phase_label: Option<String>,
    /// `None` hides the progress bar.
    pub percent: Option<u8>,
    pub highlights: Vec<String>,
    pub poll_updates: u32,
    pub downloads: Vec<DownloadRow>,
    pub pending_downloads: usize,
    pub form_ready: bool,
    pub notice: Option<Notice>,
    pub dirty: bool,
}
