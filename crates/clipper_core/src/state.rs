use std::path::PathBuf;

use crate::view_model::{AppViewModel, DownloadRow, Notice, NoticeSeverity};
use crate::{Generation, JobId, PromptChoice, UploadProgress};

/// Where the current submission is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Uploading,
    Processing,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub file_name: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    session: SessionState,
    generation: Generation,
    file: Option<SelectedFile>,
    prompt: Option<PromptChoice>,
    auto_download: bool,
    upload: UploadProgress,
    job_id: Option<JobId>,
    phase_label: Option<String>,
    percent: Option<u8>,
    highlights: Vec<String>,
    poll_updates: u32,
    downloads: Vec<DownloadRow>,
    pending_downloads: usize,
    refreshed: bool,
    notice: Option<Notice>,
    dirty: bool,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> AppViewModel {
        AppViewModel {
            session: self.session,
            generation: self.generation,
            file_name: self.file.as_ref().map(|file| file.file_name.clone()),
            prompt: self.prompt.clone(),
            upload_state: self.upload.state(),
            job_id: self.job_id.clone(),
            phase_label: self.phase_label.clone(),
            percent: self.percent,
            highlights: self.highlights.clone(),
            poll_updates: self.poll_updates,
            downloads: self.downloads.clone(),
            pending_downloads: self.pending_downloads,
            form_ready: self.form_ready(),
            notice: self.notice.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns and clears the dirty flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    /// Nothing left to wait for: the submission failed, or it completed,
    /// was refreshed and every requested download has reported back.
    pub fn is_settled(&self) -> bool {
        match self.session {
            SessionState::Failed => true,
            SessionState::Idle => self.refreshed && self.pending_downloads == 0,
            SessionState::Uploading | SessionState::Processing | SessionState::Completed => false,
        }
    }

    pub fn session(&self) -> SessionState {
        self.session
    }

    pub fn generation(&self) -> Generation {
        self.generation
    }

    pub fn highlights(&self) -> &[String] {
        &self.highlights
    }

    pub fn form_ready(&self) -> bool {
        self.file.is_some() && self.prompt.is_some()
    }

    pub(crate) fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub(crate) fn prompt(&self) -> Option<&PromptChoice> {
        self.prompt.as_ref()
    }

    pub(crate) fn auto_download(&self) -> bool {
        self.auto_download
    }

    pub(crate) fn upload_mut(&mut self) -> &mut UploadProgress {
        &mut self.upload
    }

    pub(crate) fn is_current(&self, generation: Generation) -> bool {
        generation == self.generation
    }

    pub(crate) fn set_file(&mut self, file: Option<SelectedFile>) {
        self.file = file;
        self.mark_dirty();
    }

    pub(crate) fn set_prompt(&mut self, prompt: Option<PromptChoice>) {
        if self.prompt != prompt {
            self.prompt = prompt;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_auto_download(&mut self, enabled: bool) {
        self.auto_download = enabled;
    }

    /// Starts a fresh submission and returns its generation. The previous
    /// job's highlight snapshot is never inherited.
    pub(crate) fn begin_submission(&mut self) -> Generation {
        self.generation += 1;
        self.session = SessionState::Uploading;
        self.upload = UploadProgress::new();
        self.job_id = None;
        self.phase_label = Some("Uploading".to_string());
        self.percent = None;
        self.highlights.clear();
        self.poll_updates = 0;
        self.downloads.clear();
        self.pending_downloads = 0;
        self.refreshed = false;
        self.notice = None;
        self.mark_dirty();
        self.generation
    }

    pub(crate) fn set_upload_percent(&mut self, percent: u8) {
        if self.percent != Some(percent) {
            self.percent = Some(percent);
            self.mark_dirty();
        }
    }

    pub(crate) fn start_processing(&mut self, job_id: JobId) {
        self.session = SessionState::Processing;
        self.job_id = Some(job_id);
        self.phase_label = Some("Upload complete, processing...".to_string());
        self.percent = Some(100);
        self.highlights.clear();
        self.mark_dirty();
    }

    /// Applies one poll result; only actual changes dirty the view.
    pub(crate) fn apply_status(&mut self, label: String, percent: crate::Percent) {
        self.poll_updates += 1;
        let next_percent = match percent {
            crate::Percent::Known(value) => Some(value.min(100)),
            crate::Percent::Unchanged => self.percent,
            crate::Percent::Indeterminate => None,
        };
        if self.phase_label.as_deref() != Some(label.as_str()) {
            self.phase_label = Some(label);
            self.mark_dirty();
        }
        if self.percent != next_percent {
            self.percent = next_percent;
            self.mark_dirty();
        }
    }

    pub(crate) fn replace_highlights(&mut self, highlights: Vec<String>) -> bool {
        if !crate::highlights_changed(&self.highlights, &highlights) {
            return false;
        }
        self.highlights = highlights;
        self.mark_dirty();
        true
    }

    pub(crate) fn complete(&mut self) {
        self.session = SessionState::Completed;
        self.phase_label = Some(crate::COMPLETE_LABEL.to_string());
        self.percent = Some(100);
        self.mark_dirty();
    }

    pub(crate) fn fail(&mut self, message: impl Into<String>) {
        self.session = SessionState::Failed;
        self.percent = None;
        self.set_notice(NoticeSeverity::Error, message);
    }

    /// Terminal render pass: the session returns to `Idle`, keeping the
    /// finished highlights on display.
    pub(crate) fn refresh(&mut self, pending_downloads: usize) {
        self.session = SessionState::Idle;
        self.file = None;
        self.upload = UploadProgress::new();
        self.refreshed = true;
        self.pending_downloads = pending_downloads;
        self.set_notice(NoticeSeverity::Info, "Ready for a new video");
    }

    pub(crate) fn record_download(&mut self, filename: String, result: Result<PathBuf, String>) {
        self.pending_downloads = self.pending_downloads.saturating_sub(1);
        self.downloads.push(DownloadRow { filename, result });
        self.mark_dirty();
    }

    pub(crate) fn set_notice(&mut self, severity: NoticeSeverity, text: impl Into<String>) {
        self.notice = Some(Notice {
            severity,
            text: text.into(),
        });
        self.mark_dirty();
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }
}
