use std::path::PathBuf;

use crate::{Generation, JobId, Percent, PromptChoice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a video file.
    FileSelected {
        path: PathBuf,
        file_name: String,
        size: u64,
    },
    /// User changed the prompt selection; `None` clears it.
    PromptChosen(Option<PromptChoice>),
    /// User asked for finished highlights to be saved locally.
    AutoDownloadToggled(bool),
    /// User submitted the form.
    SubmitClicked,
    /// Transport progress for the upload.
    UploadProgress {
        generation: Generation,
        sent: u64,
        total: u64,
    },
    /// Upload finished, with the issued job id or a user-facing error.
    UploadFinished {
        generation: Generation,
        result: Result<JobId, String>,
    },
    /// Poller produced a new label/percent pair.
    StatusUpdated {
        generation: Generation,
        label: String,
        percent: Percent,
    },
    /// Poller saw a different highlight list.
    HighlightsChanged {
        generation: Generation,
        highlights: Vec<String>,
    },
    /// Poller observed the terminal sentinel.
    JobCompleted { generation: Generation },
    /// Poller gave up after repeated failures.
    PollFailed {
        generation: Generation,
        message: String,
    },
    /// Grace period after completion elapsed.
    RefreshDue { generation: Generation },
    /// One highlight download finished.
    HighlightDownloaded {
        generation: Generation,
        filename: String,
        result: Result<PathBuf, String>,
    },
    /// Render tick. The app renders a dirty view only on ticks.
    Tick,
    /// Fallback for placeholder wiring.
    NoOp,
}

impl Msg {
    /// Generation of engine-originated messages; `None` for user input.
    pub fn generation(&self) -> Option<Generation> {
        match self {
            Msg::UploadProgress { generation, .. }
            | Msg::UploadFinished { generation, .. }
            | Msg::StatusUpdated { generation, .. }
            | Msg::HighlightsChanged { generation, .. }
            | Msg::JobCompleted { generation }
            | Msg::PollFailed { generation, .. }
            | Msg::RefreshDue { generation }
            | Msg::HighlightDownloaded { generation, .. } => Some(*generation),
            Msg::FileSelected { .. }
            | Msg::PromptChosen(_)
            | Msg::AutoDownloadToggled(_)
            | Msg::SubmitClicked
            | Msg::Tick
            | Msg::NoOp => None,
        }
    }
}
