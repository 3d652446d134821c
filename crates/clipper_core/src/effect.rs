use std::path::PathBuf;

use crate::{Generation, JobId, PromptChoice};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    StartUpload {
        generation: Generation,
        path: PathBuf,
        prompt: PromptChoice,
    },
    StartPolling {
        generation: Generation,
        job_id: JobId,
    },
    /// Abandon the poller of an older submission. Nothing is sent to the server.
    CancelPolling { generation: Generation },
    /// Run the terminal refresh once the grace period has elapsed.
    ScheduleRefresh { generation: Generation },
    DownloadHighlights {
        generation: Generation,
        filenames: Vec<String>,
    },
}
