//! Clipper engine: HTTP transport, upload, polling and effect execution.
mod download;
mod engine;
mod poller;
mod prompts;
mod settings;
mod status;
mod transport;
mod types;
mod upload;

pub use download::{ensure_output_dir, safe_highlight_name, HighlightDownloader};
pub use engine::EngineHandle;
pub use poller::{JobStatusPoller, PollObserver, PollOutcome, PollSettings};
pub use prompts::{PromptCatalog, PromptDetail, PromptSummary};
pub use settings::{ClientSettings, DEFAULT_BASE_URL};
pub use status::{HttpStatusSource, StatusSource};
pub use transport::ServerEndpoints;
pub use types::{
    DownloadError, EngineError, EngineEvent, FailureKind, PollError, PromptError, UploadError,
    UploadFailure,
};
pub use upload::{HttpUploader, UploadFile, UploadProgressSink, UploadSession};
