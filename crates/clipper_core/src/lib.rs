//! Clipper core: pure progress reconciliation and the session state machine.
mod diff;
mod effect;
mod estimate;
mod msg;
mod state;
mod status;
mod update;
mod upload;
mod validate;
mod view_model;

pub use diff::{highlights_changed, DisplayedHighlightSet};
pub use effect::Effect;
pub use estimate::{
    classify, counter_percent, estimate, parse_phase_counter, Estimate, Percent, PhaseShape,
    PhaseVocabulary, COMPLETE_LABEL, DEFAULT_TERMINAL_SENTINEL, DEFAULT_UPLOAD_PREFIXES,
};
pub use msg::Msg;
pub use state::{AppState, SelectedFile, SessionState};
pub use status::{Generation, JobId, JobStatus};
pub use update::update;
pub use upload::{upload_percent, UploadProgress, UploadState, UploadTransitionError};
pub use validate::{
    validate_extension, validate_video, PromptChoice, ValidationError, VIDEO_EXTENSION,
};
pub use view_model::{AppViewModel, DownloadRow, Notice, NoticeSeverity};
