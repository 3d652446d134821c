use std::path::PathBuf;

use clipper_core::{Effect, Msg};
use clipper_engine::{EngineEvent, EngineHandle};
use clipper_logging::{clipper_info, clipper_warn};

/// Hands effects produced by `update` to the engine.
pub struct EffectRunner {
    engine: EngineHandle,
    download_dir: PathBuf,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, download_dir: PathBuf) -> Self {
        Self {
            engine,
            download_dir,
        }
    }

    pub fn engine(&self) -> &EngineHandle {
        &self.engine
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::StartUpload {
                    generation,
                    path,
                    prompt,
                } => {
                    clipper_info!(
                        "StartUpload generation={} path={:?} {}={}",
                        generation,
                        path,
                        prompt.field_name(),
                        prompt.value()
                    );
                    self.engine.upload(generation, path, Some(prompt));
                }
                Effect::StartPolling { generation, job_id } => {
                    clipper_info!("StartPolling generation={} job_id={}", generation, job_id);
                    self.engine.poll(generation, job_id);
                }
                Effect::CancelPolling { generation } => {
                    self.engine.cancel(generation);
                }
                Effect::ScheduleRefresh { generation } => {
                    self.engine.schedule_refresh(generation);
                }
                Effect::DownloadHighlights {
                    generation,
                    filenames,
                } => {
                    clipper_info!(
                        "DownloadHighlights generation={} count={} dir={:?}",
                        generation,
                        filenames.len(),
                        self.download_dir
                    );
                    self.engine
                        .download(generation, filenames, self.download_dir.clone());
                }
            }
        }
    }
}

/// Translates an engine event into the message `update` understands. Error
/// values become their user-facing text.
pub fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadProgress {
            generation,
            sent,
            total,
        } => Msg::UploadProgress {
            generation,
            sent,
            total,
        },
        EngineEvent::UploadFinished { generation, result } => Msg::UploadFinished {
            generation,
            result: result.map_err(|err| err.to_string()),
        },
        EngineEvent::StatusUpdated {
            generation,
            label,
            percent,
        } => Msg::StatusUpdated {
            generation,
            label,
            percent,
        },
        EngineEvent::HighlightsChanged {
            generation,
            highlights,
        } => Msg::HighlightsChanged {
            generation,
            highlights,
        },
        EngineEvent::JobCompleted { generation } => Msg::JobCompleted { generation },
        EngineEvent::PollFailed { generation, error } => {
            clipper_warn!("Polling stopped generation={}: {}", generation, error);
            Msg::PollFailed {
                generation,
                message: error.to_string(),
            }
        }
        EngineEvent::RefreshDue { generation } => Msg::RefreshDue { generation },
        EngineEvent::HighlightDownloaded {
            generation,
            filename,
            result,
        } => {
            if let Err(err) = &result {
                clipper_warn!("Download of {} failed: {}", filename, err);
            }
            Msg::HighlightDownloaded {
                generation,
                filename,
                result: result.map_err(|err| err.to_string()),
            }
        }
    }
}
