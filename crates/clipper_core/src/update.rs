use clipper_logging::{clipper_debug, clipper_info, clipper_warn};

use crate::validate::validate_video;
use crate::view_model::NoticeSeverity;
use crate::{AppState, Effect, Msg, SelectedFile, SessionState, ValidationError};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    if let Some(generation) = msg.generation() {
        if !state.is_current(generation) {
            clipper_debug!(
                "Dropping stale message generation={} current={}",
                generation,
                state.generation()
            );
            return (state, Vec::new());
        }
    }

    let effects = match msg {
        Msg::FileSelected {
            path,
            file_name,
            size,
        } => {
            match validate_video(&file_name, size) {
                Ok(()) => {
                    state.set_file(Some(SelectedFile {
                        path,
                        file_name,
                        size,
                    }));
                }
                Err(err) => {
                    state.set_file(None);
                    state.set_notice(NoticeSeverity::Error, err.to_string());
                }
            }
            Vec::new()
        }
        Msg::PromptChosen(prompt) => {
            state.set_prompt(prompt);
            Vec::new()
        }
        Msg::AutoDownloadToggled(enabled) => {
            state.set_auto_download(enabled);
            Vec::new()
        }
        Msg::SubmitClicked => submit(&mut state),
        Msg::UploadProgress { sent, total, .. } => {
            if state.session() == SessionState::Uploading {
                if let Some(percent) = state.upload_mut().record(sent, total) {
                    state.set_upload_percent(percent);
                }
            }
            Vec::new()
        }
        Msg::UploadFinished { generation, result } => {
            // The hand-off to polling happens at most once per submission.
            if state.session() != SessionState::Uploading {
                return (state, Vec::new());
            }
            match result {
                Ok(job_id) => {
                    let _ = state.upload_mut().finish();
                    clipper_info!("Upload finished generation={} job_id={}", generation, job_id);
                    state.start_processing(job_id.clone());
                    vec![Effect::StartPolling { generation, job_id }]
                }
                Err(message) => {
                    let _ = state.upload_mut().fail();
                    clipper_warn!("Upload failed generation={}: {}", generation, message);
                    state.fail(message);
                    Vec::new()
                }
            }
        }
        Msg::StatusUpdated { label, percent, .. } => {
            if state.session() == SessionState::Processing {
                state.apply_status(label, percent);
            }
            Vec::new()
        }
        Msg::HighlightsChanged { highlights, .. } => {
            if state.session() == SessionState::Processing {
                state.replace_highlights(highlights);
            }
            Vec::new()
        }
        Msg::JobCompleted { generation } => {
            if state.session() == SessionState::Processing {
                clipper_info!("Job completed generation={}", generation);
                state.complete();
                vec![Effect::ScheduleRefresh { generation }]
            } else {
                Vec::new()
            }
        }
        Msg::PollFailed { message, .. } => {
            if state.session() == SessionState::Processing {
                state.fail(message);
            }
            Vec::new()
        }
        Msg::RefreshDue { generation } => {
            if state.session() != SessionState::Completed {
                return (state, Vec::new());
            }
            let filenames = if state.auto_download() {
                state.highlights().to_vec()
            } else {
                Vec::new()
            };
            state.refresh(filenames.len());
            if filenames.is_empty() {
                Vec::new()
            } else {
                vec![Effect::DownloadHighlights {
                    generation,
                    filenames,
                }]
            }
        }
        Msg::HighlightDownloaded {
            filename, result, ..
        } => {
            state.record_download(filename, result);
            Vec::new()
        }
        Msg::Tick | Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn submit(state: &mut AppState) -> Vec<Effect> {
    if state.session() == SessionState::Uploading {
        return Vec::new();
    }
    let Some(path) = state.file().map(|file| file.path.clone()) else {
        state.set_notice(
            NoticeSeverity::Error,
            ValidationError::NoFileSelected.to_string(),
        );
        return Vec::new();
    };
    let Some(prompt) = state.prompt().cloned() else {
        state.set_notice(
            NoticeSeverity::Error,
            ValidationError::NoPromptChosen.to_string(),
        );
        return Vec::new();
    };

    let previous = state.generation();
    let abandoning = state.session() == SessionState::Processing;
    let generation = state.begin_submission();
    let size = state.file().map_or(0, |file| file.size);
    let _ = state.upload_mut().begin(size);

    let mut effects = Vec::with_capacity(2);
    if abandoning {
        effects.push(Effect::CancelPolling {
            generation: previous,
        });
    }
    effects.push(Effect::StartUpload {
        generation,
        path,
        prompt,
    });
    effects
}
