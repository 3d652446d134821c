use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use clipper_core::{Generation, JobId, Percent, PromptChoice};
use clipper_logging::{clipper_debug, clipper_info};
use tokio::sync::mpsc as async_mpsc;
use tokio_util::sync::CancellationToken;

use crate::transport::{build_client, ServerEndpoints};
use crate::{
    ClientSettings, EngineError, EngineEvent, HighlightDownloader, HttpStatusSource,
    HttpUploader, JobStatusPoller, PollError, PollObserver, PollSettings, PromptCatalog,
    PromptDetail, PromptError, PromptSummary, UploadFile, UploadProgressSink, UploadSession,
};

type Reply<T> = mpsc::Sender<Result<T, PromptError>>;

enum EngineCommand {
    Upload {
        generation: Generation,
        path: PathBuf,
        prompt: Option<PromptChoice>,
    },
    Poll {
        generation: Generation,
        job_id: JobId,
    },
    Cancel {
        generation: Generation,
    },
    ScheduleRefresh {
        generation: Generation,
    },
    Download {
        generation: Generation,
        filenames: Vec<String>,
        dir: PathBuf,
    },
    ListPrompts {
        reply: Reply<Vec<PromptSummary>>,
    },
    FetchPrompt {
        name: String,
        reply: Reply<PromptDetail>,
    },
}

struct Services {
    uploader: HttpUploader,
    status: HttpStatusSource,
    prompts: PromptCatalog,
    downloader: HighlightDownloader,
    poll: PollSettings,
    refresh_grace: Duration,
}

/// Runs uploads, pollers and downloads on a single-threaded runtime owned by
/// a background thread. Results come back as [`EngineEvent`]s.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: ClientSettings) -> Result<Self, EngineError> {
        let client = build_client(&settings)?;
        let endpoints = ServerEndpoints::parse(&settings.base_url)?;
        let services = Arc::new(Services {
            uploader: HttpUploader::from_parts(
                client.clone(),
                endpoints.clone(),
                settings.upload_chunk_bytes,
            ),
            status: HttpStatusSource::from_parts(
                client.clone(),
                endpoints.clone(),
                settings.request_timeout,
            ),
            prompts: PromptCatalog::from_parts(
                client.clone(),
                endpoints.clone(),
                settings.request_timeout,
            ),
            downloader: HighlightDownloader::from_parts(client, endpoints),
            poll: PollSettings::from(&settings),
            refresh_grace: settings.refresh_grace,
        });

        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (cmd_tx, cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            runtime.block_on(command_loop(services, cmd_rx, event_tx));
        });

        Ok(Self { cmd_tx, event_rx })
    }

    pub fn upload(&self, generation: Generation, path: PathBuf, prompt: Option<PromptChoice>) {
        self.send(EngineCommand::Upload {
            generation,
            path,
            prompt,
        });
    }

    /// Starts polling `job_id`. Any poller of another generation is cancelled.
    pub fn poll(&self, generation: Generation, job_id: JobId) {
        self.send(EngineCommand::Poll { generation, job_id });
    }

    pub fn cancel(&self, generation: Generation) {
        self.send(EngineCommand::Cancel { generation });
    }

    pub fn schedule_refresh(&self, generation: Generation) {
        self.send(EngineCommand::ScheduleRefresh { generation });
    }

    pub fn download(&self, generation: Generation, filenames: Vec<String>, dir: PathBuf) {
        self.send(EngineCommand::Download {
            generation,
            filenames,
            dir,
        });
    }

    pub fn list_prompts(&self) -> Result<Vec<PromptSummary>, EngineError> {
        let (reply, rx) = mpsc::channel();
        self.send(EngineCommand::ListPrompts { reply });
        Ok(rx.recv().map_err(|_| EngineError::Disconnected)??)
    }

    pub fn fetch_prompt(&self, name: impl Into<String>) -> Result<PromptDetail, EngineError> {
        let (reply, rx) = mpsc::channel();
        self.send(EngineCommand::FetchPrompt {
            name: name.into(),
            reply,
        });
        Ok(rx.recv().map_err(|_| EngineError::Disconnected)??)
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }

    fn send(&self, command: EngineCommand) {
        let _ = self.cmd_tx.send(command);
    }
}

async fn command_loop(
    services: Arc<Services>,
    mut cmd_rx: async_mpsc::UnboundedReceiver<EngineCommand>,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let mut pollers: HashMap<Generation, CancellationToken> = HashMap::new();

    while let Some(command) = cmd_rx.recv().await {
        match command {
            EngineCommand::Poll { generation, job_id } => {
                for (stale, token) in pollers.drain() {
                    clipper_debug!("Abandoning poller generation={}", stale);
                    token.cancel();
                }
                let token = CancellationToken::new();
                pollers.insert(generation, token.clone());
                tokio::spawn(run_poller(
                    services.clone(),
                    generation,
                    job_id,
                    token,
                    event_tx.clone(),
                ));
            }
            EngineCommand::Cancel { generation } => {
                if let Some(token) = pollers.remove(&generation) {
                    token.cancel();
                }
            }
            command => {
                tokio::spawn(handle_command(services.clone(), command, event_tx.clone()));
            }
        }
    }
    clipper_debug!("Engine command channel closed");
}

async fn handle_command(
    services: Arc<Services>,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Upload {
            generation,
            path,
            prompt,
        } => {
            let sink = Arc::new(ChannelSink::new(generation, event_tx.clone()));
            let result = match UploadFile::from_path(&path).await {
                Ok(file) => {
                    UploadSession::new(file)
                        .start(&services.uploader, prompt.as_ref(), sink)
                        .await
                }
                Err(err) => Err(err),
            };
            let _ = event_tx.send(EngineEvent::UploadFinished { generation, result });
        }
        EngineCommand::ScheduleRefresh { generation } => {
            tokio::time::sleep(services.refresh_grace).await;
            let _ = event_tx.send(EngineEvent::RefreshDue { generation });
        }
        EngineCommand::Download {
            generation,
            filenames,
            dir,
        } => {
            for filename in filenames {
                let result = services.downloader.download(&filename, &dir).await;
                let _ = event_tx.send(EngineEvent::HighlightDownloaded {
                    generation,
                    filename,
                    result,
                });
            }
        }
        EngineCommand::ListPrompts { reply } => {
            let _ = reply.send(services.prompts.list().await);
        }
        EngineCommand::FetchPrompt { name, reply } => {
            let _ = reply.send(services.prompts.fetch(&name).await);
        }
        EngineCommand::Poll { .. } | EngineCommand::Cancel { .. } => {}
    }
}

async fn run_poller(
    services: Arc<Services>,
    generation: Generation,
    job_id: JobId,
    cancel: CancellationToken,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let observer = ChannelSink::new(generation, event_tx);
    let poller = JobStatusPoller::new(&services.status, services.poll.clone());
    let outcome = poller.run(&job_id, &observer, &cancel).await;
    clipper_info!(
        "Poller finished generation={} job_id={} outcome={:?}",
        generation,
        job_id,
        outcome
    );
}

/// Forwards upload and poll callbacks as generation-tagged engine events.
struct ChannelSink {
    generation: Generation,
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelSink {
    fn new(generation: Generation, tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { generation, tx }
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

impl UploadProgressSink for ChannelSink {
    fn on_progress(&self, sent: u64, total: u64) {
        self.emit(EngineEvent::UploadProgress {
            generation: self.generation,
            sent,
            total,
        });
    }
}

impl PollObserver for ChannelSink {
    fn on_update(&self, label: &str, percent: Percent) {
        self.emit(EngineEvent::StatusUpdated {
            generation: self.generation,
            label: label.to_string(),
            percent,
        });
    }

    fn on_highlights_changed(&self, highlights: &[String]) {
        self.emit(EngineEvent::HighlightsChanged {
            generation: self.generation,
            highlights: highlights.to_vec(),
        });
    }

    fn on_complete(&self) {
        self.emit(EngineEvent::JobCompleted {
            generation: self.generation,
        });
    }

    fn on_poll_failed(&self, error: &PollError) {
        self.emit(EngineEvent::PollFailed {
            generation: self.generation,
            error: error.clone(),
        });
    }
}
