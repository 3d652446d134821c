use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use clipper_core::{
    validate_extension, validate_video, JobId, PromptChoice, UploadProgress, UploadState,
    ValidationError,
};
use futures_util::future::Either;
use futures_util::{stream, Stream, StreamExt};
use clipper_logging::{clipper_debug, clipper_info, clipper_warn};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tokio_util::io::ReaderStream;

use crate::transport::{build_client, ServerEndpoints};
use crate::types::map_reqwest_error;
use crate::{ClientSettings, EngineError, FailureKind, UploadError, UploadFailure};

const VIDEO_MIME: &str = "video/mp4";

/// Receives byte-level progress of one upload: `(sent, total)`, non-decreasing.
pub trait UploadProgressSink: Send + Sync {
    fn on_progress(&self, sent: u64, total: u64);
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum UploadSource {
    Memory(Bytes),
    Disk(PathBuf),
}

/// A validated video. Files opened with [`UploadFile::from_path`] are read
/// from disk chunk by chunk while the request body is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    file_name: String,
    len: u64,
    source: UploadSource,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, data: impl Into<Bytes>) -> Result<Self, ValidationError> {
        let file_name = file_name.into();
        let data = data.into();
        let len = data.len() as u64;
        validate_video(&file_name, len)?;
        Ok(Self {
            file_name,
            len,
            source: UploadSource::Memory(data),
        })
    }

    /// Checks the name, then the size on disk. No content is read here.
    pub async fn from_path(path: &Path) -> Result<Self, UploadError> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        validate_extension(&file_name)?;
        let meta = tokio::fs::metadata(path)
            .await
            .map_err(|err| io_error(path, err))?;
        if !meta.is_file() {
            return Err(UploadError::transport(
                FailureKind::Io,
                format!("{} is not a regular file", path.display()),
            ));
        }
        validate_video(&file_name, meta.len())?;
        Ok(Self {
            file_name,
            len: meta.len(),
            source: UploadSource::Disk(path.to_path_buf()),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// The body of one upload as a stream of chunks of at most `chunk_bytes`.
async fn read_chunks(
    source: UploadSource,
    chunk_bytes: usize,
) -> Result<impl Stream<Item = io::Result<Bytes>> + Send + Sync + 'static, UploadError> {
    let step = chunk_bytes.max(1);
    match source {
        UploadSource::Memory(data) => {
            let pieces: Vec<io::Result<Bytes>> = (0..data.len())
                .step_by(step)
                .map(|start| Ok(data.slice(start..(start + step).min(data.len()))))
                .collect();
            Ok(Either::Left(stream::iter(pieces)))
        }
        UploadSource::Disk(path) => {
            let file = tokio::fs::File::open(&path)
                .await
                .map_err(|err| io_error(&path, err))?;
            Ok(Either::Right(ReaderStream::with_capacity(file, step)))
        }
    }
}

fn io_error(path: &Path, err: io::Error) -> UploadError {
    UploadError::transport(FailureKind::Io, format!("{}: {err}", path.display()))
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    id: Option<JobId>,
}

/// Sends `POST /upload` as a multipart form with a streamed `file` part.
#[derive(Debug, Clone)]
pub struct HttpUploader {
    client: reqwest::Client,
    endpoints: ServerEndpoints,
    chunk_bytes: usize,
}

impl HttpUploader {
    pub fn new(settings: &ClientSettings) -> Result<Self, EngineError> {
        Ok(Self::from_parts(
            build_client(settings)?,
            ServerEndpoints::parse(&settings.base_url)?,
            settings.upload_chunk_bytes,
        ))
    }

    pub(crate) fn from_parts(
        client: reqwest::Client,
        endpoints: ServerEndpoints,
        chunk_bytes: usize,
    ) -> Self {
        Self {
            client,
            endpoints,
            chunk_bytes,
        }
    }

    async fn post<F>(
        &self,
        file: &UploadFile,
        prompt: Option<&PromptChoice>,
        mut on_sent: F,
    ) -> Result<JobId, UploadError>
    where
        F: FnMut(u64) + Send + Sync + 'static,
    {
        let mut sent = 0u64;
        let body = read_chunks(file.source.clone(), self.chunk_bytes)
            .await?
            .map(move |piece| {
                if let Ok(piece) = &piece {
                    sent += piece.len() as u64;
                    on_sent(sent);
                }
                piece
            });

        let part = Part::stream_with_length(reqwest::Body::wrap_stream(body), file.len())
            .file_name(file.file_name().to_string())
            .mime_str(VIDEO_MIME)
            .map_err(|err| UploadError::transport(FailureKind::Network, err.to_string()))?;
        let mut form = Form::new().part("file", part);
        if let Some(prompt) = prompt {
            form = form.text(prompt.field_name(), prompt.value().to_string());
        }

        let response = self
            .client
            .post(self.endpoints.upload())
            .multipart(form)
            .send()
            .await
            .map_err(|err| UploadError::transport(map_reqwest_error(&err), err.to_string()))?;

        let status = response.status();
        if status.as_u16() != 200 {
            return Err(UploadError::transport(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let body = response
            .bytes()
            .await
            .map_err(|err| UploadError::transport(map_reqwest_error(&err), err.to_string()))?;
        let parsed: UploadResponse = serde_json::from_slice(&body).map_err(|err| {
            UploadError::transport(FailureKind::MalformedResponse, err.to_string())
        })?;
        parsed.id.ok_or_else(|| {
            UploadError::transport(FailureKind::MalformedResponse, "response carries no job id")
        })
    }
}

/// One file transfer. It can be started once; a new submission needs a new session.
#[derive(Debug)]
pub struct UploadSession {
    file: UploadFile,
    progress: Arc<Mutex<UploadProgress>>,
}

impl UploadSession {
    pub fn new(file: UploadFile) -> Self {
        Self {
            file,
            progress: Arc::new(Mutex::new(UploadProgress::new())),
        }
    }

    pub fn file(&self) -> &UploadFile {
        &self.file
    }

    pub fn state(&self) -> UploadState {
        lock(&self.progress).state()
    }

    pub fn progress(&self) -> UploadProgress {
        lock(&self.progress).clone()
    }

    /// Uploads the file, reporting byte progress to `sink`, and resolves with
    /// the job id the server issued. No retry is attempted.
    pub async fn start(
        &self,
        uploader: &HttpUploader,
        prompt: Option<&PromptChoice>,
        sink: Arc<dyn UploadProgressSink>,
    ) -> Result<JobId, UploadError> {
        let total = self.file.len();
        lock(&self.progress).begin(total).map_err(|err| {
            UploadError::new(UploadFailure::AlreadyStarted, err.to_string())
        })?;
        clipper_info!(
            "Upload started file={} bytes={}",
            self.file.file_name(),
            total
        );

        let tracker = Arc::clone(&self.progress);
        let on_sent = move |sent: u64| {
            let accepted = lock(&tracker).record(sent, total).is_some();
            if accepted {
                clipper_debug!("Upload progress {}/{}", sent, total);
                sink.on_progress(sent, total);
            }
        };

        let result = uploader.post(&self.file, prompt, on_sent).await;

        let mut progress = lock(&self.progress);
        match &result {
            Ok(job_id) => {
                let _ = progress.finish();
                clipper_info!("Upload accepted file={} job_id={}", self.file.file_name(), job_id);
            }
            Err(err) => {
                let _ = progress.fail();
                clipper_warn!("Upload failed file={}: {}", self.file.file_name(), err);
            }
        }
        result
    }
}

fn lock(progress: &Mutex<UploadProgress>) -> MutexGuard<'_, UploadProgress> {
    progress.lock().unwrap_or_else(PoisonError::into_inner)
}
