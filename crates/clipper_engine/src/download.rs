use std::fs;
use std::path::{Path, PathBuf};

use clipper_logging::clipper_info;
use futures_util::StreamExt;
use tempfile::NamedTempFile;
use tokio::io::AsyncWriteExt;

use crate::transport::{build_client, ServerEndpoints};
use crate::types::map_reqwest_error;
use crate::{ClientSettings, DownloadError, EngineError, FailureKind};

/// Ensure output directory exists; create if missing.
pub fn ensure_output_dir(dir: &Path) -> Result<(), DownloadError> {
    if dir.exists() {
        let meta = fs::metadata(dir).map_err(|e| DownloadError::OutputDir(e.to_string()))?;
        if !meta.is_dir() {
            return Err(DownloadError::OutputDir("path is not a directory".into()));
        }
    } else {
        fs::create_dir_all(dir).map_err(|e| DownloadError::OutputDir(e.to_string()))?;
    }
    Ok(())
}

/// Highlight names come from the server; only a plain single path component
/// is accepted as a local file name.
pub fn safe_highlight_name(filename: &str) -> Result<&str, DownloadError> {
    let unsafe_name = filename.is_empty()
        || filename == "."
        || filename == ".."
        || filename.chars().any(|c| matches!(c, '/' | '\\' | ':' | '\0'));
    if unsafe_name {
        Err(DownloadError::UnsafeFileName(filename.to_string()))
    } else {
        Ok(filename)
    }
}

/// Fetches `GET /download/{filename}` into a local directory.
#[derive(Debug, Clone)]
pub struct HighlightDownloader {
    client: reqwest::Client,
    endpoints: ServerEndpoints,
}

impl HighlightDownloader {
    pub fn new(settings: &ClientSettings) -> Result<Self, EngineError> {
        Ok(Self::from_parts(
            build_client(settings)?,
            ServerEndpoints::parse(&settings.base_url)?,
        ))
    }

    pub(crate) fn from_parts(client: reqwest::Client, endpoints: ServerEndpoints) -> Self {
        Self { client, endpoints }
    }

    /// Streams the artifact into a temp file in `dir`, then renames it over
    /// `{dir}/{filename}`. A failed download leaves no partial file behind.
    pub async fn download(&self, filename: &str, dir: &Path) -> Result<PathBuf, DownloadError> {
        let filename = safe_highlight_name(filename)?;
        ensure_output_dir(dir)?;

        let response = self
            .client
            .get(self.endpoints.download(filename))
            .send()
            .await
            .map_err(|err| request_error(map_reqwest_error(&err), err.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            return Err(request_error(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        // The temp path removes the file on drop until it is persisted.
        let (file, temp_path) = NamedTempFile::new_in(dir)
            .map_err(write_error)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);
        let mut written = 0u64;
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|err| request_error(map_reqwest_error(&err), err.to_string()))?;
            file.write_all(&chunk).await.map_err(write_error)?;
            written += chunk.len() as u64;
        }
        file.flush().await.map_err(write_error)?;
        file.sync_all().await.map_err(write_error)?;
        drop(file);

        let target = dir.join(filename);
        temp_path
            .persist(&target)
            .map_err(|err| write_error(err.error))?;
        clipper_info!("Downloaded {} ({} bytes) to {:?}", filename, written, target);
        Ok(target)
    }
}

fn request_error(kind: FailureKind, message: String) -> DownloadError {
    DownloadError::Request { kind, message }
}

fn write_error(err: std::io::Error) -> DownloadError {
    DownloadError::Write(err.to_string())
}
