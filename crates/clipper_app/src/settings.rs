use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use clipper_engine::ClientSettings;
use clipper_logging::{clipper_info, clipper_warn};
use ron::extensions::Extensions;
use serde::{Deserialize, Serialize};

pub(crate) const SETTINGS_FILENAME: &str = "clipper.ron";

/// Optional overrides read from the settings file. Durations are in milliseconds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub(crate) struct SettingsFile {
    pub server: Option<String>,
    pub connect_timeout_ms: Option<u64>,
    pub request_timeout_ms: Option<u64>,
    pub poll_interval_ms: Option<u64>,
    pub refresh_grace_ms: Option<u64>,
    pub max_consecutive_poll_failures: Option<u32>,
    pub upload_chunk_bytes: Option<usize>,
    pub terminal_sentinel: Option<String>,
    pub upload_phase_prefixes: Option<Vec<String>>,
    pub download_dir: Option<PathBuf>,
}

impl SettingsFile {
    pub(crate) fn apply(&self, settings: &mut ClientSettings) {
        if let Some(server) = &self.server {
            settings.base_url = server.clone();
        }
        if let Some(ms) = self.connect_timeout_ms {
            settings.connect_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.request_timeout_ms {
            settings.request_timeout = Duration::from_millis(ms);
        }
        if let Some(ms) = self.poll_interval_ms {
            settings.poll_interval = Duration::from_millis(ms);
        }
        if let Some(ms) = self.refresh_grace_ms {
            settings.refresh_grace = Duration::from_millis(ms);
        }
        if let Some(max) = self.max_consecutive_poll_failures {
            settings.max_consecutive_poll_failures = max.max(1);
        }
        if let Some(bytes) = self.upload_chunk_bytes {
            settings.upload_chunk_bytes = bytes.max(1);
        }
        if let Some(sentinel) = &self.terminal_sentinel {
            settings.vocabulary.terminal_sentinel = sentinel.clone();
        }
        if let Some(prefixes) = &self.upload_phase_prefixes {
            settings.vocabulary.upload_prefixes = prefixes.clone();
        }
    }
}

/// Reads the settings file. A missing file yields `None`.
pub(crate) fn read_settings(path: &Path) -> anyhow::Result<Option<SettingsFile>> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read settings from {path:?}"));
        }
    };
    let parsed: SettingsFile = ron::Options::default()
        .with_default_extension(Extensions::IMPLICIT_SOME)
        .from_str(&content)
        .with_context(|| format!("failed to parse settings from {path:?}"))?;
    Ok(Some(parsed))
}

/// Like [`read_settings`], but any problem is logged and defaults are used.
pub(crate) fn load_settings(path: &Path) -> SettingsFile {
    match read_settings(path) {
        Ok(Some(file)) => {
            clipper_info!("Loaded settings from {:?}", path);
            file
        }
        Ok(None) => SettingsFile::default(),
        Err(err) => {
            clipper_warn!("{:#}; using defaults", err);
            SettingsFile::default()
        }
    }
}
