use thiserror::Error;

/// Lifecycle of one file transfer. Transitions only move forward:
/// `Idle -> Uploading -> {Uploaded | Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    Uploaded,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("upload cannot move from {from:?} to {to:?}")]
pub struct UploadTransitionError {
    pub from: UploadState,
    pub to: UploadState,
}

/// Byte-level progress of one transfer.
///
/// `bytes_sent <= bytes_total` always holds and neither counter decreases
/// while the transfer is `Uploading`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UploadProgress {
    state: UploadState,
    bytes_sent: u64,
    bytes_total: u64,
}

impl UploadProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> UploadState {
        self.state
    }

    pub fn bytes_sent(&self) -> u64 {
        self.bytes_sent
    }

    pub fn bytes_total(&self) -> u64 {
        self.bytes_total
    }

    pub fn begin(&mut self, total: u64) -> Result<(), UploadTransitionError> {
        self.transition(UploadState::Uploading)?;
        self.bytes_sent = 0;
        self.bytes_total = total;
        Ok(())
    }

    /// Records a transport progress report and returns the percentage to show.
    ///
    /// Returns `None` when the report carries no computable length, arrives
    /// outside `Uploading`, or would move the counters backwards.
    pub fn record(&mut self, sent: u64, total: u64) -> Option<u8> {
        if self.state != UploadState::Uploading || total == 0 {
            return None;
        }
        let total = total.max(self.bytes_total);
        let sent = sent.min(total);
        if sent < self.bytes_sent {
            return None;
        }
        self.bytes_sent = sent;
        self.bytes_total = total;
        upload_percent(sent, total)
    }

    pub fn percent(&self) -> Option<u8> {
        upload_percent(self.bytes_sent, self.bytes_total)
    }

    pub fn finish(&mut self) -> Result<(), UploadTransitionError> {
        self.transition(UploadState::Uploaded)
    }

    pub fn fail(&mut self) -> Result<(), UploadTransitionError> {
        self.transition(UploadState::Failed)
    }

    fn transition(&mut self, to: UploadState) -> Result<(), UploadTransitionError> {
        let allowed = matches!(
            (self.state, to),
            (UploadState::Idle, UploadState::Uploading)
                | (UploadState::Uploading, UploadState::Uploaded)
                | (UploadState::Uploading, UploadState::Failed)
        );
        if !allowed {
            return Err(UploadTransitionError {
                from: self.state,
                to,
            });
        }
        self.state = to;
        Ok(())
    }
}

/// `round(sent / total * 100)` clamped to 0..=100; `None` without a length.
pub fn upload_percent(sent: u64, total: u64) -> Option<u8> {
    if total == 0 {
        return None;
    }
    let ratio = (sent as f64 / total as f64 * 100.0).round();
    Some(ratio.clamp(0.0, 100.0) as u8)
}
