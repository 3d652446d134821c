use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const VIDEO_EXTENSION: &str = ".mp4";

/// Input problems caught before any network call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("only .mp4 files are allowed (got {file_name:?})")]
    UnsupportedFileType { file_name: String },
    #[error("file {file_name:?} is empty")]
    EmptyFile { file_name: String },
    #[error("no video file selected")]
    NoFileSelected,
    #[error("choose a prompt or write a custom one")]
    NoPromptChosen,
}

/// Name-only check, usable before the file size is known.
pub fn validate_extension(file_name: &str) -> Result<(), ValidationError> {
    if file_name.ends_with(VIDEO_EXTENSION) {
        Ok(())
    } else {
        Err(ValidationError::UnsupportedFileType {
            file_name: file_name.to_string(),
        })
    }
}

pub fn validate_video(file_name: &str, size: u64) -> Result<(), ValidationError> {
    validate_extension(file_name)?;
    if size == 0 {
        return Err(ValidationError::EmptyFile {
            file_name: file_name.to_string(),
        });
    }
    Ok(())
}

/// Which highlight-detection prompt the server should use.
///
/// Sent as the `prompt_name` or `prompt_text` multipart field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PromptChoice {
    Named(String),
    Custom(String),
}

impl PromptChoice {
    /// A non-blank custom text wins over the named prompt; otherwise a
    /// non-blank name is used. `None` means the form is not ready.
    pub fn resolve(name: Option<&str>, custom_text: Option<&str>) -> Option<Self> {
        if let Some(text) = custom_text.map(str::trim).filter(|text| !text.is_empty()) {
            return Some(PromptChoice::Custom(text.to_string()));
        }
        name.map(str::trim)
            .filter(|name| !name.is_empty())
            .map(|name| PromptChoice::Named(name.to_string()))
    }

    pub fn field_name(&self) -> &'static str {
        match self {
            PromptChoice::Named(_) => "prompt_name",
            PromptChoice::Custom(_) => "prompt_text",
        }
    }

    pub fn value(&self) -> &str {
        match self {
            PromptChoice::Named(value) | PromptChoice::Custom(value) => value,
        }
    }
}
