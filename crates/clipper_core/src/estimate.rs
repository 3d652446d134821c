//! Normalizes heterogeneous server status into one progress estimate.
//!
//! The server reports progress differently per phase: byte counts while the
//! file is transferred, `(N/M)` counters during batch sub-steps and an explicit
//! percentage or nothing at all elsewhere. [`classify`] resolves a status into
//! one [`PhaseShape`] by ordered matching; [`estimate`] turns that shape into a
//! display value.

use crate::JobStatus;

/// Label shown once the terminal sentinel has been observed.
pub const COMPLETE_LABEL: &str = "Processing complete";

/// Phase label the server writes when a job is finished.
pub const DEFAULT_TERMINAL_SENTINEL: &str = "Concluído";

/// Prefixes of phase labels describing the file transfer itself.
pub const DEFAULT_UPLOAD_PREFIXES: &[&str] = &["Upload", "Enviando"];

/// Server phase vocabulary the estimator recognizes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseVocabulary {
    pub terminal_sentinel: String,
    pub upload_prefixes: Vec<String>,
}

impl Default for PhaseVocabulary {
    fn default() -> Self {
        Self {
            terminal_sentinel: DEFAULT_TERMINAL_SENTINEL.to_string(),
            upload_prefixes: DEFAULT_UPLOAD_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
        }
    }
}

impl PhaseVocabulary {
    /// True iff `step` is the terminal sentinel. Surrounding whitespace and
    /// trailing `!`/`.` are ignored; the sentinel is otherwise opaque.
    pub fn is_terminal(&self, step: &str) -> bool {
        let trimmed = step.trim().trim_end_matches(['!', '.']).trim_end();
        !trimmed.is_empty() && trimmed == self.terminal_sentinel
    }

    pub fn is_upload_phase(&self, step: &str) -> bool {
        let step = step.trim_start();
        self.upload_prefixes.iter().any(|prefix| {
            step.get(..prefix.len())
                .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
        })
    }
}

/// The recognized shapes of a status payload, in matching order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PhaseShape {
    Terminal,
    Counter { current: u32, total: u32 },
    Upload,
    Explicit(u8),
    Indeterminate,
}

/// What the progress display should do with one status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Percent {
    Known(u8),
    /// Keep the value last shown (byte-level upload progress owns the bar).
    Unchanged,
    /// Hide the bar; only the label is meaningful.
    Indeterminate,
}

impl Percent {
    pub fn known(self) -> Option<u8> {
        match self {
            Percent::Known(value) => Some(value),
            Percent::Unchanged | Percent::Indeterminate => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Estimate {
    pub percent: Percent,
    pub label: String,
}

/// Resolves the phase shape of `status`; first match wins.
pub fn classify(status: &JobStatus, vocabulary: &PhaseVocabulary) -> PhaseShape {
    if vocabulary.is_terminal(&status.step) {
        return PhaseShape::Terminal;
    }
    if let Some((current, total)) = parse_phase_counter(&status.step) {
        return PhaseShape::Counter { current, total };
    }
    if vocabulary.is_upload_phase(&status.step) {
        return PhaseShape::Upload;
    }
    match status.progress {
        Some(progress) if progress > 0 => PhaseShape::Explicit(progress.min(100)),
        _ => PhaseShape::Indeterminate,
    }
}

pub fn estimate(status: &JobStatus, vocabulary: &PhaseVocabulary) -> Estimate {
    let shape = classify(status, vocabulary);
    let percent = match shape {
        PhaseShape::Terminal => Percent::Known(100),
        PhaseShape::Counter { current, total } => Percent::Known(counter_percent(current, total)),
        PhaseShape::Upload => Percent::Unchanged,
        PhaseShape::Explicit(progress) => Percent::Known(progress),
        PhaseShape::Indeterminate => Percent::Indeterminate,
    };
    let label = match shape {
        PhaseShape::Terminal => COMPLETE_LABEL.to_string(),
        _ => status.step.trim().to_string(),
    };
    Estimate { percent, label }
}

/// Completed fraction of a 1-indexed "working on item N of total" counter.
pub fn counter_percent(current: u32, total: u32) -> u8 {
    if total == 0 {
        return 0;
    }
    let done = f64::from(current.saturating_sub(1));
    let ratio = (done / f64::from(total) * 100.0).round();
    ratio.clamp(0.0, 100.0) as u8
}

/// Parses the last `<word...> (<current>/<total>)` group of a phase label.
///
/// Text after the closing parenthesis is allowed (`"Cortando vídeo (2/5)..."`).
/// Both numbers must be plain positive decimal integers.
pub fn parse_phase_counter(step: &str) -> Option<(u32, u32)> {
    let close = step.rfind(')')?;
    let open = step[..close].rfind('(')?;

    let head = &step[..open];
    if !head.ends_with(char::is_whitespace) || !head.chars().any(char::is_alphabetic) {
        return None;
    }

    let (current, total) = step[open + 1..close].split_once('/')?;
    let current = parse_positive(current)?;
    let total = parse_positive(total)?;
    Some((current, total))
}

fn parse_positive(digits: &str) -> Option<u32> {
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse::<u32>().ok().filter(|value| *value > 0)
}

#[cfg(test)]
mod tests {
    use super::{counter_percent, parse_phase_counter, PhaseVocabulary};

    #[test]
    fn counter_needs_a_word_before_the_group() {
        assert_eq!(parse_phase_counter("Cutting (3/10)"), Some((3, 10)));
        assert_eq!(parse_phase_counter("Cortando vídeo (2/5)..."), Some((2, 5)));
        assert_eq!(parse_phase_counter("(3/10)"), None);
        assert_eq!(parse_phase_counter("Cutting(3/10)"), None);
        assert_eq!(parse_phase_counter("12 (3/10)"), None);
    }

    #[test]
    fn counter_rejects_non_positive_or_signed_numbers() {
        assert_eq!(parse_phase_counter("Cutting (0/10)"), None);
        assert_eq!(parse_phase_counter("Cutting (3/0)"), None);
        assert_eq!(parse_phase_counter("Cutting (+3/10)"), None);
        assert_eq!(parse_phase_counter("Cutting (3 / 10)"), None);
        assert_eq!(parse_phase_counter("Cutting (a/b)"), None);
    }

    #[test]
    fn counter_percent_clamps_overshoot() {
        assert_eq!(counter_percent(11, 10), 100);
        assert_eq!(counter_percent(1, 3), 0);
        assert_eq!(counter_percent(2, 3), 33);
        assert_eq!(counter_percent(3, 3), 67);
    }

    #[test]
    fn terminal_sentinel_tolerates_trailing_punctuation() {
        let vocabulary = PhaseVocabulary::default();
        assert!(vocabulary.is_terminal("Concluído"));
        assert!(vocabulary.is_terminal("Concluído!"));
        assert!(vocabulary.is_terminal("  Concluído.  "));
        assert!(!vocabulary.is_terminal("Concluído parcialmente"));
        assert!(!vocabulary.is_terminal(""));
    }

    #[test]
    fn upload_prefix_is_case_insensitive() {
        let vocabulary = PhaseVocabulary::default();
        assert!(vocabulary.is_upload_phase("Uploading"));
        assert!(vocabulary.is_upload_phase("uploading file"));
        assert!(vocabulary.is_upload_phase("Enviando arquivo"));
        assert!(!vocabulary.is_upload_phase("Up"));
        assert!(!vocabulary.is_upload_phase("Queued"));
    }
}
