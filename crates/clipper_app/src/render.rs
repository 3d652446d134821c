use clipper_core::{AppViewModel, NoticeSeverity, SessionState};

const BAR_WIDTH: usize = 20;

/// Lines to print for one dirty view. `timestamp` prefixes the status line.
pub fn render(view: &AppViewModel, timestamp: &str) -> Vec<String> {
    let mut lines = Vec::new();

    let label = view.phase_label.as_deref().unwrap_or("");
    let progress = match view.percent {
        Some(percent) => format!(" {} {:>3}%", progress_bar(percent), percent),
        None if view.session == SessionState::Processing => " [working...]".to_string(),
        None => String::new(),
    };
    lines.push(format!(
        "[{timestamp}] {}: {label}{progress}",
        session_label(view.session)
    ));

    if !view.highlights.is_empty() {
        lines.push(format!(
            "  highlights ({}): {}",
            view.highlights.len(),
            view.highlights.join(", ")
        ));
    }

    for row in &view.downloads {
        match &row.result {
            Ok(path) => lines.push(format!("  saved {} -> {}", row.filename, path.display())),
            Err(err) => lines.push(format!("  could not save {}: {}", row.filename, err)),
        }
    }

    if let Some(notice) = &view.notice {
        let marker = match notice.severity {
            NoticeSeverity::Info => "",
            NoticeSeverity::Error => "error: ",
        };
        lines.push(format!("  {marker}{}", notice.text));
    }

    lines
}

fn session_label(session: SessionState) -> &'static str {
    match session {
        SessionState::Idle => "Idle",
        SessionState::Uploading => "Uploading",
        SessionState::Processing => "Processing",
        SessionState::Completed => "Completed",
        SessionState::Failed => "Failed",
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use clipper_core::{DownloadRow, Notice};

    use super::*;

    #[test]
    fn processing_view_shows_bar_and_highlights() {
        let view = AppViewModel {
            session: SessionState::Processing,
            phase_label: Some("Cutting (2/4)".to_string()),
            percent: Some(25),
            highlights: vec!["a.mp4".to_string(), "b.mp4".to_string()],
            ..AppViewModel::default()
        };

        assert_eq!(
            render(&view, "10:00:00"),
            vec![
                "[10:00:00] Processing: Cutting (2/4) [#####...............]  25%".to_string(),
                "  highlights (2): a.mp4, b.mp4".to_string(),
            ]
        );
    }

    #[test]
    fn indeterminate_phase_hides_the_bar() {
        let view = AppViewModel {
            session: SessionState::Processing,
            phase_label: Some("Transcrevendo".to_string()),
            ..AppViewModel::default()
        };

        assert_eq!(
            render(&view, "t"),
            vec!["[t] Processing: Transcrevendo [working...]".to_string()]
        );
    }

    #[test]
    fn downloads_and_errors_are_listed() {
        let view = AppViewModel {
            session: SessionState::Idle,
            downloads: vec![
                DownloadRow {
                    filename: "a.mp4".to_string(),
                    result: Ok(PathBuf::from("out/a.mp4")),
                },
                DownloadRow {
                    filename: "b.mp4".to_string(),
                    result: Err("http status 404".to_string()),
                },
            ],
            notice: Some(Notice {
                severity: NoticeSeverity::Error,
                text: "boom".to_string(),
            }),
            ..AppViewModel::default()
        };

        let lines = render(&view, "t");
        assert_eq!(lines[1], "  saved a.mp4 -> out/a.mp4");
        assert_eq!(lines[2], "  could not save b.mp4: http status 404");
        assert_eq!(lines[3], "  error: boom");
    }

    #[test]
    fn bar_fills_proportionally() {
        assert_eq!(progress_bar(0), format!("[{}]", ".".repeat(20)));
        assert_eq!(progress_bar(100), format!("[{}]", "#".repeat(20)));
        assert_eq!(progress_bar(50).matches('#').count(), 10);
    }
}
