use translate_core::{AppViewModel, FileRowView, ProgressSnapshot, UploadFlow};

const BAR_WIDTH: usize = 20;

/// Builds the full frame for `view`, headed by `timestamp`.
pub fn render(view: &AppViewModel, timestamp: &str) -> Vec<String> {
    let flow_label = match view.flow {
        UploadFlow::Multi => "multi-file",
        UploadFlow::Single => "single-file",
    };
    let language = match view.target_language_name() {
        Some(name) => format!("{} ({})", view.target_language, name),
        None => view.target_language.clone(),
    };

    let mut lines = vec![
        format!("=== Document translation === {timestamp}"),
        format!("Flow: {flow_label} | Target language: {language}"),
        format!("File: {}", view.file_input_label),
    ];

    if let Some(alert) = &view.alert {
        lines.push(format!("[!] {alert}"));
    }
    if let Some(stats) = &view.last_selection {
        lines.push(format!(
            "Last selection: uploading {}, skipped {}",
            stats.uploaded,
            stats.skipped.len()
        ));
    }
    if let Some(percent) = view.upload_progress {
        lines.push(format!("Upload: {} {}%", bar(percent), percent));
    }

    lines.push("Files:".to_string());
    if view.rows.is_empty() {
        lines.push("  (no files uploaded)".to_string());
    }
    lines.extend(view.rows.iter().map(format_row));

    lines.push(if view.start_enabled {
        "Start translation: ready (type `start`)".to_string()
    } else {
        "Start translation: upload a file first".to_string()
    });

    if let Some(progress) = &view.progress {
        lines.push(format!(
            "Progress: {} {}% {}",
            bar(progress.percentage),
            progress.percentage,
            progress.phase.label()
        ));
        if !progress.status.is_empty() {
            lines.push(format!("  {}", progress.status));
        }
    }

    if !view.download_links.is_empty() {
        lines.push("Downloads:".to_string());
        lines.extend(
            view.download_links
                .iter()
                .map(|link| format!("  {} -> {}", link.label, link.href)),
        );
    }

    if !view.status_message.is_empty() {
        lines.push(format!("Status: {}", view.status_message));
    }
    lines
}

fn format_row(row: &FileRowView) -> String {
    let mut text = format!("  [{}] {}", row.id, row.name);
    if let Some(progress) = &row.progress {
        text.push_str(&format!(" | {}", format_file_progress(progress)));
    }
    if let Some(link) = &row.download {
        text.push_str(&format!(" | {} -> {}", link.label, link.href));
    }
    text
}

fn format_file_progress(progress: &ProgressSnapshot) -> String {
    if progress.status.is_empty() {
        format!("{}%", progress.percentage)
    } else {
        format!("{}% {}", progress.percentage, progress.status)
    }
}

fn bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!("[{}{}]", "#".repeat(filled), "-".repeat(BAR_WIDTH - filled))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use translate_core::{
        update, AppState, ClientSettings, Msg, SelectedFile, TrackedFile, FILE_INPUT_PROMPT,
    };

    fn drive(msgs: Vec<Msg>) -> AppViewModel {
        let mut state = AppState::new(ClientSettings::default());
        for msg in msgs {
            state = update(state, msg).0;
        }
        state.view()
    }

    #[test]
    fn empty_frame() {
        let lines = render(&drive(Vec::new()), "2026-01-01 10:00:00");
        assert_eq!(
            lines,
            vec![
                "=== Document translation === 2026-01-01 10:00:00".to_string(),
                "Flow: multi-file | Target language: ko (Korean)".to_string(),
                format!("File: {FILE_INPUT_PROMPT}"),
                "Files:".to_string(),
                "  (no files uploaded)".to_string(),
                "Start translation: upload a file first".to_string(),
            ]
        );
    }

    #[test]
    fn rows_show_progress_and_links() {
        let view = drive(vec![
            Msg::UploadSucceeded {
                files: vec![TrackedFile {
                    id: "1".to_string(),
                    name: "a.txt".to_string(),
                }],
            },
            Msg::StartClicked,
            Msg::StartSucceeded { message: None },
            Msg::FileProgress {
                file_id: "1".to_string(),
                percentage: 100,
                status: "Completed".to_string(),
                download_filename: Some("a_ko.txt".to_string()),
            },
        ]);
        let lines = render(&view, "t");

        assert!(lines.contains(
            &"  [1] a.txt | 100% Completed | Download (a_ko.txt) -> /download/a_ko.txt"
                .to_string()
        ));
        assert!(lines.contains(&"Start translation: ready (type `start`)".to_string()));
        assert!(lines.contains(&"Status: Translation started...".to_string()));
        assert!(lines
            .iter()
            .any(|line| line.starts_with("Progress: [") && line.contains("0%")));
    }

    #[test]
    fn alert_is_shown_for_rejected_selection() {
        let view = drive(vec![Msg::FilesSelected(vec![SelectedFile::new(
            "notes.exe",
            "notes.exe",
        )])]);
        let lines = render(&view, "t");
        assert!(lines.iter().any(|line| line.starts_with("[!] ") && line.contains("notes.exe")));
    }

    #[test]
    fn bar_scales_with_percent() {
        assert_eq!(bar(0), format!("[{}]", "-".repeat(BAR_WIDTH)));
        assert_eq!(bar(50), format!("[{}{}]", "#".repeat(10), "-".repeat(10)));
        assert_eq!(bar(100), format!("[{}]", "#".repeat(BAR_WIDTH)));
    }
}
