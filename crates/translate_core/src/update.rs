use crate::progress::ProgressSnapshot;
use crate::state::{DELETE_FALLBACK, DOWNLOAD_FALLBACK, START_FALLBACK, UPLOAD_FALLBACK};
use crate::{
    AppState, DownloadLink, Effect, Msg, SelectedFile, SelectionStats, TranslationRequest,
    TranslationTarget, UploadFlow,
};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FilesSelected(files) => select_files(&mut state, files),
        Msg::UploadProgress { sent, total } => {
            if total > 0 {
                let percent = (sent.min(total) * 100 / total) as u8;
                state.set_upload_progress(Some(percent));
            }
            Vec::new()
        }
        Msg::UploadSucceeded { files } => {
            let added = state.apply_uploaded(files);
            state.set_upload_progress(None);
            state.clear_file_input();
            let message = match state.settings().flow {
                UploadFlow::Single => {
                    "File upload completed. Click \"Start Translation\" to begin.".to_string()
                }
                UploadFlow::Multi => format!(
                    "{added} file(s) uploaded. Click \"Start Translation\" to begin."
                ),
            };
            state.set_status(message);
            Vec::new()
        }
        Msg::UploadFailed { server_message } => {
            state.set_upload_progress(None);
            state.clear_file_input();
            state.set_status(server_message.unwrap_or_else(|| UPLOAD_FALLBACK.to_string()));
            Vec::new()
        }
        Msg::DeleteClicked { file_id } => {
            if state.is_tracked_id(&file_id) {
                vec![Effect::Delete { file_id }]
            } else {
                Vec::new()
            }
        }
        Msg::DeleteSucceeded { file_id, message } => {
            if let Some(removed) = state.remove_tracked(&file_id) {
                state.set_status(
                    message.unwrap_or_else(|| format!("{} was deleted.", removed.name)),
                );
            }
            Vec::new()
        }
        Msg::DeleteFailed { server_message, .. } => {
            state.set_status(server_message.unwrap_or_else(|| DELETE_FALLBACK.to_string()));
            Vec::new()
        }
        Msg::TargetLanguageChanged(code) => {
            if state.knows_language(&code) {
                state.set_target_language(code);
            } else {
                state.set_status(format!("Unknown target language: {code}"));
            }
            Vec::new()
        }
        Msg::StartClicked => start_translation(&mut state),
        Msg::StartSucceeded { message } => {
            state.begin_translation();
            state.set_status(message.unwrap_or_else(|| "Translation started...".to_string()));
            Vec::new()
        }
        Msg::StartFailed { server_message } => {
            state.set_status(server_message.unwrap_or_else(|| START_FALLBACK.to_string()));
            Vec::new()
        }
        Msg::AggregateProgress {
            percentage,
            status,
            filenames,
        } => {
            state.set_status(status.clone());
            state.apply_aggregate_progress(ProgressSnapshot::from_event(percentage, status));
            let filenames = pick_aggregate_outputs(&state, filenames);
            if filenames.is_empty() {
                Vec::new()
            } else {
                vec![Effect::RevealDownloadsAfter {
                    delay: state.settings().reveal_delay,
                    filenames,
                }]
            }
        }
        Msg::FileProgress {
            file_id,
            percentage,
            status,
            download_filename,
        } => {
            let link = download_filename.as_deref().map(|filename| {
                DownloadLink::new(filename, format!("Download ({filename})"))
            });
            let snapshot = ProgressSnapshot::from_event(percentage, status);
            state.apply_file_progress(&file_id, snapshot, link);
            Vec::new()
        }
        Msg::RevealDownloads { filenames } => {
            let combined = state.settings().combined_marker.is_some();
            let links = filenames
                .iter()
                .map(|filename| {
                    let label = if combined {
                        format!("Download combined file ({filename})")
                    } else {
                        format!("Download translated file ({filename})")
                    };
                    DownloadLink::new(filename, label)
                })
                .collect();
            state.reveal_download_links(links);
            Vec::new()
        }
        Msg::DownloadClicked { target } => match state.resolve_download(&target) {
            Some(filename) => {
                state.set_status(format!("Downloading {filename}..."));
                vec![Effect::Download { filename }]
            }
            None => {
                state.set_status(format!("No download available for {target}."));
                Vec::new()
            }
        },
        Msg::DownloadFinished { filename, result } => {
            match result {
                Ok(path) => state.set_status(format!("Saved {filename} to {}", path.display())),
                Err(server_message) => state
                    .set_status(server_message.unwrap_or_else(|| DOWNLOAD_FALLBACK.to_string())),
            }
            Vec::new()
        }
        Msg::ChannelLost { reason } => {
            state.set_status(format!("Lost connection to progress updates: {reason}"));
            Vec::new()
        }
        Msg::Tick => Vec::new(),
    };

    (state, effects)
}

fn select_files(state: &mut AppState, files: Vec<SelectedFile>) -> Vec<Effect> {
    let files: Vec<SelectedFile> = match state.settings().flow {
        UploadFlow::Single => files.into_iter().take(1).collect(),
        UploadFlow::Multi => files,
    };
    state.set_alert(None);
    if files.is_empty() {
        state.clear_file_input();
        return Vec::new();
    }

    let rejected = state
        .settings()
        .allow_list
        .rejected(files.iter().map(|file| file.name.as_str()));
    if !rejected.is_empty() {
        let alert = format!(
            "The following files have unsupported extensions: {}. Allowed: {}",
            rejected.join(", "),
            state.settings().allow_list.extensions().join(", ")
        );
        state.set_alert(Some(alert));
        state.clear_file_input();
        return Vec::new();
    }

    let (fresh, duplicates): (Vec<SelectedFile>, Vec<SelectedFile>) = files
        .into_iter()
        .partition(|file| !state.is_tracked_name(&file.name));
    let skipped: Vec<String> = duplicates.into_iter().map(|file| file.name).collect();
    state.set_last_selection(SelectionStats {
        uploaded: fresh.len(),
        skipped: skipped.clone(),
    });

    if fresh.is_empty() {
        state.clear_file_input();
        state.set_status(format!("Already uploaded: {}", skipped.join(", ")));
        return Vec::new();
    }

    state.set_file_input(fresh.iter().map(|file| file.name.clone()).collect());
    state.set_upload_progress(Some(0));
    if skipped.is_empty() {
        state.set_status(format!("Uploading {} file(s)...", fresh.len()));
    } else {
        state.set_status(format!(
            "Uploading {} file(s); already uploaded: {}",
            fresh.len(),
            skipped.join(", ")
        ));
    }
    vec![Effect::Upload { files: fresh }]
}

fn start_translation(state: &mut AppState) -> Vec<Effect> {
    if state.tracked_files().is_empty() {
        state.set_status("Please upload a file first.");
        return Vec::new();
    }
    let tracked = state.tracked_files();
    let target = match state.settings().flow {
        UploadFlow::Multi => TranslationTarget::Files(tracked.to_vec()),
        UploadFlow::Single => TranslationTarget::Filename(tracked[0].name.clone()),
    };
    vec![Effect::StartTranslation(TranslationRequest {
        target,
        target_language: state.target_language().to_string(),
    })]
}

fn pick_aggregate_outputs(state: &AppState, filenames: Vec<String>) -> Vec<String> {
    match state.settings().combined_marker.as_deref() {
        Some(marker) => filenames
            .into_iter()
            .find(|filename| filename.contains(marker))
            .into_iter()
            .collect(),
        None => filenames,
    }
}
