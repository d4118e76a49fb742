use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::progress::{Phase, ProgressSnapshot};
use crate::view_model::{AppViewModel, FileRowView, FILE_INPUT_PROMPT};
use crate::AllowList;

pub type FileId = String;

pub const UPLOAD_FALLBACK: &str = "An error occurred while uploading the file.";
pub const DELETE_FALLBACK: &str = "An error occurred while deleting the file.";
pub const START_FALLBACK: &str = "Failed to start translation. Please try again.";
pub const DOWNLOAD_FALLBACK: &str = "Failed to download the translated file.";

/// Which server contract the client speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadFlow {
    /// Many files per job, per-file `file_progress` events, JSON upload response.
    #[default]
    Multi,
    /// One file per job, aggregate `progress` events, bare `200` upload response.
    Single,
}

/// A file the server acknowledged and that has not been deleted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedFile {
    pub id: FileId,
    pub name: String,
}

/// A local file picked by the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub name: String,
    pub path: PathBuf,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadLink {
    pub filename: String,
    pub href: String,
    pub label: String,
}

impl DownloadLink {
    pub(crate) fn new(filename: &str, label: String) -> Self {
        Self {
            filename: filename.to_string(),
            href: format!("/download/{filename}"),
            label,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Language {
    pub code: String,
    pub name: String,
}

impl Language {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SelectionStats {
    pub uploaded: usize,
    pub skipped: Vec<String>,
}

/// Page-level configuration the state machine is built with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientSettings {
    pub flow: UploadFlow,
    pub allow_list: AllowList,
    pub languages: Vec<Language>,
    pub default_language: String,
    /// When set, aggregate completion keeps only the filename containing this marker.
    pub combined_marker: Option<String>,
    pub reveal_delay: Duration,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            flow: UploadFlow::Multi,
            allow_list: AllowList::default(),
            languages: vec![
                Language::new("ko", "Korean"),
                Language::new("en", "English"),
                Language::new("ja", "Japanese"),
                Language::new("zh-CN", "Chinese (Simplified)"),
            ],
            default_language: "ko".to_string(),
            combined_marker: None,
            reveal_delay: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppState {
    settings: ClientSettings,
    tracked: Vec<TrackedFile>,
    file_input: Vec<String>,
    alert: Option<String>,
    status_message: String,
    last_selection: Option<SelectionStats>,
    upload_progress: Option<u8>,
    target_language: String,
    translation: Option<ProgressSnapshot>,
    file_progress: BTreeMap<FileId, ProgressSnapshot>,
    row_links: BTreeMap<FileId, DownloadLink>,
    download_links: Vec<DownloadLink>,
    dirty: bool,
}

impl AppState {
    pub fn new(settings: ClientSettings) -> Self {
        let target_language = settings.default_language.clone();
        Self {
            settings,
            target_language,
            ..Self::default()
        }
    }

    pub fn settings(&self) -> &ClientSettings {
        &self.settings
    }

    pub fn tracked_files(&self) -> &[TrackedFile] {
        &self.tracked
    }

    pub fn view(&self) -> AppViewModel {
        let rows = self
            .tracked
            .iter()
            .map(|file| FileRowView {
                id: file.id.clone(),
                name: file.name.clone(),
                delete_enabled: true,
                progress: self.file_progress.get(&file.id).cloned(),
                download: self.row_links.get(&file.id).cloned(),
            })
            .collect();

        let file_input_label = if self.file_input.is_empty() {
            FILE_INPUT_PROMPT.to_string()
        } else {
            self.file_input.join(", ")
        };

        AppViewModel {
            flow: self.settings.flow,
            file_input_label,
            alert: self.alert.clone(),
            status_message: self.status_message.clone(),
            last_selection: self.last_selection.clone(),
            upload_progress: self.upload_progress,
            rows,
            start_enabled: !self.tracked.is_empty(),
            target_language: self.target_language.clone(),
            languages: self.settings.languages.clone(),
            progress: self.translation.clone(),
            download_links: self.download_links.clone(),
            dirty: self.dirty,
        }
    }

    /// Returns whether a redraw is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub(crate) fn is_tracked_name(&self, name: &str) -> bool {
        self.tracked.iter().any(|file| file.name == name)
    }

    pub(crate) fn is_tracked_id(&self, file_id: &str) -> bool {
        self.tracked.iter().any(|file| file.id == file_id)
    }

    pub(crate) fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = message.into();
        self.mark_dirty();
    }

    pub(crate) fn set_file_input(&mut self, names: Vec<String>) {
        self.file_input = names;
        self.mark_dirty();
    }

    pub(crate) fn clear_file_input(&mut self) {
        self.set_file_input(Vec::new());
    }

    pub(crate) fn set_alert(&mut self, alert: Option<String>) {
        if self.alert != alert {
            self.alert = alert;
            self.mark_dirty();
        }
    }

    pub(crate) fn set_last_selection(&mut self, stats: SelectionStats) {
        self.last_selection = Some(stats);
        self.mark_dirty();
    }

    pub(crate) fn set_upload_progress(&mut self, progress: Option<u8>) {
        if self.upload_progress != progress {
            self.upload_progress = progress;
            self.mark_dirty();
        }
    }

    /// Merges an upload response into the tracked list.
    pub(crate) fn apply_uploaded(&mut self, files: Vec<TrackedFile>) -> usize {
        if self.settings.flow == UploadFlow::Single {
            let added = files.len().min(1);
            let stale: Vec<FileId> = self.tracked.drain(..).map(|file| file.id).collect();
            for id in stale {
                self.forget_progress(&id);
            }
            self.tracked.extend(files.into_iter().take(1));
            self.mark_dirty();
            return added;
        }

        let mut added = 0;
        for file in files {
            if self.is_tracked_id(&file.id) {
                continue;
            }
            self.tracked.push(file);
            added += 1;
        }
        self.mark_dirty();
        added
    }

    pub(crate) fn remove_tracked(&mut self, file_id: &str) -> Option<TrackedFile> {
        let index = self.tracked.iter().position(|file| file.id == file_id)?;
        let removed = self.tracked.remove(index);
        self.forget_progress(file_id);
        self.mark_dirty();
        Some(removed)
    }

    fn forget_progress(&mut self, file_id: &str) {
        self.file_progress.remove(file_id);
        self.row_links.remove(file_id);
    }

    pub(crate) fn target_language(&self) -> &str {
        &self.target_language
    }

    pub(crate) fn set_target_language(&mut self, code: String) {
        self.target_language = code;
        self.mark_dirty();
    }

    pub(crate) fn knows_language(&self, code: &str) -> bool {
        self.settings
            .languages
            .iter()
            .any(|language| language.code == code)
    }

    /// Shows the progress container and resets every bar to 0%.
    pub(crate) fn begin_translation(&mut self) {
        self.translation = Some(ProgressSnapshot::started());
        self.file_progress = self
            .tracked
            .iter()
            .map(|file| (file.id.clone(), ProgressSnapshot::started()))
            .collect();
        self.row_links.clear();
        self.download_links.clear();
        self.mark_dirty();
    }

    pub(crate) fn apply_aggregate_progress(&mut self, snapshot: ProgressSnapshot) {
        self.translation = Some(snapshot);
        self.mark_dirty();
    }

    /// Returns false when `file_id` is not tracked; nothing changes in that case.
    pub(crate) fn apply_file_progress(
        &mut self,
        file_id: &str,
        snapshot: ProgressSnapshot,
        link: Option<DownloadLink>,
    ) -> bool {
        if !self.is_tracked_id(file_id) {
            return false;
        }
        self.file_progress.insert(file_id.to_string(), snapshot);
        if let Some(link) = link {
            self.row_links.insert(file_id.to_string(), link);
        }
        self.mark_dirty();
        true
    }

    pub(crate) fn reveal_download_links(&mut self, links: Vec<DownloadLink>) {
        self.download_links = links;
        let snapshot = self.translation.get_or_insert_with(ProgressSnapshot::started);
        snapshot.phase = Phase::Complete;
        self.mark_dirty();
    }

    /// Finds the filename a download request refers to: a row id first, then a link filename.
    pub(crate) fn resolve_download(&self, target: &str) -> Option<String> {
        if let Some(link) = self.row_links.get(target) {
            return Some(link.filename.clone());
        }
        self.download_links
            .iter()
            .chain(self.row_links.values())
            .find(|link| link.filename == target)
            .map(|link| link.filename.clone())
    }
}
