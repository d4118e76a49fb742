use crate::{DownloadLink, FileId, Language, ProgressSnapshot, SelectionStats, UploadFlow};

pub const FILE_INPUT_PROMPT: &str = "Please upload a file to translate.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AppViewModel {
    pub flow: UploadFlow,
    pub file_input_label: String,
    pub alert: Option<String>,
    pub status_message: String,
    pub last_selection: Option<SelectionStats>,
    /// Upload transfer percentage; `None` hides the indicator.
    pub upload_progress: Option<u8>,
    pub rows: Vec<FileRowView>,
    pub start_enabled: bool,
    pub target_language: String,
    pub languages: Vec<Language>,
    /// Aggregate progress; `None` keeps the progress container hidden.
    pub progress: Option<ProgressSnapshot>,
    pub download_links: Vec<DownloadLink>,
    pub dirty: bool,
}

impl AppViewModel {
    pub fn row(&self, file_id: &str) -> Option<&FileRowView> {
        self.rows.iter().find(|row| row.id == file_id)
    }

    pub fn target_language_name(&self) -> Option<&str> {
        self.languages
            .iter()
            .find(|language| language.code == self.target_language)
            .map(|language| language.name.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRowView {
    pub id: FileId,
    pub name: String,
    pub delete_enabled: bool,
    pub progress: Option<ProgressSnapshot>,
    pub download: Option<DownloadLink>,
}
