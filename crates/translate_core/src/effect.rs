use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Upload { files: Vec<crate::SelectedFile> },
    Delete { file_id: crate::FileId },
    StartTranslation(TranslationRequest),
    /// Feed `Msg::RevealDownloads` back after `delay`.
    RevealDownloadsAfter {
        delay: Duration,
        filenames: Vec<String>,
    },
    Download { filename: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationRequest {
    pub target: TranslationTarget,
    pub target_language: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TranslationTarget {
    Files(Vec<crate::TrackedFile>),
    Filename(String),
}
