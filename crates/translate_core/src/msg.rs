use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked local files through the file input.
    FilesSelected(Vec<crate::SelectedFile>),
    /// Bytes of the current upload body handed to the transport.
    UploadProgress { sent: u64, total: u64 },
    /// Server acknowledged the upload with the assigned identities.
    UploadSucceeded { files: Vec<crate::TrackedFile> },
    UploadFailed { server_message: Option<String> },
    /// User clicked the delete button of a row.
    DeleteClicked { file_id: crate::FileId },
    DeleteSucceeded {
        file_id: crate::FileId,
        message: Option<String>,
    },
    DeleteFailed {
        file_id: crate::FileId,
        server_message: Option<String>,
    },
    /// User picked a target language code.
    TargetLanguageChanged(String),
    /// User clicked Start Translation.
    StartClicked,
    StartSucceeded { message: Option<String> },
    StartFailed { server_message: Option<String> },
    /// Pushed `progress` event of the single-file flow.
    AggregateProgress {
        percentage: u8,
        status: String,
        filenames: Vec<String>,
    },
    /// Pushed `file_progress` event of the multi-file flow.
    FileProgress {
        file_id: crate::FileId,
        percentage: u8,
        status: String,
        download_filename: Option<String>,
    },
    /// Delayed follow-up of an aggregate completion.
    RevealDownloads { filenames: Vec<String> },
    /// User activated a download link, by row id or by filename.
    DownloadClicked { target: String },
    DownloadFinished {
        filename: String,
        result: Result<PathBuf, Option<String>>,
    },
    /// The push channel stopped delivering events.
    ChannelLost { reason: String },
    /// UI/render tick to coalesce rendering.
    Tick,
}
