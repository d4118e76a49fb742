//! Translate client core: pure state machine and view-model helpers.
mod allow_list;
mod effect;
mod msg;
mod progress;
mod state;
mod update;
mod view_model;

pub use allow_list::AllowList;
pub use effect::{Effect, TranslationRequest, TranslationTarget};
pub use msg::Msg;
pub use progress::{Phase, ProgressSnapshot};
pub use state::{
    AppState, ClientSettings, DownloadLink, FileId, Language, SelectedFile, SelectionStats,
    TrackedFile, UploadFlow, DELETE_FALLBACK, DOWNLOAD_FALLBACK, START_FALLBACK,
    UPLOAD_FALLBACK,
};
pub use update::update;
pub use view_model::{AppViewModel, FileRowView, FILE_INPUT_PROMPT};
