//! Translate engine: HTTP API, push channel and effect execution.
mod api;
mod channel;
mod engine;
mod filename;
mod persist;
mod push;
mod socketio;
mod types;

pub use api::{ApiSettings, ProgressSink, ReqwestApi, TranslateApi};
pub use channel::{ChannelSettings, PollingChannel};
pub use engine::{EngineConfig, EngineError, EngineHandle};
pub use filename::local_download_name;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use push::{clamp_percentage, decode_push};
pub use socketio::{decode_payload, ChannelError, EnginePacket, OpenInfo, SocketPacket};
pub use types::{
    AggregateProgress, ApiError, EngineEvent, FailureKind, FileId, FileProgress, PushEvent,
    TranslationPayload, UploadFlow, UploadSource, UploadedFile,
};
