use std::sync::{mpsc, Arc, Mutex};
use std::thread;
use std::time::Duration;

use client_logging::{client_info, client_warn};
use thiserror::Error;

use crate::api::{ApiSettings, ChannelProgressSink, ProgressSink, ReqwestApi, TranslateApi};
use crate::channel::{ChannelSettings, PollingChannel};
use crate::socketio::ChannelError;
use crate::{ApiError, EngineEvent, FileId, TranslationPayload, UploadSource};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Api(#[from] ApiError),
    #[error("failed to build push channel: {0}")]
    Channel(#[from] ChannelError),
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api: ApiSettings,
    /// `None` runs without live progress.
    pub channel: Option<ChannelSettings>,
}

impl EngineConfig {
    pub fn new(api: ApiSettings) -> Self {
        let channel = Some(ChannelSettings {
            connect_timeout: api.connect_timeout,
            ..ChannelSettings::new(api.base_url.clone())
        });
        Self { api, channel }
    }
}

enum EngineCommand {
    Upload { files: Vec<UploadSource> },
    StartTranslation { payload: TranslationPayload },
    Delete { file_id: FileId },
    Download { filename: String },
}

/// Handle to the background IO thread. Commands are fire-and-forget; every
/// outcome comes back as an [`EngineEvent`].
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: Arc<Mutex<mpsc::Receiver<EngineEvent>>>,
}

impl EngineHandle {
    pub fn new(config: EngineConfig) -> Result<Self, EngineError> {
        let api = Arc::new(ReqwestApi::new(config.api)?);
        let channel = config.channel.map(PollingChannel::new).transpose()?;
        Self::spawn(api, channel)
    }

    /// Starts the IO thread over any API implementation.
    pub fn spawn(
        api: Arc<dyn TranslateApi>,
        channel: Option<PollingChannel>,
    ) -> Result<Self, EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        if let Some(channel) = channel {
            let sink = ChannelProgressSink::new(event_tx.clone());
            runtime.spawn(async move {
                let reason = match channel.run(&sink).await {
                    Ok(()) => "server closed the session".to_string(),
                    Err(err) => {
                        client_warn!("push channel failed: {}", err);
                        err.to_string()
                    }
                };
                sink.emit(EngineEvent::ChannelClosed { reason });
            });
        }

        thread::spawn(move || {
            while let Ok(command) = cmd_rx.recv() {
                let api = api.clone();
                let event_tx = event_tx.clone();
                runtime.spawn(async move {
                    handle_command(api.as_ref(), command, event_tx).await;
                });
            }
            client_info!("engine command channel closed; shutting down");
        });

        Ok(Self {
            cmd_tx,
            event_rx: Arc::new(Mutex::new(event_rx)),
        })
    }

    pub fn upload(&self, files: Vec<UploadSource>) {
        let _ = self.cmd_tx.send(EngineCommand::Upload { files });
    }

    pub fn start_translation(&self, payload: TranslationPayload) {
        let _ = self
            .cmd_tx
            .send(EngineCommand::StartTranslation { payload });
    }

    pub fn delete(&self, file_id: impl Into<FileId>) {
        let _ = self.cmd_tx.send(EngineCommand::Delete {
            file_id: file_id.into(),
        });
    }

    pub fn download(&self, filename: impl Into<String>) {
        let _ = self.cmd_tx.send(EngineCommand::Download {
            filename: filename.into(),
        });
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.lock().ok()?.recv_timeout(timeout).ok()
    }
}

async fn handle_command(
    api: &dyn TranslateApi,
    command: EngineCommand,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    match command {
        EngineCommand::Upload { files } => {
            let sink: Arc<dyn ProgressSink> = Arc::new(ChannelProgressSink::new(event_tx.clone()));
            let result = api.upload(&files, sink).await;
            log_failure("upload", &result);
            let _ = event_tx.send(EngineEvent::UploadCompleted { result });
        }
        EngineCommand::StartTranslation { payload } => {
            let result = api.start_translation(&payload).await;
            log_failure("start_translation", &result);
            let _ = event_tx.send(EngineEvent::StartCompleted { result });
        }
        EngineCommand::Delete { file_id } => {
            let result = api.delete_file(&file_id).await;
            log_failure("delete_file", &result);
            let _ = event_tx.send(EngineEvent::DeleteCompleted { file_id, result });
        }
        EngineCommand::Download { filename } => {
            let result = api.download(&filename).await;
            log_failure("download", &result);
            let _ = event_tx.send(EngineEvent::DownloadCompleted { filename, result });
        }
    }
}

fn log_failure<T>(action: &str, result: &Result<T, ApiError>) {
    if let Err(err) = result {
        client_warn!("{} failed: {}", action, err);
    }
}
