use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use client_logging::{client_debug, client_info, client_warn};
use translate_core::{Effect, Msg, TrackedFile, TranslationRequest, TranslationTarget};
use translate_engine::{
    ApiError, EngineEvent, EngineHandle, PushEvent, TranslationPayload, UploadSource,
    UploadedFile,
};

const EVENT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Executes core effects on the engine and feeds engine events back as messages.
pub struct EffectRunner {
    engine: EngineHandle,
    msg_tx: mpsc::Sender<Msg>,
}

impl EffectRunner {
    pub fn new(engine: EngineHandle, msg_tx: mpsc::Sender<Msg>) -> Self {
        let runner = Self { engine, msg_tx };
        runner.spawn_event_loop();
        runner
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::Upload { files } => {
                    client_info!("Upload files={}", files.len());
                    let sources = files
                        .into_iter()
                        .map(|file| UploadSource {
                            name: file.name,
                            path: file.path,
                        })
                        .collect();
                    self.engine.upload(sources);
                }
                Effect::Delete { file_id } => {
                    client_info!("Delete file_id={}", file_id);
                    self.engine.delete(file_id);
                }
                Effect::StartTranslation(request) => {
                    client_info!("StartTranslation language={}", request.target_language);
                    self.engine.start_translation(payload_for(request));
                }
                Effect::RevealDownloadsAfter { delay, filenames } => {
                    let msg_tx = self.msg_tx.clone();
                    thread::spawn(move || {
                        thread::sleep(delay);
                        let _ = msg_tx.send(Msg::RevealDownloads { filenames });
                    });
                }
                Effect::Download { filename } => {
                    client_info!("Download filename={}", filename);
                    self.engine.download(filename);
                }
            }
        }
    }

    fn spawn_event_loop(&self) {
        let engine = self.engine.clone();
        let msg_tx = self.msg_tx.clone();
        thread::spawn(move || loop {
            let Some(event) = engine.recv_timeout(EVENT_POLL_INTERVAL) else {
                continue;
            };
            if msg_tx.send(map_event(event)).is_err() {
                client_debug!("message channel closed; stopping engine event loop");
                break;
            }
        });
    }
}

fn payload_for(request: TranslationRequest) -> TranslationPayload {
    match request.target {
        TranslationTarget::Files(files) => TranslationPayload::Files {
            files: files
                .into_iter()
                .map(|file| UploadedFile {
                    id: file.id,
                    name: file.name,
                })
                .collect(),
            target_language: request.target_language,
        },
        TranslationTarget::Filename(filename) => TranslationPayload::Filename {
            filename,
            target_language: request.target_language,
        },
    }
}

fn map_event(event: EngineEvent) -> Msg {
    match event {
        EngineEvent::UploadProgress { sent, total } => Msg::UploadProgress { sent, total },
        EngineEvent::UploadCompleted { result } => match result {
            Ok(files) => Msg::UploadSucceeded {
                files: files
                    .into_iter()
                    .map(|file| TrackedFile {
                        id: file.id,
                        name: file.name,
                    })
                    .collect(),
            },
            Err(err) => Msg::UploadFailed {
                server_message: server_message(err),
            },
        },
        EngineEvent::StartCompleted { result } => match result {
            Ok(message) => Msg::StartSucceeded { message },
            Err(err) => Msg::StartFailed {
                server_message: server_message(err),
            },
        },
        EngineEvent::DeleteCompleted { file_id, result } => match result {
            Ok(message) => Msg::DeleteSucceeded { file_id, message },
            Err(err) => Msg::DeleteFailed {
                file_id,
                server_message: server_message(err),
            },
        },
        EngineEvent::DownloadCompleted { filename, result } => Msg::DownloadFinished {
            filename,
            result: result.map_err(server_message),
        },
        EngineEvent::Push(PushEvent::Progress(progress)) => Msg::AggregateProgress {
            percentage: progress.percentage,
            status: progress.status,
            filenames: progress.filenames,
        },
        EngineEvent::Push(PushEvent::FileProgress(progress)) => Msg::FileProgress {
            file_id: progress.file_id,
            percentage: progress.percentage,
            status: progress.status,
            download_filename: progress.download_filename,
        },
        EngineEvent::ChannelClosed { reason } => Msg::ChannelLost { reason },
    }
}

/// Only server-provided text reaches the user; everything else gets the fallback.
fn server_message(err: ApiError) -> Option<String> {
    client_warn!("request failed: {}", err);
    err.server_message
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;
    use translate_engine::{AggregateProgress, FailureKind, FileProgress};

    #[test]
    fn request_maps_to_payload_per_flow() {
        let multi = payload_for(TranslationRequest {
            target: TranslationTarget::Files(vec![TrackedFile {
                id: "1".to_string(),
                name: "a.txt".to_string(),
            }]),
            target_language: "ja".to_string(),
        });
        assert_eq!(
            multi,
            TranslationPayload::Files {
                files: vec![UploadedFile {
                    id: "1".to_string(),
                    name: "a.txt".to_string()
                }],
                target_language: "ja".to_string(),
            }
        );

        let single = payload_for(TranslationRequest {
            target: TranslationTarget::Filename("a.txt".to_string()),
            target_language: "ko".to_string(),
        });
        assert_eq!(
            single,
            TranslationPayload::Filename {
                filename: "a.txt".to_string(),
                target_language: "ko".to_string(),
            }
        );
    }

    #[test]
    fn failures_keep_only_server_text() {
        let with_text = EngineEvent::UploadCompleted {
            result: Err(ApiError::new(FailureKind::HttpStatus(400), "400 Bad Request")
                .with_server_message(Some("Invalid file".to_string()))),
        };
        assert_eq!(
            map_event(with_text),
            Msg::UploadFailed {
                server_message: Some("Invalid file".to_string())
            }
        );

        let network = EngineEvent::DeleteCompleted {
            file_id: "7".to_string(),
            result: Err(ApiError::new(FailureKind::Network, "connection refused")),
        };
        assert_eq!(
            map_event(network),
            Msg::DeleteFailed {
                file_id: "7".to_string(),
                server_message: None
            }
        );

        let download = EngineEvent::DownloadCompleted {
            filename: "a_ko.txt".to_string(),
            result: Ok(PathBuf::from("downloads/a_ko.txt")),
        };
        assert_eq!(
            map_event(download),
            Msg::DownloadFinished {
                filename: "a_ko.txt".to_string(),
                result: Ok(PathBuf::from("downloads/a_ko.txt")),
            }
        );
    }

    #[test]
    fn pushes_become_progress_messages() {
        let aggregate = EngineEvent::Push(PushEvent::Progress(AggregateProgress {
            percentage: 100,
            status: "Translation Completed!".to_string(),
            filenames: vec!["a_ko.txt".to_string()],
        }));
        assert_eq!(
            map_event(aggregate),
            Msg::AggregateProgress {
                percentage: 100,
                status: "Translation Completed!".to_string(),
                filenames: vec!["a_ko.txt".to_string()],
            }
        );

        let per_file = EngineEvent::Push(PushEvent::FileProgress(FileProgress {
            file_id: "2".to_string(),
            percentage: 40,
            status: "Translating".to_string(),
            download_filename: None,
        }));
        assert_eq!(
            map_event(per_file),
            Msg::FileProgress {
                file_id: "2".to_string(),
                percentage: 40,
                status: "Translating".to_string(),
                download_filename: None,
            }
        );

        assert_eq!(
            map_event(EngineEvent::ChannelClosed {
                reason: "gone".to_string()
            }),
            Msg::ChannelLost {
                reason: "gone".to_string()
            }
        );
    }
}
