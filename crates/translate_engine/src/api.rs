use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use client_logging::{client_debug, client_info, client_warn};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::{Body, StatusCode};
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use url::Url;

use crate::filename::local_download_name;
use crate::persist::AtomicFileWriter;
use crate::{
    ApiError, EngineEvent, FailureKind, TranslationPayload, UploadFlow, UploadSource,
    UploadedFile,
};

/// Longest plain-text error body that is still shown to the user.
const MAX_PLAIN_ERROR_LEN: usize = 200;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub flow: UploadFlow,
    pub connect_timeout: Duration,
    /// `None` lets a request wait as long as the server takes.
    pub request_timeout: Option<Duration>,
    pub download_dir: PathBuf,
}

impl ApiSettings {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            flow: UploadFlow::default(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            download_dir: PathBuf::from("downloads"),
        }
    }
}

pub trait ProgressSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub(crate) struct ChannelProgressSink {
    tx: std::sync::mpsc::Sender<EngineEvent>,
}

impl ChannelProgressSink {
    pub(crate) fn new(tx: std::sync::mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl ProgressSink for ChannelProgressSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// The server's HTTP contract.
#[async_trait::async_trait]
pub trait TranslateApi: Send + Sync {
    /// Sends every file in one multipart POST, reporting bytes as they stream out.
    async fn upload(
        &self,
        files: &[UploadSource],
        sink: Arc<dyn ProgressSink>,
    ) -> Result<Vec<UploadedFile>, ApiError>;

    /// Returns the optional `message` of the server's reply.
    async fn start_translation(
        &self,
        payload: &TranslationPayload,
    ) -> Result<Option<String>, ApiError>;

    async fn delete_file(&self, file_id: &str) -> Result<Option<String>, ApiError>;

    /// Fetches `/download/<filename>` into the download directory.
    async fn download(&self, filename: &str) -> Result<PathBuf, ApiError>;
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    files: Option<Vec<UploadedFile>>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ActionResponse {
    success: Option<bool>,
    message: Option<String>,
    error: Option<String>,
}

impl ActionResponse {
    /// A 2xx reply can still carry `success: false` or an `error` text.
    fn is_refusal(&self) -> bool {
        self.success == Some(false) || self.error.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct ReqwestApi {
    settings: ApiSettings,
    client: reqwest::Client,
}

impl ReqwestApi {
    pub fn new(settings: ApiSettings) -> Result<Self, ApiError> {
        let mut builder = reqwest::Client::builder().connect_timeout(settings.connect_timeout);
        if let Some(timeout) = settings.request_timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self { settings, client })
    }

    pub fn settings(&self) -> &ApiSettings {
        &self.settings
    }

    /// Appends path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.settings.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                ApiError::new(
                    FailureKind::InvalidUrl,
                    format!("{} cannot be a base url", self.settings.base_url),
                )
            })?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn upload_form(
        &self,
        files: &[UploadSource],
        sink: Arc<dyn ProgressSink>,
    ) -> Result<(Form, u64), ApiError> {
        let mut opened = Vec::with_capacity(files.len());
        let mut total = 0u64;
        for file in files {
            let handle = tokio::fs::File::open(&file.path)
                .await
                .map_err(|err| io_error(&file.name, err))?;
            let len = handle
                .metadata()
                .await
                .map_err(|err| io_error(&file.name, err))?
                .len();
            total += len;
            opened.push((file.name.clone(), handle, len));
        }

        let sent = Arc::new(AtomicU64::new(0));
        let field = self.settings.flow.field_name();
        let mut form = Form::new();
        for (name, handle, len) in opened {
            let sink = sink.clone();
            let sent = sent.clone();
            let stream = ReaderStream::new(handle).map(move |chunk| {
                if let Ok(bytes) = &chunk {
                    let chunk_len = bytes.len() as u64;
                    let now = sent.fetch_add(chunk_len, Ordering::Relaxed) + chunk_len;
                    sink.emit(EngineEvent::UploadProgress { sent: now, total });
                }
                chunk
            });
            let part = Part::stream_with_length(Body::wrap_stream(stream), len).file_name(name);
            form = form.part(field, part);
        }
        Ok((form, total))
    }
}

#[async_trait::async_trait]
impl TranslateApi for ReqwestApi {
    async fn upload(
        &self,
        files: &[UploadSource],
        sink: Arc<dyn ProgressSink>,
    ) -> Result<Vec<UploadedFile>, ApiError> {
        let url = self.endpoint(&["upload"])?;
        let (form, total) = self.upload_form(files, sink).await?;
        client_info!(
            "POST {} files={} bytes={} field={}",
            url,
            files.len(),
            total,
            self.settings.flow.field_name()
        );

        let response = self
            .client
            .post(url)
            .multipart(form)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        match self.settings.flow {
            UploadFlow::Single => Ok(files
                .iter()
                .take(1)
                .map(|file| UploadedFile {
                    id: file.name.clone(),
                    name: file.name.clone(),
                })
                .collect()),
            UploadFlow::Multi => {
                let parsed: UploadResponse = serde_json::from_slice(&body).map_err(|err| {
                    ApiError::new(FailureKind::MalformedResponse, err.to_string())
                })?;
                match parsed.files {
                    Some(files) => {
                        client_debug!("upload acknowledged {} file(s)", files.len());
                        Ok(files)
                    }
                    None => Err(ApiError::new(
                        FailureKind::MalformedResponse,
                        "upload response lacks `files`",
                    )
                    .with_server_message(parsed.error)),
                }
            }
        }
    }

    async fn start_translation(
        &self,
        payload: &TranslationPayload,
    ) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(&["start_translation"])?;
        client_info!("POST {}", url);
        let response = self
            .client
            .post(url)
            .json(payload)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        let reply: ActionResponse = serde_json::from_slice(&body).unwrap_or_default();
        if reply.is_refusal() {
            return Err(
                ApiError::new(FailureKind::Rejected, "start of translation refused")
                    .with_server_message(reply.error),
            );
        }
        Ok(reply.message)
    }

    async fn delete_file(&self, file_id: &str) -> Result<Option<String>, ApiError> {
        let url = self.endpoint(&["delete_file", file_id])?;
        client_info!("DELETE {}", url);
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }
        let reply: ActionResponse = serde_json::from_slice(&body).unwrap_or_default();
        if reply.is_refusal() {
            return Err(
                ApiError::new(FailureKind::Rejected, format!("delete of {file_id} refused"))
                    .with_server_message(reply.error),
            );
        }
        Ok(reply.message)
    }

    async fn download(&self, filename: &str) -> Result<PathBuf, ApiError> {
        let url = self.endpoint(&["download", filename])?;
        client_info!("GET {}", url);
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(map_reqwest_error)?;
        let status = response.status();
        let body = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            return Err(status_error(status, &body));
        }

        let writer = AtomicFileWriter::new(self.settings.download_dir.clone());
        let local_name = local_download_name(filename);
        writer
            .write(&local_name, &body)
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))
    }
}

/// Builds the error for a non-success reply, keeping any server-provided text.
fn status_error(status: StatusCode, body: &[u8]) -> ApiError {
    let server_message = server_error_text(body);
    client_warn!(
        "request failed with {} (server message: {:?})",
        status,
        server_message
    );
    ApiError::new(FailureKind::HttpStatus(status.as_u16()), status.to_string())
        .with_server_message(server_message)
}

fn server_error_text(body: &[u8]) -> Option<String> {
    if let Ok(reply) = serde_json::from_slice::<ActionResponse>(body) {
        return reply.error.filter(|text| !text.trim().is_empty());
    }
    let text = std::str::from_utf8(body).ok()?.trim();
    if text.is_empty() || text.starts_with('<') || text.len() > MAX_PLAIN_ERROR_LEN {
        return None;
    }
    Some(text.to_string())
}

fn io_error(name: &str, err: std::io::Error) -> ApiError {
    ApiError::new(FailureKind::Io, format!("{name}: {err}"))
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_errors_are_kept() {
        assert_eq!(
            server_error_text(b"File type not allowed"),
            Some("File type not allowed".to_string())
        );
        assert_eq!(
            server_error_text(br#"{"error": "Invalid file"}"#),
            Some("Invalid file".to_string())
        );
        assert_eq!(server_error_text(b"<html>500</html>"), None);
        assert_eq!(server_error_text(b"  "), None);
        assert_eq!(server_error_text(br#"{"success": false}"#), None);
    }

    #[test]
    fn endpoint_encodes_segments() {
        let settings = ApiSettings::new(Url::parse("http://localhost:5000/app/").unwrap());
        let api = ReqwestApi::new(settings).unwrap();

        let url = api.endpoint(&["download", "my report?.pdf"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5000/app/download/my%20report%3F.pdf"
        );
    }
}
