use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer, Serialize};

pub type FileId = String;

/// Which upload/start contract the server speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UploadFlow {
    /// Field `files[]`, JSON `{files: [...]}` response, `{files, target_language}` start body.
    #[default]
    Multi,
    /// Field `file`, bare `200` response, `{filename, target_language}` start body.
    Single,
}

impl UploadFlow {
    pub fn field_name(self) -> &'static str {
        match self {
            UploadFlow::Multi => "files[]",
            UploadFlow::Single => "file",
        }
    }
}

/// Server-assigned identity of an uploaded file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(deserialize_with = "string_or_number")]
    pub id: FileId,
    pub name: String,
}

/// Local file to be sent in an upload body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSource {
    pub name: String,
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TranslationPayload {
    Files {
        files: Vec<UploadedFile>,
        target_language: String,
    },
    Filename {
        filename: String,
        target_language: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateProgress {
    pub percentage: u8,
    pub status: String,
    pub filenames: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProgress {
    pub file_id: FileId,
    pub percentage: u8,
    pub status: String,
    pub download_filename: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushEvent {
    Progress(AggregateProgress),
    FileProgress(FileProgress),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    UploadProgress {
        sent: u64,
        total: u64,
    },
    UploadCompleted {
        result: Result<Vec<UploadedFile>, ApiError>,
    },
    StartCompleted {
        result: Result<Option<String>, ApiError>,
    },
    DeleteCompleted {
        file_id: FileId,
        result: Result<Option<String>, ApiError>,
    },
    DownloadCompleted {
        filename: String,
        result: Result<PathBuf, ApiError>,
    },
    Push(PushEvent),
    ChannelClosed {
        reason: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
    /// Error text reported by the server, shown to the user verbatim.
    pub server_message: Option<String>,
}

impl ApiError {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            server_message: None,
        }
    }

    pub fn with_server_message(mut self, server_message: Option<String>) -> Self {
        self.server_message = server_message;
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    MalformedResponse,
    /// Success status but the body reported failure.
    Rejected,
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::MalformedResponse => write!(f, "malformed response"),
            FailureKind::Rejected => write!(f, "rejected by server"),
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

/// Server ids arrive as JSON strings or numbers.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_accept_numbers() {
        let files: Vec<UploadedFile> =
            serde_json::from_str(r#"[{"id": 7, "name": "a.pdf"}, {"id": "b1", "name": "b.pdf"}]"#)
                .unwrap();
        assert_eq!(files[0].id, "7");
        assert_eq!(files[1].id, "b1");
    }

    #[test]
    fn payload_shapes() {
        let multi = TranslationPayload::Files {
            files: vec![UploadedFile {
                id: "1".to_string(),
                name: "a.pdf".to_string(),
            }],
            target_language: "ko".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&multi).unwrap(),
            serde_json::json!({"files": [{"id": "1", "name": "a.pdf"}], "target_language": "ko"})
        );

        let single = TranslationPayload::Filename {
            filename: "a.txt".to_string(),
            target_language: "en".to_string(),
        };
        assert_eq!(
            serde_json::to_value(&single).unwrap(),
            serde_json::json!({"filename": "a.txt", "target_language": "en"})
        );
    }
}
