use serde::Deserialize;
use serde_json::Value;

use crate::{AggregateProgress, FileProgress, PushEvent};

pub(crate) const PROGRESS_EVENT: &str = "progress";
pub(crate) const FILE_PROGRESS_EVENT: &str = "file_progress";

#[derive(Debug, Deserialize)]
struct WireProgress {
    #[serde(default)]
    data: String,
    #[serde(default)]
    percentage: f64,
    #[serde(default)]
    filenames: Vec<String>,
    /// Older servers announce a single output file.
    #[serde(default)]
    filename: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireFileProgress {
    #[serde(deserialize_with = "crate::types::string_or_number")]
    file_id: String,
    #[serde(default)]
    percentage: f64,
    #[serde(default)]
    status: String,
    #[serde(default)]
    download_filename: Option<String>,
}

/// Rounds a wire percentage into `0..=100`.
pub fn clamp_percentage(raw: f64) -> u8 {
    if !raw.is_finite() {
        return 0;
    }
    raw.round().clamp(0.0, 100.0) as u8
}

/// Maps a Socket.IO event onto a push event. Unknown events and bad payloads yield `None`.
pub fn decode_push(name: &str, args: &[Value]) -> Option<PushEvent> {
    let payload = args.first()?.clone();
    match name {
        PROGRESS_EVENT => {
            let wire: WireProgress = serde_json::from_value(payload).ok()?;
            let mut filenames = wire.filenames;
            if let Some(filename) = wire.filename {
                if !filenames.contains(&filename) {
                    filenames.push(filename);
                }
            }
            Some(PushEvent::Progress(AggregateProgress {
                percentage: clamp_percentage(wire.percentage),
                status: wire.data,
                filenames,
            }))
        }
        FILE_PROGRESS_EVENT => {
            let wire: WireFileProgress = serde_json::from_value(payload).ok()?;
            Some(PushEvent::FileProgress(FileProgress {
                file_id: wire.file_id,
                percentage: clamp_percentage(wire.percentage),
                status: wire.status,
                download_filename: wire.download_filename.filter(|name| !name.is_empty()),
            }))
        }
        _ => None,
    }
}
