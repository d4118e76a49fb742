/// Coarse, cosmetic phase derived from a progress percentage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    /// Translation accepted, no progress pushed yet.
    #[default]
    Starting,
    Preparing,
    Translating,
    Finalizing,
    /// Download links are on screen.
    Complete,
    /// The server reported an error status.
    Failed,
}

impl Phase {
    pub fn from_percentage(percentage: u8) -> Self {
        match percentage {
            0..=49 => Phase::Preparing,
            50..=99 => Phase::Translating,
            _ => Phase::Finalizing,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Phase::Starting => "Starting file processing...",
            Phase::Preparing => "Splitting file and preparing for translation...",
            Phase::Translating => "Translating file parts...",
            Phase::Finalizing => "Translation completed. Preparing download link...",
            Phase::Complete => "Translation is complete. Download link is ready.",
            Phase::Failed => "Translation failed.",
        }
    }
}

/// Last known progress of the whole job or of one file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProgressSnapshot {
    pub percentage: u8,
    pub status: String,
    pub phase: Phase,
}

impl ProgressSnapshot {
    pub(crate) fn started() -> Self {
        Self::default()
    }

    /// Builds a snapshot from a pushed event. Error statuses win over thresholds.
    pub(crate) fn from_event(percentage: u8, status: String) -> Self {
        let percentage = percentage.min(100);
        let phase = if is_error_status(&status) {
            Phase::Failed
        } else {
            Phase::from_percentage(percentage)
        };
        Self {
            percentage,
            status,
            phase,
        }
    }
}

fn is_error_status(status: &str) -> bool {
    status.trim_start().starts_with("Error")
}
