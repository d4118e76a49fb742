//! RON configuration file for the client.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use client_logging::client_info;
use serde::{Deserialize, Serialize};
use translate_core::{AllowList, ClientSettings, Language};
use translate_engine::{ApiSettings, EngineConfig};
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "translate_client.ron";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FlowSetting {
    #[default]
    Multi,
    Single,
}

// Core and engine keep separate flow types.
impl From<FlowSetting> for translate_core::UploadFlow {
    fn from(flow: FlowSetting) -> Self {
        match flow {
            FlowSetting::Multi => Self::Multi,
            FlowSetting::Single => Self::Single,
        }
    }
}

impl From<FlowSetting> for translate_engine::UploadFlow {
    fn from(flow: FlowSetting) -> Self {
        match flow {
            FlowSetting::Multi => Self::Multi,
            FlowSetting::Single => Self::Single,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LanguageEntry {
    pub code: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub server_url: String,
    pub flow: FlowSetting,
    pub allowed_extensions: Vec<String>,
    pub languages: Vec<LanguageEntry>,
    pub default_language: String,
    pub combined_marker: Option<String>,
    pub download_dir: PathBuf,
    pub reveal_delay_ms: u64,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: Option<u64>,
}

impl Default for FileConfig {
    fn default() -> Self {
        let settings = ClientSettings::default();
        Self {
            server_url: "http://localhost:5000".to_string(),
            flow: FlowSetting::Multi,
            allowed_extensions: settings.allow_list.extensions().to_vec(),
            languages: settings
                .languages
                .into_iter()
                .map(|language| LanguageEntry {
                    code: language.code,
                    name: language.name,
                })
                .collect(),
            default_language: settings.default_language,
            combined_marker: None,
            download_dir: PathBuf::from("downloads"),
            reveal_delay_ms: settings.reveal_delay.as_millis() as u64,
            connect_timeout_secs: 10,
            request_timeout_secs: None,
        }
    }
}

/// Everything the app needs to build its state and engine.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub client: ClientSettings,
    pub engine: EngineConfig,
}

/// Reads `path`; a missing file yields the defaults.
pub fn load(path: &Path) -> anyhow::Result<FileConfig> {
    let content = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            client_info!("No config at {:?}; using defaults", path);
            return Ok(FileConfig::default());
        }
        Err(err) => {
            return Err(err).with_context(|| format!("failed to read config {}", path.display()))
        }
    };
    let config = ron::from_str(&content)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    client_info!("Loaded config from {:?}", path);
    Ok(config)
}

impl FileConfig {
    pub fn resolve(self, server_override: Option<&str>) -> anyhow::Result<LoadedConfig> {
        let server = server_override.unwrap_or(&self.server_url);
        let base_url =
            Url::parse(server).with_context(|| format!("invalid server url {server:?}"))?;
        if base_url.cannot_be_a_base() {
            bail!("server url {server:?} cannot carry paths");
        }
        if self.languages.is_empty() {
            bail!("at least one target language must be configured");
        }
        if !self
            .languages
            .iter()
            .any(|language| language.code == self.default_language)
        {
            bail!(
                "default_language {:?} is not among the configured languages",
                self.default_language
            );
        }

        let client = ClientSettings {
            flow: self.flow.into(),
            allow_list: AllowList::new(&self.allowed_extensions),
            languages: self
                .languages
                .into_iter()
                .map(|entry| Language::new(entry.code, entry.name))
                .collect(),
            default_language: self.default_language,
            combined_marker: self.combined_marker.filter(|marker| !marker.is_empty()),
            reveal_delay: Duration::from_millis(self.reveal_delay_ms),
        };

        let api = ApiSettings {
            flow: self.flow.into(),
            connect_timeout: Duration::from_secs(self.connect_timeout_secs),
            request_timeout: self.request_timeout_secs.map(Duration::from_secs),
            download_dir: self.download_dir,
            ..ApiSettings::new(base_url)
        };

        Ok(LoadedConfig {
            client,
            engine: EngineConfig::new(api),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, FileConfig::default());
        assert_eq!(config.allowed_extensions, vec![".txt", ".srt"]);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.ron");
        fs::write(
            &path,
            r#"(
                server_url: "http://translate.local:8080/",
                flow: Single,
                allowed_extensions: ["pdf", ".DOCX"],
                combined_marker: Some("_combined"),
                reveal_delay_ms: 0,
            )"#,
        )
        .unwrap();

        let loaded = load(&path).unwrap().resolve(None).unwrap();
        assert_eq!(loaded.client.flow, translate_core::UploadFlow::Single);
        assert_eq!(loaded.client.allow_list.extensions(), [".pdf", ".docx"]);
        assert_eq!(loaded.client.combined_marker.as_deref(), Some("_combined"));
        assert_eq!(loaded.client.reveal_delay, Duration::ZERO);
        assert_eq!(loaded.client.default_language, "ko");
        assert_eq!(loaded.engine.api.flow, translate_engine::UploadFlow::Single);
        assert_eq!(
            loaded.engine.api.base_url.as_str(),
            "http://translate.local:8080/"
        );
        assert!(loaded.engine.channel.is_some());
    }

    #[test]
    fn shipped_sample_matches_defaults() {
        let config: FileConfig = ron::from_str(include_str!("../../translate_client.ron")).unwrap();
        assert_eq!(
            config,
            FileConfig {
                allowed_extensions: vec!["txt".to_string(), "srt".to_string()],
                ..FileConfig::default()
            }
        );
    }

    #[test]
    fn flow_setting_selects_matching_contracts() {
        for (setting, core, field) in [
            (FlowSetting::Multi, translate_core::UploadFlow::Multi, "files[]"),
            (FlowSetting::Single, translate_core::UploadFlow::Single, "file"),
        ] {
            let loaded = FileConfig {
                flow: setting,
                ..FileConfig::default()
            }
            .resolve(None)
            .unwrap();
            assert_eq!(loaded.client.flow, core);
            assert_eq!(loaded.engine.api.flow.field_name(), field);
        }
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.ron");
        fs::write(&path, "(flow: Sideways)").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn server_flag_overrides_file() {
        let loaded = FileConfig::default()
            .resolve(Some("https://example.org/translate/"))
            .unwrap();
        assert_eq!(
            loaded.engine.api.base_url.as_str(),
            "https://example.org/translate/"
        );
    }

    #[test]
    fn rejects_inconsistent_languages() {
        let config = FileConfig {
            default_language: "fr".to_string(),
            ..FileConfig::default()
        };
        assert!(config.resolve(None).is_err());

        let config = FileConfig {
            languages: Vec::new(),
            ..FileConfig::default()
        };
        assert!(config.resolve(None).is_err());
        assert!(FileConfig::default().resolve(Some("not a url")).is_err());
    }
}
