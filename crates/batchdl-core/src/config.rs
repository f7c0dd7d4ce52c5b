use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Which child output stream is forwarded to the logger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputChannel {
    #[default]
    Stdout,
    Stderr,
    Both,
}

impl OutputChannel {
    pub fn includes_stdout(self) -> bool {
        matches!(self, OutputChannel::Stdout | OutputChannel::Both)
    }

    pub fn includes_stderr(self) -> bool {
        matches!(self, OutputChannel::Stderr | OutputChannel::Both)
    }
}

/// Download engine invocation (the `[engine]` section in config.toml).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Display name used in logs.
    pub name: String,
    /// Executable to launch; resolved through PATH when not absolute.
    pub executable: PathBuf,
    /// Arguments placed before user options on every invocation.
    #[serde(default)]
    pub base_args: Vec<String>,
    /// Options used when the user gives none for a run (whitespace separated).
    #[serde(default)]
    pub default_options: String,
    /// Child output stream routed to the logger.
    #[serde(default)]
    pub output_channel: OutputChannel,
    /// Only forward lines containing this substring (empty = all lines).
    #[serde(default)]
    pub output_filter: String,
    /// Whether the engine can download playlist entries.
    #[serde(default)]
    pub supports_playlists: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            name: "yt-dlp".to_string(),
            executable: PathBuf::from("yt-dlp"),
            base_args: vec!["--newline".to_string()],
            default_options: String::new(),
            output_channel: OutputChannel::Stdout,
            output_filter: String::new(),
            supports_playlists: true,
        }
    }
}

/// Global configuration loaded from `~/.config/batchdl/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchConfig {
    /// When false, every run downloads one item at a time.
    pub concurrent_downloading: bool,
    /// Concurrency cap used when `concurrent_downloading` is on.
    pub max_concurrent_downloads: usize,
    /// Working directory for engine processes (None = current dir).
    #[serde(default)]
    pub download_folder: Option<PathBuf>,
    /// Shell command run after each successful item; the item URL is appended.
    #[serde(default)]
    pub command_on_successful_download: Option<String>,
    /// Shell command run once when a run finishes every item.
    #[serde(default)]
    pub command_when_all_finished: Option<String>,
    #[serde(default)]
    pub engine: EngineConfig,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            concurrent_downloading: true,
            max_concurrent_downloads: 4,
            download_folder: None,
            command_on_successful_download: None,
            command_when_all_finished: None,
            engine: EngineConfig::default(),
        }
    }
}

impl BatchConfig {
    /// Concurrency cap for a run: the configured maximum, or 1 when concurrent downloading is off.
    pub fn effective_concurrency(&self) -> usize {
        if self.concurrent_downloading {
            self.max_concurrent_downloads.max(1)
        } else {
            1
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("batchdl")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<BatchConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = BatchConfig::default();
        write_to_path(&default_cfg, &path)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from_path(&path)
}

pub fn load_from_path(path: &Path) -> Result<BatchConfig> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("read config: {}", path.display()))?;
    let cfg: BatchConfig =
        toml::from_str(&data).with_context(|| format!("parse config: {}", path.display()))?;
    Ok(cfg)
}

pub fn write_to_path(cfg: &BatchConfig, path: &Path) -> Result<()> {
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_values() {
        let cfg = BatchConfig::default();
        assert!(cfg.concurrent_downloading);
        assert_eq!(cfg.max_concurrent_downloads, 4);
        assert_eq!(cfg.engine.name, "yt-dlp");
        assert_eq!(cfg.engine.output_channel, OutputChannel::Stdout);
        assert!(cfg.command_when_all_finished.is_none());
    }

    #[test]
    fn effective_concurrency_respects_toggle() {
        let mut cfg = BatchConfig {
            max_concurrent_downloads: 6,
            ..BatchConfig::default()
        };
        assert_eq!(cfg.effective_concurrency(), 6);
        cfg.concurrent_downloading = false;
        assert_eq!(cfg.effective_concurrency(), 1);
        cfg.concurrent_downloading = true;
        cfg.max_concurrent_downloads = 0;
        assert_eq!(cfg.effective_concurrency(), 1);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            concurrent_downloading = false
            max_concurrent_downloads = 8
            command_when_all_finished = "notify-send done"

            [engine]
            name = "gallery-dl"
            executable = "/usr/bin/gallery-dl"
            output_channel = "both"
            output_filter = "%"
        "#;
        let cfg: BatchConfig = toml::from_str(toml).unwrap();
        assert!(!cfg.concurrent_downloading);
        assert_eq!(cfg.max_concurrent_downloads, 8);
        assert_eq!(cfg.command_when_all_finished.as_deref(), Some("notify-send done"));
        assert_eq!(cfg.engine.name, "gallery-dl");
        assert_eq!(cfg.engine.output_channel, OutputChannel::Both);
        assert!(cfg.engine.base_args.is_empty());
        assert!(!cfg.engine.supports_playlists);
    }

    #[test]
    fn engine_section_is_optional() {
        let toml = r#"
            concurrent_downloading = true
            max_concurrent_downloads = 2
        "#;
        let cfg: BatchConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.engine.executable, PathBuf::from("yt-dlp"));
        assert!(cfg.download_folder.is_none());
    }

    #[test]
    fn write_then_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = BatchConfig {
            max_concurrent_downloads: 3,
            command_on_successful_download: Some("echo ok".to_string()),
            ..BatchConfig::default()
        };
        write_to_path(&cfg, &path).unwrap();
        let loaded = load_from_path(&path).unwrap();
        assert_eq!(loaded.max_concurrent_downloads, 3);
        assert_eq!(loaded.command_on_successful_download.as_deref(), Some("echo ok"));
        assert_eq!(loaded.engine.base_args, vec!["--newline".to_string()]);
    }

    #[test]
    fn load_from_path_reports_parse_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "max_concurrent_downloads = \"many\"").unwrap();
        let err = load_from_path(&path).unwrap_err();
        assert!(format!("{err:#}").contains("parse config"));
    }
}
