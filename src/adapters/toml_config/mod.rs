// TOML config adapter - Configuration management using TOML files

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::tracing_log::LogFormat;
use crate::domain::errors::*;
use crate::engine::{EngineConfig, OverlayStyle, DEFAULT_PREROLL_SECONDS};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "reelcut.toml";

/// Environment variable to config key mapping
pub const ENV_OVERRIDES: &[(&str, &str)] = &[
    ("REELCUT_FFMPEG", "ffmpeg_bin"),
    ("REELCUT_FFPROBE", "ffprobe_bin"),
    ("REELCUT_OUTPUT_DIR", "output_dir"),
    ("REELCUT_TEMP_DIR", "temp_dir"),
    ("REELCUT_PREROLL", "preroll_seconds"),
    ("REELCUT_LOG_LEVEL", "log_level"),
];

/// Application configuration, the `[reelcut]` section of the config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub ffmpeg_bin: PathBuf,
    pub ffprobe_bin: PathBuf,
    pub output_dir: PathBuf,
    pub temp_dir: Option<PathBuf>,
    pub preroll_seconds: f64,
    pub probe_timeout_secs: u64,
    pub extract_timeout_secs: u64,
    pub concat_timeout_secs: u64,
    pub overlay_timeout_secs: u64,
    pub overlay_encoder: String,
    pub overlay_preset: String,
    pub overlay_crf: u8,
    pub overlay_font_file: Option<PathBuf>,
    pub overlay_font_size: u32,
    pub log_level: String,
    pub log_format: LogFormat,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ffmpeg_bin: PathBuf::from("ffmpeg"),
            ffprobe_bin: PathBuf::from("ffprobe"),
            output_dir: PathBuf::from("./output"),
            temp_dir: None,
            preroll_seconds: DEFAULT_PREROLL_SECONDS,
            probe_timeout_secs: 30,
            extract_timeout_secs: 60,
            concat_timeout_secs: 300,
            overlay_timeout_secs: 300,
            overlay_encoder: "libx264".to_string(),
            overlay_preset: "veryfast".to_string(),
            overlay_crf: 18,
            overlay_font_file: None,
            overlay_font_size: 36,
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    reelcut: AppConfig,
}

impl AppConfig {
    /// Parse the TOML text of a config file
    pub fn from_toml_str(content: &str) -> Result<Self, DomainError> {
        let file: ConfigFile = toml::from_str(content)
            .map_err(|e| DomainError::Config(format!("Failed to parse TOML config: {}", e)))?;
        Ok(file.reelcut)
    }

    /// Load an explicit config file, or `reelcut.toml` if present, or defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, DomainError> {
        let path = match explicit {
            Some(path) if !path.exists() => {
                return Err(DomainError::Config(format!(
                    "Config file does not exist: {}",
                    path.display()
                )));
            }
            Some(path) => Some(path.to_path_buf()),
            None => Some(PathBuf::from(DEFAULT_CONFIG_FILE)).filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                info!("Loading configuration from: {}", path.display());
                let content = std::fs::read_to_string(&path)
                    .map_err(|e| DomainError::io(format!("reading {}", path.display()), e))?;
                Self::from_toml_str(&content)
            }
            None => {
                debug!("No config file found, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Apply `REELCUT_*` overrides from the process environment
    pub fn apply_env(&mut self) -> Result<usize, DomainError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary variable lookup
    pub fn apply_env_from<F>(&mut self, lookup: F) -> Result<usize, DomainError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut applied = 0;
        for (var, key) in ENV_OVERRIDES {
            if let Some(value) = lookup(var) {
                info!("Found environment override: {} = {}", var, value);
                self.set(key, &value)?;
                applied += 1;
            }
        }
        Ok(applied)
    }

    /// Set a single key from its string form
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), DomainError> {
        let invalid = |e: &dyn std::fmt::Display| {
            DomainError::Config(format!("Invalid value '{}' for {}: {}", value, key, e))
        };
        match key {
            "ffmpeg_bin" => self.ffmpeg_bin = PathBuf::from(value),
            "ffprobe_bin" => self.ffprobe_bin = PathBuf::from(value),
            "output_dir" => self.output_dir = PathBuf::from(value),
            "temp_dir" => self.temp_dir = Some(PathBuf::from(value)),
            "preroll_seconds" => {
                self.preroll_seconds = value.trim().parse().map_err(|e| invalid(&e))?
            }
            "log_level" => self.log_level = value.trim().to_string(),
            "log_format" => self.log_format = value.parse()?,
            other => {
                return Err(DomainError::Config(format!("Unknown config key: {}", other)));
            }
        }
        Ok(())
    }

    /// Reject values no pipeline run could use
    pub fn validate(&self) -> Result<(), DomainError> {
        if !self.preroll_seconds.is_finite() || self.preroll_seconds < 0.0 {
            return Err(DomainError::Config(format!(
                "preroll_seconds must be a non-negative number, got {}",
                self.preroll_seconds
            )));
        }

        let timeouts = [
            ("probe_timeout_secs", self.probe_timeout_secs),
            ("extract_timeout_secs", self.extract_timeout_secs),
            ("concat_timeout_secs", self.concat_timeout_secs),
            ("overlay_timeout_secs", self.overlay_timeout_secs),
        ];
        if let Some((name, _)) = timeouts.iter().find(|(_, secs)| *secs == 0) {
            return Err(DomainError::Config(format!("{} must be greater than zero", name)));
        }

        if self.overlay_crf > 51 {
            return Err(DomainError::Config(
                "overlay_crf cannot exceed 51".to_string(),
            ));
        }
        if self.overlay_font_size == 0 {
            return Err(DomainError::Config(
                "overlay_font_size must be greater than zero".to_string(),
            ));
        }
        if self.ffmpeg_bin.as_os_str().is_empty() || self.ffprobe_bin.as_os_str().is_empty() {
            return Err(DomainError::Config("tool paths cannot be empty".to_string()));
        }
        Ok(())
    }

    pub fn clips_dir(&self) -> PathBuf {
        self.output_dir.join("clips")
    }

    pub fn reels_dir(&self) -> PathBuf {
        self.output_dir.join("reels")
    }

    /// Default registry snapshot location
    pub fn state_file(&self) -> PathBuf {
        self.output_dir.join("registry.json")
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Engine settings derived from this configuration
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            ffmpeg_bin: self.ffmpeg_bin.clone(),
            preroll_s: self.preroll_seconds,
            extract_timeout: Duration::from_secs(self.extract_timeout_secs),
            concat_timeout: Duration::from_secs(self.concat_timeout_secs),
            overlay_timeout: Duration::from_secs(self.overlay_timeout_secs),
            temp_dir: self.temp_dir.clone().unwrap_or_else(std::env::temp_dir),
            overlay: OverlayStyle {
                encoder: self.overlay_encoder.clone(),
                preset: self.overlay_preset.clone(),
                crf: self.overlay_crf,
                font_file: self.overlay_font_file.clone(),
                font_size: self.overlay_font_size,
            },
        }
    }
}
