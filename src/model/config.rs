use anyhow::{Result, anyhow};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use super::mode::GridMode;
use super::position::FocusPosition;

const DEFAULT_CONFIG: &str = include_str!("../../config/default.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub general: GeneralConfig,
    pub grid: GridConfig,
    pub selection: SelectionConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeneralConfig {
    pub document_path: String,
    pub log_filter: String,
    pub mode: GridMode,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    /// Cell focused when Enter is pressed on the grid root.
    pub default_cell: FocusPosition,
    /// Cell focused after a range is committed.
    pub sentinel_cell: FocusPosition,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SelectionConfig {
    pub gesture_keys: Vec<char>,
    pub rechunk_payload: RechunkPayload,
    pub refocus_after_commit: RefocusTarget,
    pub cancel_on_pointer_leave: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    pub cell_focused: bool,
    pub cell_activated: bool,
}

/// Shape of the `rechunk` intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RechunkPayload {
    /// `rechunk{start, end}`.
    #[default]
    Range,
    /// Bare `rechunk`; the owner uses the last `update_selection`.
    Bare,
}

/// Where focus lands once a committed range has been re-rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RefocusTarget {
    #[default]
    Sentinel,
    Anchor,
}

impl AppConfig {
    /// Load configuration with layering: defaults → user config.
    pub fn load() -> Result<Self> {
        let mut config = Self::defaults()?;

        if let Some(proj_dirs) = directories::ProjectDirs::from("", "", "gridhook") {
            let config_path = proj_dirs.config_dir().join("config.toml");
            if config_path.exists() {
                config = Self::from_file(&config_path)?;
            }
        }

        config.general.document_path = expand_tilde(&config.general.document_path)?;
        Ok(config)
    }

    pub fn defaults() -> Result<Self> {
        Ok(toml::from_str(DEFAULT_CONFIG)?)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        toml::from_str(&raw).map_err(|err| anyhow!("{}: {err}", path.display()))
    }

    pub fn document_path(&self) -> PathBuf {
        PathBuf::from(&self.general.document_path)
    }
}

fn expand_tilde(path: &str) -> Result<String> {
    if !path.starts_with('~') {
        return Ok(path.to_string());
    }

    let home = directories::BaseDirs::new()
        .map(|d| d.home_dir().to_path_buf())
        .ok_or_else(|| anyhow!("cannot determine home directory"))?;
    Ok(path.replacen('~', &home.to_string_lossy(), 1))
}
