use chrono::Weekday;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::commands::session::ApiState;
use crate::error::{AppError, Result};
use crate::util::app_dir;

pub const DEFAULT_API_URL: &str = "http://localhost:8080/api";
const API_URL_ENV: &str = "RAIDPLAN_API_URL";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    #[default]
    Monday,
    Sunday,
}

impl From<WeekStart> for Weekday {
    fn from(w: WeekStart) -> Self {
        match w {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaidplanConfig {
    pub version: u32,
    pub api_base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_viewed_raid: Option<i64>,
    #[serde(default)]
    pub week_start: WeekStart,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_level: Option<String>,
}

impl Default for RaidplanConfig {
    fn default() -> Self {
        Self {
            version: 1,
            api_base_url: DEFAULT_API_URL.to_string(),
            last_viewed_raid: None,
            week_start: WeekStart::default(),
            log_level: None,
        }
    }
}

impl RaidplanConfig {
    /// Base URL to use, honoring `RAIDPLAN_API_URL` over the saved value.
    pub fn effective_api_url(&self) -> String {
        std::env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| self.api_base_url.clone())
    }

    pub fn log_filter(&self) -> log::LevelFilter {
        self.log_level
            .as_deref()
            .and_then(|l| l.parse().ok())
            .unwrap_or(log::LevelFilter::Info)
    }
}

pub fn config_path() -> Option<PathBuf> {
    app_dir().map(|d| d.join("config.json"))
}

/// Reads the config file, falling back to defaults when it is missing or unreadable.
pub fn read_config(path: &Path) -> RaidplanConfig {
    std::fs::read_to_string(path)
        .ok()
        .and_then(|content| serde_json::from_str(&content).ok())
        .unwrap_or_default()
}

pub fn write_config(path: &Path, config: &RaidplanConfig) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string_pretty(config)?;
    std::fs::write(path, json)?;
    Ok(())
}

/// Loads `~/.raidplan/config.json`, or defaults.
pub fn current_config() -> RaidplanConfig {
    config_path()
        .map(|p| read_config(&p))
        .unwrap_or_default()
}

fn update_config(apply: impl FnOnce(&mut RaidplanConfig)) -> Result<RaidplanConfig> {
    let path = config_path()
        .ok_or_else(|| AppError::Custom("Cannot find home directory".into()))?;
    let mut config = read_config(&path);
    apply(&mut config);
    write_config(&path, &config)?;
    Ok(config)
}

#[tauri::command]
pub async fn load_config() -> RaidplanConfig {
    current_config()
}

/// Saves user settings. A new API URL takes effect immediately; the session
/// token is kept.
#[tauri::command]
pub async fn save_settings(
    api_base_url: Option<String>,
    week_start: Option<WeekStart>,
    log_level: Option<String>,
    api: tauri::State<'_, ApiState>,
) -> Result<RaidplanConfig> {
    let config = update_config(|config| {
        if let Some(url) = api_base_url.filter(|u| !u.trim().is_empty()) {
            config.api_base_url = url.trim().to_string();
        }
        if let Some(week_start) = week_start {
            config.week_start = week_start;
        }
        if log_level.is_some() {
            config.log_level = log_level;
        }
    })?;

    log::set_max_level(config.log_filter());
    api.rebase(&config.effective_api_url()).await;
    log::info!("settings saved (api: {})", config.api_base_url);
    Ok(config)
}

/// Remembers the raid the roster view last showed.
pub fn remember_raid(raid_id: i64) {
    if let Err(e) = update_config(|config| config.last_viewed_raid = Some(raid_id)) {
        log::warn!("could not remember raid {raid_id}: {e}");
    }
}
