use std::path::PathBuf;

use chrono::Duration;
use tracing::warn;

use crate::assessment::Thresholds;
use crate::autosave::DEFAULT_AUTOSAVE_SECS;

const DEFAULT_DB_NAME: &str = "progress.db";
const APP_DIR: &str = "waypath";
const MAX_AUTOSAVE_SECS: i64 = 24 * 60 * 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub catalog_path: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub autosave_interval: Duration,
    pub thresholds: Thresholds,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Bad values are logged and replaced by defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let db_path = lookup("WAYPATH_DB")
            .map(PathBuf::from)
            .unwrap_or_else(default_db_path);

        let catalog_path = lookup("WAYPATH_CATALOG").map(PathBuf::from);

        let export_dir = lookup("WAYPATH_EXPORT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));

        let default_interval = Duration::seconds(DEFAULT_AUTOSAVE_SECS);
        let autosave_interval = match lookup("WAYPATH_AUTOSAVE_SECS") {
            Some(raw) => raw
                .trim()
                .parse::<i64>()
                .ok()
                .filter(|secs| (1..=MAX_AUTOSAVE_SECS).contains(secs))
                .and_then(Duration::try_seconds)
                .unwrap_or_else(|| {
                    warn!(
                        value = %raw,
                        max = MAX_AUTOSAVE_SECS,
                        "invalid WAYPATH_AUTOSAVE_SECS, using default"
                    );
                    default_interval
                }),
            None => default_interval,
        };

        let thresholds = match lookup("WAYPATH_THRESHOLDS") {
            Some(raw) => raw.parse::<Thresholds>().unwrap_or_else(|e| {
                warn!(error = %e, "invalid WAYPATH_THRESHOLDS, using defaults");
                Thresholds::default()
            }),
            None => Thresholds::default(),
        };

        Self {
            db_path,
            catalog_path,
            export_dir,
            autosave_interval,
            thresholds,
        }
    }
}

fn default_db_path() -> PathBuf {
    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_DIR);

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}
