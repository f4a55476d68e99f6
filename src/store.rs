//! Settings and stats persistence.
//!
//! Two small TOML documents under the per-user config directory:
//! `settings.toml` holds the user-editable [`Settings`], `stats.toml` holds
//! lifetime [`Stats`]. Missing files are not an error; the caller falls back
//! to defaults.

use crate::settings::Settings;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const SETTINGS_FILE: &str = "settings.toml";
const STATS_FILE: &str = "stats.toml";

/// Lifetime statistics persisted across runs.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub completed_pomodoros: u32,
}

/// On-disk store for settings and stats.
#[derive(Debug, Clone)]
pub struct Store {
    dir: PathBuf,
}

impl Store {
    /// Store rooted at the standard per-user config directory.
    ///
    /// - macOS: `~/Library/Application Support/pomoclock/`
    /// - Linux: `~/.config/pomoclock/`
    /// - Windows: `%APPDATA%\pomoclock\`
    pub fn new() -> Result<Self> {
        let dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join("pomoclock");
        Ok(Self { dir })
    }

    /// Store rooted at a specific directory. Primarily intended for tests
    /// and portable installs.
    pub fn with_dir(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn settings_path(&self) -> PathBuf {
        self.dir.join(SETTINGS_FILE)
    }

    pub fn stats_path(&self) -> PathBuf {
        self.dir.join(STATS_FILE)
    }

    /// Load persisted settings. `Ok(None)` when no settings file exists yet.
    ///
    /// A settings file that parses but fails validation is an error: the
    /// caller decides whether to fall back to defaults or surface it.
    pub fn load_settings(&self) -> Result<Option<Settings>> {
        let path = self.settings_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read settings file: {}", path.display()))?;
        let settings: Settings =
            toml::from_str(&contents).context("Failed to parse settings file")?;
        settings
            .validate()
            .with_context(|| format!("Invalid settings file: {}", path.display()))?;
        Ok(Some(settings))
    }

    pub fn save_settings(&self, settings: &Settings) -> Result<()> {
        let contents = toml::to_string_pretty(settings).context("Failed to serialize settings")?;
        self.write_file(&self.settings_path(), &contents)?;
        log::info!("Settings saved to: {}", self.settings_path().display());
        Ok(())
    }

    /// Load persisted stats. `Ok(None)` when no stats file exists yet.
    pub fn load_stats(&self) -> Result<Option<Stats>> {
        let path = self.stats_path();
        if !path.exists() {
            return Ok(None);
        }
        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read stats file: {}", path.display()))?;
        let stats: Stats = toml::from_str(&contents).context("Failed to parse stats file")?;
        Ok(Some(stats))
    }

    pub fn save_stats(&self, stats: &Stats) -> Result<()> {
        let contents = toml::to_string_pretty(stats).context("Failed to serialize stats")?;
        self.write_file(&self.stats_path(), &contents)
    }

    fn write_file(&self, path: &Path, contents: &str) -> Result<()> {
        fs::create_dir_all(&self.dir).context("Failed to create config directory")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> Store {
        // Unique per-test directory so parallel tests never share a path.
        use std::thread;
        use std::time::{SystemTime, UNIX_EPOCH};

        let mut base = std::env::temp_dir();
        base.push("pomoclock_tests");
        base.push("store");

        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos();
        let tid = format!("{:?}", thread::current().id());
        base.push(format!("t_{nanos}_{tid}"));

        Store::with_dir(base)
    }

    #[test]
    fn test_missing_files_load_as_none() {
        let store = temp_store();
        assert!(store.load_settings().unwrap().is_none());
        assert!(store.load_stats().unwrap().is_none());
    }

    #[test]
    fn test_settings_roundtrip() {
        let store = temp_store();
        let settings = Settings {
            pomodoro_minutes: 45,
            short_break_minutes: 8,
            long_break_minutes: 25,
            long_break_interval: 3,
            auto_start: true,
            notifications_enabled: true,
            dark_theme: false,
        };

        store.save_settings(&settings).expect("save should succeed");
        let loaded = store
            .load_settings()
            .expect("load should succeed")
            .expect("file should exist");
        assert_eq!(loaded, settings);
    }

    #[test]
    fn test_stats_roundtrip() {
        let store = temp_store();
        let stats = Stats {
            completed_pomodoros: 17,
        };
        store.save_stats(&stats).expect("save should succeed");
        assert_eq!(store.load_stats().unwrap(), Some(stats));
    }

    #[test]
    fn test_invalid_settings_file_rejected() {
        let store = temp_store();
        fs::create_dir_all(store.settings_path().parent().unwrap()).unwrap();
        fs::write(
            store.settings_path(),
            r#"
pomodoro_minutes = 0
short_break_minutes = 5
long_break_minutes = 15
long_break_interval = 4
"#,
        )
        .unwrap();

        let err = store.load_settings().unwrap_err();
        assert!(
            format!("{:#}", err).contains("positive"),
            "unexpected error: {:#}",
            err
        );
    }

    #[test]
    fn test_unparseable_settings_file_rejected() {
        let store = temp_store();
        fs::create_dir_all(store.settings_path().parent().unwrap()).unwrap();
        fs::write(store.settings_path(), "not toml at all [").unwrap();
        assert!(store.load_settings().is_err());
    }
}
