use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const REFRESH_ENV: &str = "PROCESS_EXPLORER_REFRESH_MS";

/// Runtime tunables. Only the welcome flag below is ever written to disk.
#[derive(Debug, Clone)]
pub struct Config {
    pub window_width: i32,
    pub window_height: i32,
    pub refresh_interval_ms: u64,
    pub clock_interval_ms: u64,
    pub signal_refresh_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            window_width: 1100,
            window_height: 700,
            refresh_interval_ms: 3000,
            clock_interval_ms: 1000,
            signal_refresh_delay_ms: 500,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        Self::from_override(std::env::var(REFRESH_ENV).ok().as_deref())
    }

    fn from_override(refresh_ms: Option<&str>) -> Self {
        let mut config = Config::default();
        match refresh_ms.map(|v| v.trim().parse::<u64>()) {
            Some(Ok(ms)) if ms > 0 => config.refresh_interval_ms = ms,
            Some(_) => log::warn!("Ignoring invalid {}", REFRESH_ENV),
            None => {}
        }
        config
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_millis(self.refresh_interval_ms)
    }

    pub fn clock_interval(&self) -> Duration {
        Duration::from_millis(self.clock_interval_ms)
    }

    pub fn signal_refresh_delay(&self) -> Duration {
        Duration::from_millis(self.signal_refresh_delay_ms)
    }
}

/// Persisted once the welcome dialog has been dismissed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WelcomeSettings {
    #[serde(default)]
    pub welcome_shown: bool,
}

impl WelcomeSettings {
    /// Missing or unreadable files yield the defaults.
    pub fn load() -> Self {
        match welcome_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    pub fn load_from(path: &Path) -> Self {
        match Self::read(path) {
            Ok(settings) => settings,
            Err(e) => {
                if path.exists() {
                    log::warn!("{:#}", e);
                }
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self> {
        let data = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&data).with_context(|| format!("Malformed {}", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        let path = welcome_path().ok_or_else(|| anyhow!("No config or home directory to save into"))?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let data = serde_json::to_string_pretty(self)?;
        fs::write(path, data).with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    pub fn mark_shown(&mut self) -> Result<()> {
        self.welcome_shown = true;
        self.save()
    }
}

fn welcome_path() -> Option<PathBuf> {
    welcome_path_in(dirs::config_dir(), dirs::home_dir())
}

/// Prefers the platform config dir, then `$HOME/.config`.
fn welcome_path_in(config_dir: Option<PathBuf>, home_dir: Option<PathBuf>) -> Option<PathBuf> {
    let base = config_dir.or_else(|| home_dir.map(|home| home.join(".config")))?;
    Some(base.join("process-explorer").join("welcome.json"))
}
