use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::DEFAULT_MINUTES;
use crate::sound::{SoundPool, DEFAULT_POOL_SIZE};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub default_minutes: u32,
    pub tick_interval_ms: u64,
    pub sounds_dir: PathBuf,
    pub sound_pool_size: usize,
    pub sound_enabled: bool,
    pub notifications: bool,
    pub alert_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_minutes: DEFAULT_MINUTES,
            tick_interval_ms: 250,
            sounds_dir: PathBuf::from("assets/sounds"),
            sound_pool_size: DEFAULT_POOL_SIZE,
            sound_enabled: true,
            notifications: true,
            alert_timeout_secs: 10,
        }
    }
}

impl Config {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn alert_timeout(&self) -> Duration {
        Duration::from_secs(self.alert_timeout_secs)
    }

    pub fn sound_pool(&self) -> SoundPool {
        SoundPool::new(&self.sounds_dir, self.sound_pool_size)
    }

    /// A zero default would make `reset` produce a finished-looking session
    pub fn default_minutes(&self) -> u32 {
        self.default_minutes.max(1)
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "catodoro") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("catodoro_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        match fs::read(&self.path) {
            Ok(bytes) => match serde_json::from_slice::<Config>(&bytes) {
                Ok(cfg) => cfg,
                Err(e) => {
                    tracing::warn!(error = %e, path = %self.path.display(), "invalid config, using defaults");
                    Config::default()
                }
            },
            Err(_) => Config::default(),
        }
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
