use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use crate::errors::{CoreError, Result};
use crate::utils::{ensure_dir, resolve_base_dir};

const CONFIG_FILE: &str = "config.json";
const TMP_SUFFIX: &str = "tmp";

/// Runtime settings for the scheduler host.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
    #[serde(default = "Config::default_ledger_name")]
    pub ledger_name: String,
    #[serde(default = "Config::default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "Config::default_backup_retention")]
    pub backup_retention: usize,
}

impl Config {
    fn default_ledger_name() -> String {
        "main".into()
    }

    fn default_poll_interval_secs() -> u64 {
        60
    }

    fn default_backup_retention() -> usize {
        5
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            ledger_name: Self::default_ledger_name(),
            poll_interval_secs: Self::default_poll_interval_secs(),
            backup_retention: Self::default_backup_retention(),
        }
    }
}

/// Loads and saves the config file under the resolved base directory.
pub struct ConfigManager {
    path: PathBuf,
}

impl ConfigManager {
    pub fn new() -> Result<Self> {
        Self::with_base_dir(resolve_base_dir(None))
    }

    pub fn with_base_dir(base: PathBuf) -> Result<Self> {
        ensure_dir(&base)?;
        Ok(Self {
            path: base.join(CONFIG_FILE),
        })
    }

    pub fn load(&self) -> Result<Config> {
        if self.path.exists() {
            let data = fs::read_to_string(&self.path)?;
            serde_json::from_str(&data).map_err(|err| CoreError::Config(err.to_string()))
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self, config: &Config) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            ensure_dir(parent)?;
        }
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| CoreError::Config(err.to_string()))?;
        let tmp = tmp_path(&self.path);
        write_atomic(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut tmp = path.to_path_buf();
    let ext = match path.extension().and_then(|ext| ext.to_str()) {
        Some(existing) => format!("{}.{}", existing, TMP_SUFFIX),
        None => TMP_SUFFIX.to_string(),
    };
    tmp.set_extension(ext);
    tmp
}

fn write_atomic(path: &Path, data: &str) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(data.as_bytes())?;
    file.flush()?;
    Ok(())
}
