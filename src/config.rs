use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::{qlog_debug, Error, Result};

const CONFIG_FILE_NAME: &str = "quadro.toml";
const BOARD_FILE_NAME: &str = "board.json";

/// File name used for exports, matching the download name of the web board.
pub const EXPORT_FILE_NAME: &str = "board.json";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Overrides `~/.quadro` as the home of the store and log file.
    pub data_dir: Option<String>,
    /// Directory exports are written to. Defaults to the working directory.
    pub export_dir: Option<String>,
    /// Ask before deleting a task or column.
    #[serde(default = "default_confirm_delete")]
    pub confirm_delete: bool,
}

fn default_confirm_delete() -> bool {
    true
}

impl Default for Config {
    fn default() -> Self {
        Self {
            data_dir: None,
            export_dir: None,
            confirm_delete: default_confirm_delete(),
        }
    }
}

impl Config {
    /// The default home directory, `~/.quadro`.
    pub fn default_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".quadro"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::default_dir()?.join(CONFIG_FILE_NAME))
    }

    /// Loads `~/.quadro/quadro.toml`, falling back to defaults when absent.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        qlog_debug!("Config::load path={}", path.display());
        if !path.exists() {
            qlog_debug!("Config file not found, using defaults");
            return Ok(Self::default());
        }
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        qlog_debug!(
            "Config loaded: data_dir={:?}, export_dir={:?}, confirm_delete={}",
            config.data_dir,
            config.export_dir,
            config.confirm_delete
        );
        Ok(config)
    }

    /// Directory holding the board store and the log file.
    pub fn data_dir(&self) -> Result<PathBuf> {
        match &self.data_dir {
            Some(dir) => Ok(expand_tilde(dir)),
            None => Self::default_dir(),
        }
    }

    /// Path of the persisted board, the local-storage equivalent.
    pub fn board_path(&self) -> Result<PathBuf> {
        Ok(self.data_dir()?.join(BOARD_FILE_NAME))
    }

    /// Full path an export is written to.
    pub fn export_path(&self) -> Result<PathBuf> {
        let dir = match &self.export_dir {
            Some(dir) => expand_tilde(dir),
            None => std::env::current_dir()?,
        };
        Ok(dir.join(EXPORT_FILE_NAME))
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        let data_dir = self.data_dir()?;
        if !data_dir.exists() {
            qlog_debug!("Creating data directory: {}", data_dir.display());
            fs::create_dir_all(&data_dir)?;
        }
        Ok(())
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
