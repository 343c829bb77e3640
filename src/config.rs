use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};

pub const APP_DIR: &str = "bw-tui";
pub const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "bw-tui.log";
pub const SESSION_ENV: &str = "BW_SESSION";

fn default_binary() -> String {
    "bw".to_string()
}

fn default_flash_seconds() -> u8 {
    5
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Vault CLI executable, looked up on `$PATH` unless absolute.
    #[serde(default = "default_binary")]
    pub binary: String,
    #[serde(default = "default_flash_seconds")]
    pub flash_seconds: u8,
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            flash_seconds: default_flash_seconds(),
            log_file: None,
        }
    }
}

pub fn config_path() -> Result<PathBuf> {
    let base = dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(base.join(APP_DIR).join(CONFIG_FILE))
}

impl Config {
    /// Reads the user config file; a missing file means defaults.
    pub fn load() -> Result<Self> {
        match config_path() {
            Ok(path) => Self::load_from(&path),
            Err(_) => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg: Config = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg)
    }

    /// Where logs go: the configured file, else the per-user cache dir.
    pub fn log_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.log_file {
            return Some(path.clone());
        }
        dirs::cache_dir().map(|dir| dir.join(APP_DIR).join(LOG_FILE))
    }

    /// Item view flash lifetime in one-second ticks, never zero.
    pub fn flash_ticks(&self) -> u8 {
        self.flash_seconds.max(1)
    }
}

/// Session token exported by a previous `bw unlock`, if any.
pub fn session_from_env() -> Option<String> {
    std::env::var(SESSION_ENV)
        .ok()
        .filter(|token| !token.trim().is_empty())
}

pub fn ensure_parent_dir(path: &Path) -> Result<()> {
    let parent = path
        .parent()
        .ok_or_else(|| anyhow!("Invalid path {}", path.display()))?;
    if !parent.as_os_str().is_empty() && !parent.exists() {
        fs::create_dir_all(parent)?;
        restrict_dir(parent)?;
    }
    Ok(())
}

fn restrict_dir(path: &Path) -> Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o700))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.binary, "bw");
        assert_eq!(cfg.flash_ticks(), 5);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"binary": "/opt/bw/bw", "log_file": "/tmp/x.log"}}"#).unwrap();
        let cfg = Config::load_from(file.path()).unwrap();
        assert_eq!(cfg.binary, "/opt/bw/bw");
        assert_eq!(cfg.flash_seconds, 5);
        assert_eq!(cfg.log_path(), Some(PathBuf::from("/tmp/x.log")));
    }

    #[test]
    fn bad_json_names_the_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        let err = Config::load_from(file.path()).unwrap_err();
        assert!(err.to_string().contains("parsing config"));
    }

    #[test]
    fn zero_flash_is_clamped() {
        let cfg = Config {
            flash_seconds: 0,
            ..Config::default()
        };
        assert_eq!(cfg.flash_ticks(), 1);
    }

    #[test]
    fn parent_dir_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let log = dir.path().join("nested").join(LOG_FILE);
        ensure_parent_dir(&log).unwrap();
        assert!(log.parent().unwrap().is_dir());
    }
}
