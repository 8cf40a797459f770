//! Configuration management for phrasedesk
//!
//! Handles the ~/.phrasedesk/ directory structure and config.toml

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use crate::filter::{SearchMode, StopWordMode};
use crate::history::DEFAULT_CAPACITY;
use crate::processor::DEFAULT_MAX_WORDS;
use crate::workspace::Workspace;

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Undo snapshots kept per list
    pub history_capacity: usize,
    /// Word limit used by `drop-long` when none is given
    pub max_words: usize,
    pub stop_word_mode: StopWordMode,
    pub search_mode: SearchMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            history_capacity: DEFAULT_CAPACITY,
            max_words: DEFAULT_MAX_WORDS,
            stop_word_mode: StopWordMode::default(),
            search_mode: SearchMode::default(),
        }
    }
}

impl Config {
    /// Empty workspace carrying these settings
    pub fn new_workspace(&self) -> Workspace {
        Workspace::new(self.history_capacity, self.stop_word_mode)
    }
}

/// Returns the path to the phrasedesk home directory (~/.phrasedesk),
/// or `$PHRASEDESK_HOME` when set
pub fn phrasedesk_home() -> Result<PathBuf> {
    if let Ok(override_path) = std::env::var("PHRASEDESK_HOME") {
        return Ok(PathBuf::from(override_path));
    }
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".phrasedesk"))
}

/// Returns paths to all phrasedesk directories
pub struct PhrasedeskPaths {
    pub root: PathBuf,
    pub config: PathBuf,
    pub sessions: PathBuf,
    pub exports: PathBuf,
    pub default_session: PathBuf,
}

impl PhrasedeskPaths {
    pub fn new() -> Result<Self> {
        Ok(Self::at(phrasedesk_home()?))
    }

    pub fn at(root: PathBuf) -> Self {
        Self {
            config: root.join("config.toml"),
            sessions: root.join("sessions"),
            exports: root.join("exports"),
            default_session: root.join("sessions/default.json"),
            root,
        }
    }

    /// Create all directories if they don't exist
    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.root).context("Failed to create phrasedesk root")?;
        fs::create_dir_all(&self.sessions).context("Failed to create sessions directory")?;
        fs::create_dir_all(&self.exports).context("Failed to create exports directory")?;
        Ok(())
    }

    /// Check if phrasedesk has been initialized
    pub fn is_initialized(&self) -> bool {
        self.config.exists()
    }

    /// Load configuration from disk, defaults when there is no file
    pub fn load_config(&self) -> Result<Config> {
        if !self.config.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&self.config).context("Failed to read config.toml")?;
        toml::from_str(&content).context("Failed to parse config.toml")
    }

    pub fn save_config(&self, config: &Config) -> Result<()> {
        let content = toml::to_string_pretty(config).context("Failed to serialize config")?;
        fs::write(&self.config, content).context("Failed to write config.toml")?;
        Ok(())
    }
}

/// Load configuration from the phrasedesk home
pub fn load_config() -> Result<Config> {
    PhrasedeskPaths::new()?.load_config()
}

/// Save configuration to the phrasedesk home
pub fn save_config(config: &Config) -> Result<()> {
    PhrasedeskPaths::new()?.save_config(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PhrasedeskPaths::at(dir.path().to_path_buf());
        assert!(!paths.is_initialized());
        assert_eq!(paths.load_config().unwrap(), Config::default());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PhrasedeskPaths::at(dir.path().to_path_buf());
        fs::write(&paths.config, "stop_word_mode = \"substring\"\n").unwrap();

        let config = paths.load_config().unwrap();
        assert_eq!(config.stop_word_mode, StopWordMode::Substring);
        assert_eq!(config.history_capacity, 50);
        assert_eq!(config.max_words, 7);
        assert_eq!(config.search_mode, SearchMode::Substring);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let paths = PhrasedeskPaths::at(dir.path().to_path_buf());
        paths.ensure_dirs().unwrap();
        let config = Config {
            history_capacity: 10,
            search_mode: SearchMode::WholeWord,
            ..Config::default()
        };
        paths.save_config(&config).unwrap();
        assert_eq!(paths.load_config().unwrap(), config);
        assert!(paths.sessions.is_dir());
    }
}
