use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use crate::bingo_machine::DEFAULT_MAX_NUMBER;

pub const DEFAULT_CONFIG_FILE: &str = "bingo_config.json";
pub const CONFIG_ENV: &str = "BINGO_CONFIG";

// The JSON file looks like:
// {
//    "max_number": 75,
//    "store_path": "/path/to/session.json",
//    "sound_dir": "sounds",
//    "sounds": ["drumroll_and_rollend.mp3", "tinpani_and_don.mp3", "papa.mp3"],
//    "player": "mpv"
// }
// Every field is optional.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub max_number: u32,
    pub store_path: Option<PathBuf>,
    pub sound_dir: PathBuf,
    pub sounds: Vec<String>,
    pub player: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_number: DEFAULT_MAX_NUMBER,
            store_path: None,
            sound_dir: PathBuf::from("sounds"),
            sounds: vec![
                "drumroll_and_rollend.mp3".to_string(),
                "tinpani_and_don.mp3".to_string(),
                "papa.mp3".to_string(),
            ],
            player: None,
        }
    }
}

impl Config {
    /// Resolves the config file (`--config`, then `$BINGO_CONFIG`, then
    /// `bingo_config.json`) and loads it. No file at all means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return read_config_from_json(path);
        }
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return read_config_from_json(Path::new(&path));
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        if fallback.exists() {
            return read_config_from_json(fallback);
        }
        tracing::debug!("no config file found, using defaults");
        Ok(Self::default())
    }

    /// Store location: the configured path, or the per-user data directory.
    pub fn resolved_store_path(&self) -> PathBuf {
        if let Some(path) = &self.store_path {
            return path.clone();
        }
        dirs_next::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("settai-bingo")
            .join("session.json")
    }
}

pub fn read_config_from_json(path: &Path) -> Result<Config> {
    let file = File::open(path).with_context(|| format!("failed to open config {}", path.display()))?;
    let reader = BufReader::new(file);
    let config: Config = serde_json::from_reader(reader)
        .with_context(|| format!("failed to parse config {}", path.display()))?;
    if config.max_number == 0 {
        anyhow::bail!("max_number in {} must be at least 1", path.display());
    }
    tracing::info!(path = %path.display(), max_number = config.max_number, "loaded config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_partial_config_keeps_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_number": 90, "player": "mpv" }}"#).unwrap();

        let config = read_config_from_json(file.path()).expect("should read file");
        assert_eq!(config.max_number, 90);
        assert_eq!(config.player.as_deref(), Some("mpv"));
        assert_eq!(config.sounds.len(), 3);
        assert_eq!(config.sound_dir, PathBuf::from("sounds"));
    }

    #[test]
    fn test_zero_max_number_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{ "max_number": 0 }}"#).unwrap();
        assert!(read_config_from_json(file.path()).is_err());
    }

    #[test]
    fn test_explicit_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Config::load(Some(&dir.path().join("nope.json"))).is_err());
    }

    #[test]
    fn test_configured_store_path_wins() {
        let config = Config { store_path: Some(PathBuf::from("/tmp/s.json")), ..Config::default() };
        assert_eq!(config.resolved_store_path(), PathBuf::from("/tmp/s.json"));
        assert!(Config::default().resolved_store_path().ends_with("settai-bingo/session.json"));
    }
}
