use crate::document::logo::DEFAULT_LOGO_URL;
use crate::model::{OptionLists, SchoolInfo};
use crate::store::DEFAULT_STORE_FILE;
use log::info;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "assets/config.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("gagal membaca konfigurasi {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("konfigurasi {path} tidak sah: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

fn default_logo() -> Option<String> {
    Some(DEFAULT_LOGO_URL.to_string())
}

fn default_store() -> PathBuf {
    PathBuf::from(DEFAULT_STORE_FILE)
}

/// School details, form options and file locations. Every field is optional
/// in the file; `"logo": null` prints documents without a logo.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub school: SchoolInfo,
    #[serde(default)]
    pub options: OptionLists,
    #[serde(default = "default_logo")]
    pub logo: Option<String>,
    #[serde(default = "default_store")]
    pub store: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            school: SchoolInfo::default(),
            options: OptionLists::default(),
            logo: default_logo(),
            store: default_store(),
        }
    }
}

impl Config {
    /// Reads `path`, falling back to the built-in defaults when it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!("{} tiada, tetapan lalai digunakan", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(&dir.path().join("tiada.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.store, PathBuf::from("mtij_records_v3.json"));
        assert_eq!(config.logo.as_deref(), Some(DEFAULT_LOGO_URL));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(
            &path,
            r#"{"options": {"classes": ["5 Al-Biruni"]}, "logo": null, "store": "data/kes.json"}"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.options.classes, vec!["5 Al-Biruni"]);
        assert_eq!(config.options.actions, OptionLists::default().actions);
        assert_eq!(config.logo, None);
        assert_eq!(config.store, PathBuf::from("data/kes.json"));
        assert_eq!(config.school, SchoolInfo::default());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ bukan json").unwrap();
        assert!(matches!(Config::load(&path), Err(ConfigError::Parse { .. })));
    }
}
