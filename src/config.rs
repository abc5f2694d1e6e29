use serde::Deserialize;
use std::path::PathBuf;
use std::{num::NonZeroUsize, path::Path};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading {path:?}")]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to parse {path:?} as TOML")]
    ParseToml { path: PathBuf, source: toml::de::Error },
    #[error("invalid configuration: {message}")]
    Invalid { message: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    pub storage: StorageConfig,
}

/// Storage settings. Unlike a multi-file storage manager this engine keeps
/// everything in one backing file, so `db_path` names that file directly
/// rather than a directory.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    pub db_path: PathBuf,
    pub logs_dir: PathBuf,
    pub buffer_pages: NonZeroUsize,
}

impl EngineConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();
        let text = std::fs::read_to_string(&path).map_err(|e| ConfigError::Io { path: path.clone(), source: e })?;

        let cfg: EngineConfig =
            toml::from_str(&text).map_err(|e| ConfigError::ParseToml { path: path.clone(), source: e })?;

        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.db_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid { message: "storage.db_path must not be empty".to_string() });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_a_well_formed_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marqdb.toml");
        std::fs::write(
            &path,
            r#"
            [storage]
            db_path = "data/marqdb.db"
            logs_dir = "logs"
            buffer_pages = 64
            "#,
        )
        .unwrap();

        let cfg = EngineConfig::load_from_file(&path).unwrap();
        assert_eq!(cfg.storage.buffer_pages.get(), 64);
    }

    #[test]
    fn rejects_an_empty_db_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marqdb.toml");
        std::fs::write(
            &path,
            r#"
            [storage]
            db_path = ""
            logs_dir = "logs"
            buffer_pages = 64
            "#,
        )
        .unwrap();

        assert!(matches!(EngineConfig::load_from_file(&path), Err(ConfigError::Invalid { .. })));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        assert!(matches!(EngineConfig::load_from_file("/nonexistent/marqdb.toml"), Err(ConfigError::Io { .. })));
    }
}
