//! Server configuration.
//!
//! Two knobs: where column and metadata files live, and where the unix
//! socket sits. Both default to paths under the working directory and can
//! come from a JSON file named by `BASALT_CONFIG`.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{BasaltError, BasaltResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Directory holding metadata and per-column data files.
    pub data_dir: PathBuf,
    /// Unix-domain socket the server listens on.
    pub socket_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            data_dir: PathBuf::from("data"),
            socket_path: PathBuf::from("basalt.sock"),
        }
    }
}

impl ServerConfig {
    /// Read a config file.
    pub fn from_file(path: &Path) -> BasaltResult<Self> {
        let text = fs::read_to_string(path)?;
        serde_json::from_str(&text).map_err(|e| BasaltError::Serialization(e.to_string()))
    }

    /// The file named by `BASALT_CONFIG`, or the defaults without it.
    pub fn from_env_or_default() -> BasaltResult<Self> {
        match std::env::var_os("BASALT_CONFIG") {
            Some(path) => Self::from_file(Path::new(&path)),
            None => Ok(ServerConfig::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.socket_path, PathBuf::from("basalt.sock"));
    }

    #[test]
    fn from_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("basalt.json");
        let config = ServerConfig {
            data_dir: dir.path().join("store"),
            socket_path: dir.path().join("db.sock"),
        };
        fs::write(&path, serde_json::to_string(&config).unwrap()).unwrap();

        let loaded = ServerConfig::from_file(&path).unwrap();
        assert_eq!(loaded.data_dir, config.data_dir);
        assert_eq!(loaded.socket_path, config.socket_path);
    }

    #[test]
    fn malformed_file_is_a_serialization_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("basalt.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            ServerConfig::from_file(&path).unwrap_err(),
            BasaltError::Serialization(_)
        ));
    }
}
