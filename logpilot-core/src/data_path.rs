use std::env;
use std::path::{Path, PathBuf};

use crate::config::Config;

pub const MEMORY_PATH_ENV: &str = "LOGPILOT_MEMORY_PATH";
pub const MEMORY_FILE_NAME: &str = "incident_memory.json";

/// Get the global LogPilot data directory (~/.logpilot/data)
///
/// Falls back to the working directory when no home directory is known.
pub fn get_data_dir() -> PathBuf {
    dirs::home_dir()
        .map(|home| home.join(".logpilot").join("data"))
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Get the incident memory file path
///
/// Priority:
/// 1. LOGPILOT_MEMORY_PATH env var
/// 2. `[memory] path` from the config file
/// 3. ~/.logpilot/data/incident_memory.json
pub fn memory_path(config: &Config) -> PathBuf {
    if let Ok(path) = env::var(MEMORY_PATH_ENV) {
        if !path.trim().is_empty() {
            return PathBuf::from(path);
        }
    }
    if let Some(path) = &config.memory.path {
        return path.clone();
    }
    get_data_dir().join(MEMORY_FILE_NAME)
}

/// Ensure the directory holding `path` exists
pub async fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => tokio::fs::create_dir_all(parent).await,
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_path_precedence() {
        let mut config = Config::default();
        config.memory.path = Some(PathBuf::from("/from/config.json"));

        std::env::set_var(MEMORY_PATH_ENV, "/custom/path/memory.json");
        assert_eq!(memory_path(&config), PathBuf::from("/custom/path/memory.json"));
        std::env::remove_var(MEMORY_PATH_ENV);

        assert_eq!(memory_path(&config), PathBuf::from("/from/config.json"));
        assert!(memory_path(&Config::default()).ends_with(".logpilot/data/incident_memory.json")
            || dirs::home_dir().is_none());
    }

    #[tokio::test]
    async fn test_ensure_parent_dir() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join(MEMORY_FILE_NAME);
        ensure_parent_dir(&nested).await.unwrap();
        assert!(nested.parent().unwrap().is_dir());
        ensure_parent_dir(Path::new(MEMORY_FILE_NAME)).await.unwrap();
    }
}
