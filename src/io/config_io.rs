use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::model::config::Config;

/// Environment variable that overrides the data directory
pub const DATA_DIR_ENV: &str = "TASKTREE_DATA_DIR";

/// Error type for configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    ReadError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not parse {path}: {source}")]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("no data directory available on this platform; pass --data-dir")]
    NoDataDir,
}

/// Default config location: `<config dir>/tasktree/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("tasktree").join("config.toml"))
}

/// Read the config file at `path`. A missing file yields the defaults.
pub fn read_config(path: &Path) -> Result<Config, ConfigError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Config::default());
        }
        Err(source) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source,
            });
        }
    };
    toml::from_str(&text).map_err(|source| ConfigError::ParseError {
        path: path.to_path_buf(),
        source,
    })
}

/// Read the config from `explicit`, or the default location if none is given.
pub fn load_config(explicit: Option<&Path>) -> Result<Config, ConfigError> {
    match explicit {
        Some(path) => read_config(path),
        None => match default_config_path() {
            Some(path) => read_config(&path),
            None => Ok(Config::default()),
        },
    }
}

/// Pick the data directory: flag, then environment, then config, then the
/// platform data directory.
pub fn resolve_data_dir(
    flag: Option<&Path>,
    env: Option<PathBuf>,
    config: &Config,
) -> Result<PathBuf, ConfigError> {
    if let Some(dir) = flag {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env.filter(|d| !d.as_os_str().is_empty()) {
        return Ok(dir);
    }
    if let Some(dir) = &config.storage.data_dir {
        return Ok(dir.clone());
    }
    dirs::data_dir()
        .map(|dir| dir.join("tasktree"))
        .ok_or(ConfigError::NoDataDir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = read_config(&tmp.path().join("nope.toml")).unwrap();
        assert_eq!(config.tree.default_categories, vec!["Personal", "Work"]);
        assert!(config.storage.data_dir.is_none());
        assert!(config.log.filter.is_none());
    }

    #[test]
    fn test_read_full_config() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(
            &path,
            r#"[storage]
data_dir = "/tmp/tasks"

[tree]
default_categories = ["Inbox", "Someday", "Done"]

[log]
filter = "tasktree=debug"
"#,
        )
        .unwrap();

        let config = read_config(&path).unwrap();
        assert_eq!(config.storage.data_dir, Some(PathBuf::from("/tmp/tasks")));
        assert_eq!(
            config.tree.default_categories,
            vec!["Inbox", "Someday", "Done"]
        );
        assert_eq!(config.log.filter.as_deref(), Some("tasktree=debug"));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[log]\nfilter = \"info\"\n").unwrap();
        let config = read_config(&path).unwrap();
        assert_eq!(config.tree.default_categories, vec!["Personal", "Work"]);
    }

    #[test]
    fn test_malformed_config_is_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "[tree\ndefault_categories = 3").unwrap();
        assert!(matches!(
            read_config(&path),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_data_dir_precedence() {
        let mut config = Config::default();
        config.storage.data_dir = Some(PathBuf::from("/from/config"));

        let flag = PathBuf::from("/from/flag");
        assert_eq!(
            resolve_data_dir(Some(&flag), Some("/from/env".into()), &config).unwrap(),
            flag
        );
        assert_eq!(
            resolve_data_dir(None, Some("/from/env".into()), &config).unwrap(),
            PathBuf::from("/from/env")
        );
        assert_eq!(
            resolve_data_dir(None, Some(PathBuf::new()), &config).unwrap(),
            PathBuf::from("/from/config")
        );
        assert_eq!(
            resolve_data_dir(None, None, &config).unwrap(),
            PathBuf::from("/from/config")
        );
    }
}
