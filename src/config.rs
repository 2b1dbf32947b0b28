use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use directories::BaseDirs;
use serde::Deserialize;

const CONFIG_FILE_NAME: &str = "config.toml";
const APP_NAME: &str = "recipe-tidy";

pub const DEFAULT_DATABASE_PATH: &str = "recipes.db";
pub const DEFAULT_BOOK_ID_THRESHOLD: i64 = 55;

#[derive(Debug, Clone)]
pub struct Config {
    /// Path of the config file this was loaded from, if one existed.
    pub config_path: Option<PathBuf>,
    pub database_path: PathBuf,
    pub book_id_threshold: i64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            config_path: None,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            book_id_threshold: DEFAULT_BOOK_ID_THRESHOLD,
        }
    }
}

/// Raw shape of the TOML file before validation.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    database_path: Option<PathBuf>,
    book_id_threshold: Option<i64>,
}

/// Expand ~ to home directory in paths
fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = home::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}

fn config_root() -> Result<PathBuf> {
    let base = BaseDirs::new().context("unable to determine base directories")?;
    Ok(base.config_dir().join(APP_NAME))
}

/// Default config file location: `<config_dir>/recipe-tidy/config.toml`.
pub fn config_path() -> Result<PathBuf> {
    Ok(config_root()?.join(CONFIG_FILE_NAME))
}

/// Load configuration from `path`, or from the default location when `path`
/// is None. A missing file is not an error: the built-in defaults apply.
/// An explicitly given `--config` path that does not exist is an error.
pub fn load(path: Option<&Path>) -> Result<Config> {
    let (path, explicit) = match path {
        Some(p) => (p.to_path_buf(), true),
        None => (config_path()?, false),
    };

    if !path.exists() {
        if explicit {
            bail!("configuration file not found at {}", path.display());
        }
        return Ok(Config::default());
    }

    let raw = fs::read_to_string(&path)
        .with_context(|| format!("failed to read configuration file at {}", path.display()))?;
    parse(&raw, &path)
}

fn parse(raw: &str, path: &Path) -> Result<Config> {
    let value: toml::Value = toml::from_str(raw)
        .with_context(|| format!("failed to parse {} as TOML", path.display()))?;

    warn_unknown_keys(&value);

    let cfg_file: ConfigFile = value
        .try_into()
        .with_context(|| format!("failed to deserialize config from {}", path.display()))?;

    let database_path = cfg_file
        .database_path
        .map(|p| expand_tilde(&p))
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));

    Ok(Config {
        config_path: Some(path.to_path_buf()),
        database_path,
        book_id_threshold: cfg_file
            .book_id_threshold
            .unwrap_or(DEFAULT_BOOK_ID_THRESHOLD),
    })
}

fn warn_unknown_keys(value: &toml::Value) {
    let Some(table) = value.as_table() else {
        return;
    };

    let known = HashSet::from(["database_path", "book_id_threshold"]);
    for key in table.keys() {
        if !known.contains(key.as_str()) {
            log::warn!("unknown configuration key `{}`", key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_when_file_absent() {
        let config = Config::default();
        assert_eq!(config.database_path, PathBuf::from("recipes.db"));
        assert_eq!(config.book_id_threshold, 55);
        assert!(config.config_path.is_none());
    }

    #[test]
    fn test_parse_full_config() {
        let raw = "database_path = \"/srv/recipes.db\"\nbook_id_threshold = 40\n";
        let config = parse(raw, Path::new("config.toml")).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/srv/recipes.db"));
        assert_eq!(config.book_id_threshold, 40);
        assert_eq!(config.config_path, Some(PathBuf::from("config.toml")));
    }

    #[test]
    fn test_parse_partial_config_keeps_defaults() {
        let raw = "book_id_threshold = 10\n";
        let config = parse(raw, Path::new("config.toml")).unwrap();
        assert_eq!(config.database_path, PathBuf::from("recipes.db"));
        assert_eq!(config.book_id_threshold, 10);
    }

    #[test]
    fn test_parse_rejects_wrong_type() {
        let raw = "book_id_threshold = \"fifty-five\"\n";
        assert!(parse(raw, Path::new("config.toml")).is_err());
    }

    #[test]
    fn test_parse_rejects_invalid_toml() {
        assert!(parse("database_path = ", Path::new("config.toml")).is_err());
    }

    #[test]
    fn test_expand_tilde() {
        if let Some(home) = home::home_dir() {
            assert_eq!(
                expand_tilde(Path::new("~/recipes.db")),
                home.join("recipes.db")
            );
        }
        assert_eq!(
            expand_tilde(Path::new("/abs/recipes.db")),
            PathBuf::from("/abs/recipes.db")
        );
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(load(Some(&missing)).is_err());
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "database_path = \"db/cookbooks.db\"\n").unwrap();
        let config = load(Some(&path)).unwrap();
        assert_eq!(config.database_path, PathBuf::from("db/cookbooks.db"));
        assert_eq!(config.book_id_threshold, 55);
        assert_eq!(config.config_path.as_deref(), Some(path.as_path()));
    }
}
