//! Configuration loading and discovery for `gifanim.toml`

use super::schema::GifanimConfig;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the file searched for by [`find_config`]
pub const CONFIG_FILE: &str = "gifanim.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse gifanim.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// One entry per violated rule
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// Find `gifanim.toml` by walking up from the current working directory.
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find `gifanim.toml` by walking up from `start`.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;
    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.is_file() {
            return Some(config_path);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from `path`, or from the discovered file.
///
/// Falls back to the defaults when no path is given and none is found. An
/// explicit path that does not exist is an error.
pub fn load_config(path: Option<&Path>) -> Result<GifanimConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => {
            log::debug!("loading config from {}", p.display());
            load_config_file(&p)
        }
        None => Ok(GifanimConfig::default()),
    }
}

fn load_config_file(path: &Path) -> Result<GifanimConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}

/// Parse and validate config text.
pub fn parse_config(contents: &str) -> Result<GifanimConfig, ConfigError> {
    let config: GifanimConfig = toml::from_str(contents)?;
    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quantize::Method;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_current_dir() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILE);
        fs::write(&config_path, "[encode]\nbits = 4\n").unwrap();

        assert_eq!(find_config_from(temp.path().to_path_buf()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_parent_dir() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join(CONFIG_FILE);
        fs::write(&config_path, "").unwrap();
        let subdir = temp.path().join("frames").join("walk");
        fs::create_dir_all(&subdir).unwrap();

        assert_eq!(find_config_from(subdir), Some(config_path));
    }

    #[test]
    fn test_directory_named_like_config_is_skipped() {
        let temp = TempDir::new().unwrap();
        fs::create_dir(temp.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(find_config_from(temp.path().to_path_buf()), None);
    }

    #[test]
    fn test_load_config_from_file() {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("custom.toml");
        fs::write(&config_path, "[encode]\nbits = 2\nmethod = \"fixed\"\n").unwrap();

        let config = load_config(Some(&config_path)).unwrap();
        assert_eq!(config.encode.bits, 2);
        assert_eq!(config.encode.method, Method::Fixed);
    }

    #[test]
    fn test_load_config_missing_explicit_file() {
        let temp = TempDir::new().unwrap();
        let result = load_config(Some(&temp.path().join("nonexistent.toml")));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_invalid_toml() {
        assert!(matches!(parse_config("this is not valid toml {{{"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_validation_error() {
        let result = parse_config("[encode]\nbits = 0\n\n[encode.neural]\nsample_factor = 99\n");
        match result {
            Err(ConfigError::Validation(errors)) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation error, got {:?}", other),
        }
    }
}
