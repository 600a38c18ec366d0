pub mod init;
mod schema;

pub use schema::{default_risk_factors, default_safety_factors, ColumnConfig, Config, DataConfig};

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Get the config directory path (~/.config/district-risk/)
pub fn get_config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("district-risk"))
}

/// Get the default config file path (~/.config/district-risk/config.yaml)
pub fn get_config_path() -> Result<PathBuf> {
    Ok(get_config_dir()?.join("config.yaml"))
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses the default path
///   (~/.config/district-risk/config.yaml), falling back to built-in
///   defaults when that file does not exist.
///
/// Relative data paths are resolved against the config file's directory, or
/// against the working directory when built-in defaults are used.
///
/// # Errors
///
/// Returns an error if:
/// - An explicitly given config file does not exist
/// - The config file cannot be read
/// - The YAML cannot be parsed
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let explicit = path.is_some();
    let config_path = match path {
        Some(p) => p,
        None => get_config_path()?,
    };

    if !config_path.exists() {
        if explicit {
            anyhow::bail!("Config file not found at {}", config_path.display());
        }
        log::debug!(
            "No config at {}, using built-in defaults",
            config_path.display()
        );
        let mut config = Config::default();
        let cwd = std::env::current_dir().context("Failed to read current directory")?;
        config.resolve_paths(&cwd);
        return Ok(config);
    }

    let mut config = parse_config_file(&config_path)?;
    let base = match config_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to read current directory")?,
    };
    config.resolve_paths(&base);
    log::debug!("Loaded config from {}", config_path.display());
    Ok(config)
}

fn parse_config_file(config_path: &Path) -> Result<Config> {
    let config_content = fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    // An empty file deserializes as YAML null; treat it as "all defaults".
    if config_content.trim().is_empty() {
        return Ok(Config::default());
    }

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_explicit_missing_path_is_error() {
        let err = load_config(Some(PathBuf::from("/definitely/not/here.yaml"))).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_relative_paths_follow_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        let mut file = fs::File::create(&path).unwrap();
        writeln!(file, "data:\n  trend_csv: trend/q.csv\npattern_size: 4").unwrap();

        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.data.trend_csv, dir.path().join("trend/q.csv"));
        assert_eq!(config.data.districts_csv, dir.path().join("daegu_crime_data.csv"));
        assert_eq!(config.pattern_size, 4);
    }

    #[test]
    fn test_empty_file_is_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "").unwrap();
        let config = load_config(Some(path)).unwrap();
        assert_eq!(config.risk_factors, default_risk_factors());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        fs::write(&path, "pattern_size: [oops\n").unwrap();
        let err = load_config(Some(path)).unwrap_err();
        assert!(err.to_string().contains("invalid YAML"));
    }
}
