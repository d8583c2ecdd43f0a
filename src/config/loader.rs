//! Configuration loader with file resolution and environment override support.

use super::error::{ConfigError, ConfigResult};
use super::schema::Config;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable prefix for overrides
const ENV_PREFIX: &str = "SERTEST";

/// Config file name inside the platform config directory
const CONFIG_FILE_NAME: &str = "config.toml";

/// Config file name looked up in the current directory
const LOCAL_CONFIG_FILE_NAME: &str = "sertest.toml";

/// Environment variable for explicit config path
const CONFIG_PATH_ENV: &str = "SERTEST_CONFIG";

/// Configuration loader with resolution and override logic.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    /// Resolved config file path (if any)
    pub config_path: Option<PathBuf>,
    /// The loaded configuration
    pub config: Config,
}

impl ConfigLoader {
    /// Load configuration using standard resolution order.
    ///
    /// Resolution priority (highest to lowest):
    /// 1. `SERTEST_CONFIG` environment variable (explicit path)
    /// 2. `./sertest.toml` (current directory)
    /// 3. `<platform config dir>/sertest/config.toml`
    /// 4. Built-in defaults (no file required)
    ///
    /// Environment variables override file values, and the result is
    /// validated before it is returned.
    pub fn load() -> ConfigResult<Self> {
        let config_path = resolve_config_path();

        let config = match config_path {
            Some(ref path) => load_from_file(path)?,
            None => Config::default(),
        };

        Self::finish(config_path, config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref().to_path_buf();
        let config = load_from_file(&path)?;
        Self::finish(Some(path), config)
    }

    /// Built-in defaults with environment overrides, no file.
    pub fn with_defaults() -> ConfigResult<Self> {
        Self::finish(None, Config::default())
    }

    fn finish(config_path: Option<PathBuf>, mut config: Config) -> ConfigResult<Self> {
        apply_env_overrides(&mut config)?;
        config.validate()?;
        Ok(Self {
            config_path,
            config,
        })
    }

    /// Get the loaded configuration.
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Consume the loader and return the configuration.
    pub fn into_config(self) -> Config {
        self.config
    }
}

/// Resolve the configuration file path using standard locations.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(path);
        if path.exists() {
            return Some(path);
        }
    }

    let cwd_config = PathBuf::from(LOCAL_CONFIG_FILE_NAME);
    if cwd_config.exists() {
        return Some(cwd_config);
    }

    get_default_config_path().filter(|path| path.exists())
}

/// Get the platform config directory for sertest.
pub fn get_default_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "sertest").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the default config file path.
pub fn get_default_config_path() -> Option<PathBuf> {
    get_default_config_dir().map(|d| d.join(CONFIG_FILE_NAME))
}

/// Load configuration from a file.
fn load_from_file(path: &Path) -> ConfigResult<Config> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn env_var(key: &str) -> (String, Option<String>) {
    let var = format!("{ENV_PREFIX}_{key}");
    let value = std::env::var(&var).ok();
    (var, value)
}

fn parse_env<T: FromStr>(var: &str, value: &str, expected: &'static str) -> ConfigResult<T> {
    value.trim().parse().map_err(|_| ConfigError::EnvVar {
        var: var.to_string(),
        value: value.to_string(),
        expected,
    })
}

/// Apply environment variable overrides to the configuration.
///
/// Variables follow the pattern `SERTEST_<SECTION>_<KEY>`, e.g.
/// `SERTEST_SERIAL_BAUD=115200`.
fn apply_env_overrides(config: &mut Config) -> ConfigResult<()> {
    if let (_, Some(val)) = env_var("SERIAL_DEVICE") {
        config.serial.device = val;
    }
    if let (var, Some(val)) = env_var("SERIAL_BAUD") {
        config.serial.baud = parse_env(&var, &val, "baud rate")?;
    }

    if let (var, Some(val)) = env_var("RUN_POLL_TIMEOUT_MS") {
        config.run.poll_timeout_ms = parse_env(&var, &val, "timeout")?;
    }
    if let (var, Some(val)) = env_var("RUN_REPORT_INTERVAL") {
        config.run.report_interval = parse_env(&var, &val, "report interval")?;
    }

    if let (_, Some(val)) = env_var("LOGGING_LEVEL") {
        config.logging.level = val;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::io::Write;

    #[test]
    #[serial]
    fn test_default_loader() {
        let loader = ConfigLoader::with_defaults().unwrap();
        assert_eq!(loader.config().serial.baud, 9600);
        assert!(loader.config_path.is_none());
    }

    #[test]
    #[serial]
    fn test_env_override() {
        env::set_var("SERTEST_SERIAL_BAUD", "115200");
        env::set_var("SERTEST_SERIAL_DEVICE", "/dev/ttyS1");

        let loader = ConfigLoader::with_defaults().unwrap();
        assert_eq!(loader.config().serial.baud, 115200);
        assert_eq!(loader.config().serial.device, "/dev/ttyS1");

        env::remove_var("SERTEST_SERIAL_BAUD");
        env::remove_var("SERTEST_SERIAL_DEVICE");
    }

    #[test]
    #[serial]
    fn test_bad_env_value() {
        env::set_var("SERTEST_RUN_REPORT_INTERVAL", "often");

        let err = ConfigLoader::with_defaults().unwrap_err();
        assert!(matches!(err, ConfigError::EnvVar { ref var, .. } if var == "SERTEST_RUN_REPORT_INTERVAL"));

        env::remove_var("SERTEST_RUN_REPORT_INTERVAL");
    }

    #[test]
    #[serial]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[serial]\nbaud = 230400\n\n[run]\npoll_timeout_ms = 50").unwrap();

        let loader = ConfigLoader::load_from(file.path()).unwrap();
        assert_eq!(loader.config_path.as_deref(), Some(file.path()));
        assert_eq!(loader.config().serial.baud, 230400);
        assert_eq!(loader.config().run.poll_timeout_ms, 50);
    }

    #[test]
    #[serial]
    fn test_explicit_path_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[run]\nreport_interval = 10").unwrap();
        env::set_var(CONFIG_PATH_ENV, file.path());

        let loader = ConfigLoader::load().unwrap();
        assert_eq!(loader.config().run.report_interval, 10);

        env::remove_var(CONFIG_PATH_ENV);
    }

    #[test]
    #[serial]
    fn test_invalid_file_is_rejected() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[run]\nreport_interval = 0").unwrap();
        assert!(matches!(
            ConfigLoader::load_from(file.path()),
            Err(ConfigError::Invalid { .. })
        ));

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[serial\nbaud = ").unwrap();
        assert!(matches!(
            ConfigLoader::load_from(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = ConfigLoader::load_from("/nonexistent/sertest.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Read { .. }));
    }
}
