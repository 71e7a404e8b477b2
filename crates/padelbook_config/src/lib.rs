use config::{Config, ConfigError, Environment, File};
use once_cell::sync::OnceCell;
use std::env;
use std::path::{Path, PathBuf};
use tracing::debug;

pub mod models;
pub use models::*;

/// Prefix of environment variables overriding configuration values,
/// e.g. `PADELBOOK__DATABASE__URL`.
pub const ENV_PREFIX: &str = "PADELBOOK";

/// Loads the application configuration.
///
/// Sources, later ones winning: `config/default.*`, `config/{RUN_ENV}.*`,
/// then `PADELBOOK__*` environment variables. `CONFIG_DIR` points at a
/// different configuration directory.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    ensure_dotenv_loaded();

    let config_dir = env::var("CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("config"));
    let run_env = env::var("RUN_ENV").unwrap_or_else(|_| "debug".to_string());

    load_config_from(&config_dir, &run_env)
}

/// Loads the configuration from an explicit directory and run environment.
pub fn load_config_from(config_dir: &Path, run_env: &str) -> Result<AppConfig, ConfigError> {
    let default_path = config_dir.join("default");
    let env_path = config_dir.join(run_env);

    debug!("config: default_path: {}", default_path.display());
    debug!("config: env_path: {}", env_path.display());

    let builder = Config::builder()
        .add_source(File::from(default_path).required(false))
        .add_source(File::from(env_path).required(false))
        .add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

    builder.build()?.try_deserialize()
}

static INIT_DOTENV: OnceCell<()> = OnceCell::new();

/// Ensures that the dotenv file is loaded into the process environment once.
///
/// `DOTENV_OVERRIDE` selects another file than `.env`. Returns the path that was used.
pub fn ensure_dotenv_loaded() -> String {
    let dotenv_path = env::var("DOTENV_OVERRIDE").unwrap_or_else(|_| ".env".to_string());

    INIT_DOTENV.get_or_init(|| {
        dotenv::from_filename(&dotenv_path).ok();
    });

    dotenv_path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_defaults_without_files() {
        let dir = env::temp_dir().join(format!("padelbook-config-empty-{}", std::process::id()));
        let config = load_config_from(&dir, "debug").expect("defaults should deserialize");

        assert_eq!(config.booking.days_before, 3);
        assert_eq!(config.booking.opening_hour, 8);
        assert_eq!(config.booking.courts.len(), 3);
        assert!(!config.use_availability);
        assert!(config.database.is_none());
    }

    #[test]
    fn test_run_env_file_overrides_default() {
        let dir = env::temp_dir().join(format!("padelbook-config-files-{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("default.toml"),
            r#"
                [server]
                host = "0.0.0.0"
                port = 9000

                [database]
                url = "sqlite::memory:"

                [booking]
                time_zone = "Europe/Paris"
                external_booking_url = "https://club.example.com"
            "#,
        )
        .unwrap();
        fs::write(
            dir.join("test.toml"),
            r#"
                [server]
                host = "0.0.0.0"
                port = 9100
            "#,
        )
        .unwrap();

        let config = load_config_from(&dir, "test").unwrap();
        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.unwrap().url, "sqlite::memory:");
        assert_eq!(
            config.booking.external_booking_url.as_deref(),
            Some("https://club.example.com")
        );

        fs::remove_dir_all(&dir).ok();
    }
}
