//! Layered configuration for the `track` binary.
//!
//! Values are resolved in increasing priority:
//! built-in defaults, `<config dir>/track/config.toml`, the file passed with
//! `--config`, then `TRACK_*` environment variables.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

/// Prefix for environment overrides, e.g. `TRACK_DEFAULT_CATEGORY`.
const ENV_PREFIX: &str = "TRACK_";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// SQLite file holding recorded sessions.
    pub database_path: PathBuf,

    /// Category used by `track start` when none is given.
    ///
    /// Unset (or empty) records new sessions as uncategorized.
    #[serde(default)]
    pub default_category: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("track.db"),
            default_category: Some("work".to_string()),
        }
    }
}

impl Config {
    /// Resolves the configuration, with `explicit` taking precedence over the
    /// per-user file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(explicit: Option<&Path>) -> Result<Self, figment::Error> {
        let files = dirs_config_path()
            .map(|dir| dir.join("config.toml"))
            .into_iter()
            .chain(explicit.map(Path::to_path_buf));

        files
            .fold(Figment::from(Serialized::defaults(Self::default())), |figment, file| {
                figment.merge(Toml::file(file))
            })
            .merge(Env::prefixed(ENV_PREFIX))
            .extract()
    }
}

/// `<config dir>/track`, e.g. `~/.config/track` on Linux.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("track"))
}

/// `<data dir>/track`, e.g. `~/.local/share/track` on Linux.
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("track"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use figment::Jail;

    /// Runs `f` with no inherited environment and per-user dirs inside the jail.
    fn isolated(f: impl FnOnce(&mut Jail) -> figment::error::Result<()>) {
        Jail::expect_with(|jail| {
            jail.clear_env();
            let root = jail.directory().to_path_buf();
            jail.set_env("XDG_CONFIG_HOME", root.join("config").display());
            jail.set_env("XDG_DATA_HOME", root.join("data").display());
            f(jail)
        });
    }

    #[test]
    fn test_defaults_use_data_dir() {
        isolated(|jail| {
            let config = Config::load_from(None)?;
            let expected = jail.directory().join("data/track/track.db");
            assert_eq!(config.database_path, expected);
            assert_eq!(config.default_category.as_deref(), Some("work"));
            Ok(())
        });
    }

    #[test]
    fn test_explicit_file_overrides_defaults() {
        isolated(|jail| {
            jail.create_file(
                "track.toml",
                r#"
                database_path = "/tmp/elsewhere.db"
                default_category = "study"
                "#,
            )?;

            let config = Config::load_from(Some(Path::new("track.toml")))?;
            assert_eq!(config.database_path, PathBuf::from("/tmp/elsewhere.db"));
            assert_eq!(config.default_category.as_deref(), Some("study"));
            Ok(())
        });
    }

    #[test]
    fn test_user_file_is_read_and_explicit_file_wins() {
        isolated(|jail| {
            std::fs::create_dir_all("config/track").map_err(|e| e.to_string())?;
            jail.create_file("config/track/config.toml", r#"default_category = "home""#)?;

            let config = Config::load_from(None)?;
            assert_eq!(config.default_category.as_deref(), Some("home"));

            jail.create_file("override.toml", r#"default_category = "study""#)?;
            let config = Config::load_from(Some(Path::new("override.toml")))?;
            assert_eq!(config.default_category.as_deref(), Some("study"));
            Ok(())
        });
    }

    #[test]
    fn test_environment_overrides_files() {
        isolated(|jail| {
            jail.create_file("track.toml", r#"default_category = "study""#)?;
            jail.set_env("TRACK_DEFAULT_CATEGORY", "errands");
            jail.set_env("TRACK_DATABASE_PATH", "/tmp/env.db");

            let config = Config::load_from(Some(Path::new("track.toml")))?;
            assert_eq!(config.default_category.as_deref(), Some("errands"));
            assert_eq!(config.database_path, PathBuf::from("/tmp/env.db"));
            Ok(())
        });
    }
}
