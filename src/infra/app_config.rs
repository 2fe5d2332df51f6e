//! Persistent application settings stored as TOML in the data directory.

use serde::Deserialize;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Overrides the database location when no `--db` flag or env var is given.
    pub db_path: Option<PathBuf>,
    pub speech: SpeechConfig,
}

/// Spoken announcement played after a customer is added.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SpeechConfig {
    pub enabled: bool,
    /// Text-to-speech program, looked up on `PATH` unless it is a path.
    pub command: String,
    pub args: Vec<String>,
    /// Spoken text; `{name}` is replaced with the customer's name.
    pub announcement: String,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            command: "espeak-ng".to_string(),
            args: vec!["-v".to_string(), "si".to_string()],
            announcement: "{name} පැමිණෙන්න.".to_string(),
        }
    }
}

pub fn load_config() -> AppConfig {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> AppConfig {
    let Ok(contents) = std::fs::read_to_string(path) else {
        return AppConfig::default();
    };
    toml::from_str(&contents).unwrap_or_else(|err| {
        log::warn!("Ignoring invalid config at {}: {}", path.display(), err);
        AppConfig::default()
    })
}

pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("CUSTOMER_DESK_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    app_data_dir().join("config.toml")
}

/// Database location: explicit flag, then `$CUSTOMER_DESK_DB_PATH`, then the
/// config file, then `<data dir>/customers.db`.
pub fn resolve_db_path(flag: Option<PathBuf>, config: &AppConfig) -> PathBuf {
    if let Some(path) = flag {
        return path;
    }
    if let Ok(path) = std::env::var("CUSTOMER_DESK_DB_PATH") {
        return PathBuf::from(path);
    }
    config
        .db_path
        .clone()
        .unwrap_or_else(|| app_data_dir().join("customers.db"))
}

/// Directory holding `config.toml` and, unless overridden, `customers.db`.
pub fn app_data_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os("CUSTOMER_DESK_DATA_HOME") {
        return PathBuf::from(dir);
    }
    platform_data_dir(home::home_dir(), |key| std::env::var_os(key))
        .or_else(|| std::env::current_dir().ok().map(|cwd| cwd.join(".customer-desk")))
        .unwrap_or_else(|| PathBuf::from(".customer-desk"))
}

// Per-user data location for the running OS. `None` when neither the home
// directory nor the platform variable is known.
fn platform_data_dir(
    home: Option<PathBuf>,
    var: impl Fn(&str) -> Option<OsString>,
) -> Option<PathBuf> {
    let set = |key: &str| var(key).filter(|value| !value.is_empty()).map(PathBuf::from);

    if cfg!(target_os = "macos") {
        home.map(|home| home.join("Library/Application Support/CustomerDesk"))
    } else if cfg!(windows) {
        set("APPDATA").map(|dir| dir.join("CustomerDesk"))
    } else {
        set("XDG_DATA_HOME")
            .or_else(|| home.map(|home| home.join(".local/share")))
            .map(|root| root.join("customer-desk"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("absent.toml"));
        assert_eq!(config, AppConfig::default());
        assert!(config.speech.enabled);
        assert!(config.speech.announcement.contains("{name}"));
    }

    #[test]
    fn test_partial_config_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "db_path = \"/srv/desk/customers.db\"\n\n[speech]\nenabled = false\n",
        )
        .unwrap();

        let config = load_config_from(&path);
        assert_eq!(config.db_path, Some(PathBuf::from("/srv/desk/customers.db")));
        assert!(!config.speech.enabled);
        assert_eq!(config.speech.command, "espeak-ng");
    }

    #[test]
    fn test_invalid_config_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "speech = [not toml").unwrap();
        assert_eq!(load_config_from(&path), AppConfig::default());
    }

    #[test]
    fn test_db_path_flag_wins() {
        let config = AppConfig {
            db_path: Some(PathBuf::from("from-config.db")),
            ..AppConfig::default()
        };
        assert_eq!(
            resolve_db_path(Some(PathBuf::from("from-flag.db")), &config),
            PathBuf::from("from-flag.db")
        );
    }

    #[cfg(all(unix, not(target_os = "macos")))]
    #[test]
    fn test_platform_data_dir_prefers_xdg() {
        let home = Some(PathBuf::from("/home/kasun"));

        let xdg = platform_data_dir(home.clone(), |key| {
            (key == "XDG_DATA_HOME").then(|| OsString::from("/srv/data"))
        });
        assert_eq!(xdg, Some(PathBuf::from("/srv/data/customer-desk")));

        let blank_xdg = platform_data_dir(home, |_| Some(OsString::new()));
        assert_eq!(
            blank_xdg,
            Some(PathBuf::from("/home/kasun/.local/share/customer-desk"))
        );

        assert_eq!(platform_data_dir(None, |_| None), None);
    }

    #[test]
    fn test_config_path_lives_in_data_dir() {
        if std::env::var_os("CUSTOMER_DESK_CONFIG_PATH").is_some() {
            return;
        }
        assert_eq!(config_path(), app_data_dir().join("config.toml"));
    }
}
