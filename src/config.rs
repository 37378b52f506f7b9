use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use directories::ProjectDirs;
use log::{debug, info};
use thiserror::Error;

use crate::model::DEFAULT_ICON;

pub const STORE_FILE_NAME: &str = "shortcuts.json";
pub const PLUGIN_DIR_NAME: &str = "Flow.Launcher.Plugin.Shortcuts";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid settings file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to encode settings: {0}")]
    Encode(#[from] toml::ser::Error),
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub display: DisplayConfig,
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct GeneralConfig {
    /// Custom save location chosen through the editor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub store_path: Option<PathBuf>,
    /// Command launched by the `open_editor` action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(default = "default_list_command")]
    pub list_command: String,
    #[serde(default = "default_action_keyword")]
    pub action_keyword: String,
}

fn default_list_command() -> String { "shortcutlist".to_string() }
fn default_action_keyword() -> String { "s".to_string() }

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            store_path: None,
            editor: None,
            list_command: default_list_command(),
            action_keyword: default_action_keyword(),
        }
    }
}

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    /// Base directory for relative icon paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plugin_dir: Option<PathBuf>,
    #[serde(default = "default_icon")]
    pub default_icon: String,
    #[serde(default = "default_true")]
    pub show_category: bool,
    #[serde(default = "default_list_score")]
    pub list_score: i64,
}

fn default_icon() -> String { DEFAULT_ICON.to_string() }
fn default_true() -> bool { true }
fn default_list_score() -> i64 { 10000 }

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            plugin_dir: None,
            default_icon: default_icon(),
            show_category: true,
            list_score: default_list_score(),
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("org", "shortcuts", "shortcuts")
}

pub fn config_path() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.config_dir().join("config.toml"),
        None => PathBuf::from("config.toml"),
    }
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        debug!("No settings at {:?}, using defaults", path);
        return Ok(Config::default());
    }

    let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let config: Config = toml::from_str(&content)?;
    Ok(config)
}

pub fn save_config_to(config: &Config, path: &Path) -> Result<(), ConfigError> {
    let io_err = |source: std::io::Error| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    fs::write(path, content).map_err(io_err)?;
    Ok(())
}

/// Paths resolved once at startup. Nothing reads the environment for paths
/// after this is built.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config: Config,
    pub config_path: PathBuf,
    pub store_path: PathBuf,
    pub plugin_dir: PathBuf,
}

impl Settings {
    pub fn resolve(config: Config, config_path: PathBuf) -> Self {
        let exe_dir = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf));
        let layout = InstallLayout {
            exe_dir: exe_dir.clone(),
            appdata: env::var_os("APPDATA").map(PathBuf::from),
            default_store: default_store_path(),
        };

        let store_path = layout.store_path(&config);
        let plugin_dir = config
            .display
            .plugin_dir
            .clone()
            .or(exe_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        info!("Using shortcuts file {:?}", store_path);
        Self {
            config,
            config_path,
            store_path,
            plugin_dir,
        }
    }

    /// Persists a new custom save location. The running `Settings` value is
    /// left untouched; callers that need it rebuild from the saved config.
    pub fn remember_store_path(&self, path: &Path) -> Result<Config, ConfigError> {
        let mut config = self.config.clone();
        config.general.store_path = Some(path.to_path_buf());
        save_config_to(&config, &self.config_path)?;
        Ok(config)
    }
}

fn default_store_path() -> PathBuf {
    match project_dirs() {
        Some(dirs) => dirs.data_dir().join(STORE_FILE_NAME),
        None => PathBuf::from(STORE_FILE_NAME),
    }
}

/// Where a shortcuts file might live, in lookup order.
#[derive(Debug, Clone)]
struct InstallLayout {
    exe_dir: Option<PathBuf>,
    appdata: Option<PathBuf>,
    default_store: PathBuf,
}

impl InstallLayout {
    fn store_path(&self, config: &Config) -> PathBuf {
        if let Some(custom) = &config.general.store_path {
            let parent_ok = custom
                .parent()
                .is_none_or(|p| p.as_os_str().is_empty() || p.exists());
            if parent_ok {
                return custom.clone();
            }
            debug!("Ignoring custom location {:?}, its directory is gone", custom);
        }

        self.sibling_candidates()
            .into_iter()
            .find(|candidate| candidate.exists())
            .unwrap_or_else(|| self.default_store.clone())
    }

    fn sibling_candidates(&self) -> Vec<PathBuf> {
        let mut candidates = Vec::new();
        if let Some(dir) = &self.exe_dir {
            candidates.push(dir.join(STORE_FILE_NAME));
            if let Some(parent) = dir.parent() {
                candidates.push(parent.join(PLUGIN_DIR_NAME).join(STORE_FILE_NAME));
            }
        }
        if let Some(appdata) = &self.appdata {
            candidates.push(
                appdata
                    .join("FlowLauncher")
                    .join("Plugins")
                    .join(PLUGIN_DIR_NAME)
                    .join(STORE_FILE_NAME),
            );
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn layout(root: &Path) -> InstallLayout {
        InstallLayout {
            exe_dir: Some(root.join("bin")),
            appdata: Some(root.join("appdata")),
            default_store: root.join("data").join(STORE_FILE_NAME),
        }
    }

    #[test]
    fn defaults_when_file_missing() {
        let dir = tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.general.list_command, "shortcutlist");
        assert_eq!(config.display.list_score, 10000);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[general]\neditor = \"code\"\n").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.general.editor.as_deref(), Some("code"));
        assert_eq!(config.general.action_keyword, "s");
        assert!(config.display.show_category);
    }

    #[test]
    fn save_then_load_keeps_custom_location() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut config = Config::default();
        config.general.store_path = Some(dir.path().join("mine.json"));

        save_config_to(&config, &path).unwrap();
        assert_eq!(load_config_from(&path).unwrap(), config);
    }

    #[test]
    fn custom_location_wins_when_its_directory_exists() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.general.store_path = Some(dir.path().join("custom.json"));

        assert_eq!(layout(dir.path()).store_path(&config), dir.path().join("custom.json"));
    }

    #[test]
    fn custom_location_in_missing_directory_is_skipped() {
        let dir = tempdir().unwrap();
        let mut config = Config::default();
        config.general.store_path = Some(dir.path().join("gone").join("custom.json"));

        let resolved = layout(dir.path()).store_path(&config);
        assert_eq!(resolved, dir.path().join("data").join(STORE_FILE_NAME));
    }

    #[test]
    fn sibling_install_is_preferred_over_default() {
        let dir = tempdir().unwrap();
        let plugin = dir.path().join(PLUGIN_DIR_NAME);
        fs::create_dir_all(&plugin).unwrap();
        fs::write(plugin.join(STORE_FILE_NAME), "{}").unwrap();

        let resolved = layout(dir.path()).store_path(&Config::default());
        assert_eq!(resolved, plugin.join(STORE_FILE_NAME));
    }

    #[test]
    fn flow_launcher_appdata_install_is_found() {
        let dir = tempdir().unwrap();
        let plugin = dir
            .path()
            .join("appdata")
            .join("FlowLauncher")
            .join("Plugins")
            .join(PLUGIN_DIR_NAME);
        fs::create_dir_all(&plugin).unwrap();
        fs::write(plugin.join(STORE_FILE_NAME), "{}").unwrap();

        let resolved = layout(dir.path()).store_path(&Config::default());
        assert_eq!(resolved, plugin.join(STORE_FILE_NAME));
    }

    #[test]
    fn remember_store_path_writes_settings() {
        let dir = tempdir().unwrap();
        let settings = Settings {
            config: Config::default(),
            config_path: dir.path().join("config.toml"),
            store_path: dir.path().join(STORE_FILE_NAME),
            plugin_dir: dir.path().to_path_buf(),
        };

        let updated = settings.remember_store_path(&dir.path().join("other.json")).unwrap();
        let reloaded = load_config_from(&settings.config_path).unwrap();
        assert_eq!(reloaded, updated);
        assert_eq!(reloaded.general.store_path, Some(dir.path().join("other.json")));
    }
}
