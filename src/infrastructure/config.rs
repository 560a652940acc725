use crate::domain::{config::FlipperConfig, error::{FlipperError, FlipperResult}};
use std::path::{Path, PathBuf};
use std::fs;
use tracing::debug;

const APP_DIR: &str = "flipper-remote";
const PROJECT_DIR: &str = ".flipper-remote";
const CONFIG_FILE: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> FlipperResult<Self> {
        let global_config_path = Self::get_global_config_path()?;
        let project_config_path = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_project_config_path(&dir));

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Manager rooted at explicit paths
    pub fn with_paths(global_config_path: PathBuf, project_config_path: Option<PathBuf>) -> Self {
        Self {
            global_config_path,
            project_config_path,
        }
    }

    /// Load configuration: defaults, then the global file, then the project
    /// file. A later file replaces the earlier one as a whole.
    pub fn load_config(&self) -> FlipperResult<FlipperConfig> {
        let mut config = FlipperConfig::default();

        if self.global_config_path.exists() {
            debug!("Loading global config {}", self.global_config_path.display());
            config = self.load_config_from_path(&self.global_config_path)?;
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                debug!("Loading project config {}", project_path.display());
                config = self.load_config_from_path(project_path)?;
            }
        }

        Ok(config)
    }

    /// Get global configuration path
    fn get_global_config_path() -> FlipperResult<PathBuf> {
        let home = dirs::home_dir().ok_or_else(|| FlipperError::Config {
            message: "Could not determine home directory".to_string(),
        })?;

        Ok(home.join(".config").join(APP_DIR).join(CONFIG_FILE))
    }

    /// Find project configuration path by walking up directory tree
    fn find_project_config_path(start: &Path) -> Option<PathBuf> {
        let mut path = start;

        loop {
            let config_path = path.join(PROJECT_DIR).join(CONFIG_FILE);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> FlipperResult<FlipperConfig> {
        let content = fs::read_to_string(path).map_err(|e| FlipperError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| FlipperError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(&self, path: &Path, config: &FlipperConfig) -> FlipperResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| FlipperError::Config {
                message: format!("Failed to create config directory {}: {}", parent.display(), e),
            })?;
        }

        let content = toml::to_string_pretty(config).map_err(|e| FlipperError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| FlipperError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Write a default project configuration under `path`
    pub fn init_project_config(&self, path: &Path) -> FlipperResult<PathBuf> {
        let config_file = path.join(PROJECT_DIR).join(CONFIG_FILE);
        self.init_at(&config_file)?;
        Ok(config_file)
    }

    /// Write a default global configuration
    pub fn init_global_config(&self) -> FlipperResult<PathBuf> {
        self.init_at(&self.global_config_path)?;
        Ok(self.global_config_path.clone())
    }

    fn init_at(&self, config_file: &Path) -> FlipperResult<()> {
        if config_file.exists() {
            return Err(FlipperError::Config {
                message: format!("Configuration already exists: {}", config_file.display()),
            });
        }

        self.save_config_to_path(config_file, &FlipperConfig::default())
    }

    /// Get the current project config path (if any)
    pub fn get_project_config_path(&self) -> Option<&PathBuf> {
        self.project_config_path.as_ref()
    }

    /// Get the global config path
    pub fn get_global_config_path_ref(&self) -> &PathBuf {
        &self.global_config_path
    }
}
