use crate::domain::{config::BattleKeepConfig, error::{BattleKeepError, BattleKeepResult}};
use std::fs;
use std::path::{Path, PathBuf};

/// Project-local configuration directory
pub const PROJECT_CONFIG_DIR: &str = ".battlekeep";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Configuration manager
pub struct ConfigManager {
    global_config_path: PathBuf,
    project_config_path: Option<PathBuf>,
}

impl ConfigManager {
    /// Create new configuration manager
    pub fn new() -> BattleKeepResult<Self> {
        let global_config_path = Self::get_global_config_path()?;
        let project_config_path = std::env::current_dir()
            .ok()
            .and_then(|dir| Self::find_project_config_path(&dir));

        Ok(Self {
            global_config_path,
            project_config_path,
        })
    }

    /// Create a manager with explicit locations
    pub fn with_paths(global_config_path: PathBuf, project_config_path: Option<PathBuf>) -> Self {
        Self {
            global_config_path,
            project_config_path,
        }
    }

    /// Load configuration from files.
    ///
    /// Defaults, then the global file, then the project file; later files
    /// replace the global section wholesale.
    pub fn load_config(&self) -> BattleKeepResult<BattleKeepConfig> {
        let mut config = BattleKeepConfig::default();

        if self.global_config_path.exists() {
            config = self.load_config_from_path(&self.global_config_path)?;
        }

        if let Some(project_path) = &self.project_config_path {
            if project_path.exists() {
                config = self.load_config_from_path(project_path)?;
            }
        }

        Ok(config)
    }

    /// Save configuration to the global file
    pub fn save_config(&self, config: &BattleKeepConfig) -> BattleKeepResult<()> {
        if let Some(parent) = self.global_config_path.parent() {
            fs::create_dir_all(parent).map_err(|e| BattleKeepError::Config {
                message: format!("Failed to create config directory: {}", e),
            })?;
        }

        self.save_config_to_path(&self.global_config_path, config)
    }

    /// Get global configuration path
    fn get_global_config_path() -> BattleKeepResult<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| BattleKeepError::Config {
            message: "Could not determine config directory".to_string(),
        })?;

        Ok(config_dir.join("battlekeep").join(CONFIG_FILE_NAME))
    }

    /// Find project configuration path by walking up directory tree
    pub fn find_project_config_path(start: &Path) -> Option<PathBuf> {
        let mut path = start;

        loop {
            let config_path = path.join(PROJECT_CONFIG_DIR).join(CONFIG_FILE_NAME);
            if config_path.exists() {
                return Some(config_path);
            }

            path = path.parent()?;
        }
    }

    /// Load configuration from specific path
    pub fn load_config_from_path(&self, path: &Path) -> BattleKeepResult<BattleKeepConfig> {
        let content = fs::read_to_string(path).map_err(|e| BattleKeepError::Config {
            message: format!("Failed to read config file {}: {}", path.display(), e),
        })?;

        toml::from_str(&content).map_err(|e| BattleKeepError::Config {
            message: format!("Failed to parse config file {}: {}", path.display(), e),
        })
    }

    /// Save configuration to specific path
    pub fn save_config_to_path(
        &self,
        path: &Path,
        config: &BattleKeepConfig,
    ) -> BattleKeepResult<()> {
        let content = toml::to_string_pretty(config).map_err(|e| BattleKeepError::Config {
            message: format!("Failed to serialize config: {}", e),
        })?;

        fs::write(path, content).map_err(|e| BattleKeepError::Config {
            message: format!("Failed to write config file {}: {}", path.display(), e),
        })
    }

    /// Create default project configuration under `path`
    pub fn init_project_config(&self, path: &Path) -> BattleKeepResult<PathBuf> {
        let config_dir = path.join(PROJECT_CONFIG_DIR);
        let config_file = config_dir.join(CONFIG_FILE_NAME);

        if config_file.exists() {
            return Err(BattleKeepError::Config {
                message: "Project configuration already exists".to_string(),
            });
        }

        fs::create_dir_all(&config_dir).map_err(|e| BattleKeepError::Config {
            message: format!("Failed to create {} directory: {}", PROJECT_CONFIG_DIR, e),
        })?;

        self.save_config_to_path(&config_file, &BattleKeepConfig::default())?;
        Ok(config_file)
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
