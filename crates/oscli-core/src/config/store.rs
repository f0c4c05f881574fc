use std::fs;
use std::path::{Path, PathBuf};

use super::errors::ConfigError;
use super::paths::default_config_path;
use super::types::Registry;

/// Reads and writes the registry file.
///
/// There is no locking: concurrent writers race and the last save wins.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
    explicit: bool,
}

impl ConfigStore {
    /// Use `explicit` when given, otherwise the default location.
    pub fn new(explicit: Option<PathBuf>) -> Self {
        match explicit {
            Some(path) => Self::with_location(path, true),
            None => Self::with_location(default_config_path(), false),
        }
    }

    fn with_location(path: PathBuf, explicit: bool) -> Self {
        Self { path, explicit }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the registry.
    ///
    /// A missing file at the default location is created as an empty skeleton.
    /// A missing file at an explicitly requested path is an error.
    pub fn load(&self) -> Result<Registry, ConfigError> {
        if !self.path.exists() {
            if self.explicit {
                return Err(ConfigError::ConfigNotFound {
                    path: self.path.display().to_string(),
                });
            }
            let skeleton = Registry::skeleton();
            self.save(&skeleton)?;
            tracing::info!(
                event = "core.config.skeleton_created",
                path = %self.path.display()
            );
            return Ok(skeleton);
        }

        let content = fs::read_to_string(&self.path).map_err(|e| {
            tracing::error!(
                event = "core.config.load_failed",
                path = %self.path.display(),
                error = %e
            );
            ConfigError::from(e)
        })?;

        if content.trim().is_empty() {
            return Ok(Registry::default());
        }

        let registry: Registry =
            serde_yaml::from_str(&content).map_err(|e| ConfigError::ConfigParseError {
                path: self.path.display().to_string(),
                message: e.to_string(),
            })?;

        tracing::debug!(
            event = "core.config.loaded",
            path = %self.path.display(),
            contexts = registry.contexts.len()
        );
        Ok(registry)
    }

    /// Persist the registry, creating the file and its parent directories
    /// when absent.
    pub fn save(&self, registry: &Registry) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| ConfigError::SaveFailed {
                message: format!("Failed to create directory ({}): {}", parent.display(), e),
            })?;
        }

        let yaml = serde_yaml::to_string(registry).map_err(|e| ConfigError::SaveFailed {
            message: format!("Failed to serialize configuration: {}", e),
        })?;

        fs::write(&self.path, yaml).map_err(|e| ConfigError::SaveFailed {
            message: format!(
                "Failed to write configuration file ({}): {}",
                self.path.display(),
                e
            ),
        })?;

        tracing::info!(
            event = "core.config.saved",
            path = %self.path.display(),
            contexts = registry.contexts.len()
        );
        Ok(())
    }

    /// Create the configuration file if it does not exist yet.
    ///
    /// Returns `false` when a file was already present; it is left untouched.
    pub fn init(&self, example: bool) -> Result<bool, ConfigError> {
        if self.path.exists() {
            return Ok(false);
        }
        let registry = if example {
            Registry::example()
        } else {
            Registry::skeleton()
        };
        self.save(&registry)?;
        Ok(true)
    }
}
