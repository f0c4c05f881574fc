use crate::errors::OscliError;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config file not found: {path}")]
    ConfigNotFound { path: String },

    #[error("cannot parse configuration '{path}': {message}")]
    ConfigParseError { path: String, message: String },

    #[error("{kind} '{name}' already exists")]
    AlreadyExists { kind: &'static str, name: String },

    #[error("context '{name}' is not found")]
    ContextNotFound { name: String },

    #[error("no active context, use 'oscli context switch' to select one")]
    NoActiveContext,

    #[error("failed to save configuration: {message}")]
    SaveFailed { message: String },

    #[error("IO error: {source}")]
    IoError {
        #[from]
        source: std::io::Error,
    },
}

impl OscliError for ConfigError {
    fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ConfigNotFound { .. } => "CONFIG_NOT_FOUND",
            ConfigError::ConfigParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::AlreadyExists { .. } => "CONFIG_ALREADY_EXISTS",
            ConfigError::ContextNotFound { .. } => "CONFIG_CONTEXT_NOT_FOUND",
            ConfigError::NoActiveContext => "CONFIG_NO_ACTIVE_CONTEXT",
            ConfigError::SaveFailed { .. } => "CONFIG_SAVE_FAILED",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }

    fn is_user_error(&self) -> bool {
        // Exhaustive match ensures new variants force an explicit classification.
        match self {
            ConfigError::ConfigNotFound { .. }
            | ConfigError::ConfigParseError { .. }
            | ConfigError::AlreadyExists { .. }
            | ConfigError::ContextNotFound { .. }
            | ConfigError::NoActiveContext => true,

            ConfigError::SaveFailed { .. } | ConfigError::IoError { .. } => false,
        }
    }
}
