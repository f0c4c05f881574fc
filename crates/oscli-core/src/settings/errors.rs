use crate::errors::OscliError;

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("no settings found for remote '{alias}' in the cluster")]
    RemoteNotFound { alias: String },

    #[error("invalid settings document: {message}")]
    InvalidDocument { message: String },

    #[error("unknown {kind} '{value}', expected one of: {expected}")]
    UnknownValue {
        kind: &'static str,
        value: String,
        expected: &'static str,
    },
}

impl OscliError for SettingsError {
    fn error_code(&self) -> &'static str {
        match self {
            SettingsError::RemoteNotFound { .. } => "SETTINGS_REMOTE_NOT_FOUND",
            SettingsError::InvalidDocument { .. } => "SETTINGS_INVALID_DOCUMENT",
            SettingsError::UnknownValue { .. } => "SETTINGS_UNKNOWN_VALUE",
        }
    }

    fn is_user_error(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_not_found_message() {
        let error = SettingsError::RemoteNotFound {
            alias: "leader".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "no settings found for remote 'leader' in the cluster"
        );
        assert_eq!(error.error_code(), "SETTINGS_REMOTE_NOT_FOUND");
    }
}
