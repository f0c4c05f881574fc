use crate::config::errors::ConfigError;
use crate::creds::errors::CredentialError;
use crate::errors::OscliError;

#[derive(Debug, thiserror::Error)]
pub enum ContextError {
    #[error("context '{context}' references unknown cluster '{cluster}'")]
    DanglingCluster { context: String, cluster: String },

    #[error("context '{context}' references unknown user '{user}'")]
    DanglingUser { context: String, user: String },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("unable to resolve credentials for context '{context}': {source}")]
    Credentials {
        context: String,
        #[source]
        source: CredentialError,
    },
}

impl OscliError for ContextError {
    fn error_code(&self) -> &'static str {
        match self {
            ContextError::DanglingCluster { .. } => "CONTEXT_DANGLING_CLUSTER",
            ContextError::DanglingUser { .. } => "CONTEXT_DANGLING_USER",
            ContextError::Config(e) => e.error_code(),
            ContextError::Credentials { source, .. } => source.error_code(),
        }
    }

    fn is_user_error(&self) -> bool {
        match self {
            ContextError::DanglingCluster { .. } | ContextError::DanglingUser { .. } => true,
            ContextError::Config(e) => e.is_user_error(),
            ContextError::Credentials { source, .. } => source.is_user_error(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrapped_errors_keep_inner_code() {
        let error = ContextError::from(ConfigError::NoActiveContext);
        assert_eq!(error.error_code(), "CONFIG_NO_ACTIVE_CONTEXT");
        assert!(error.is_user_error());

        let error = ContextError::Credentials {
            context: "ctx".to_string(),
            source: CredentialError::Keyring {
                message: "locked".to_string(),
            },
        };
        assert_eq!(error.error_code(), "CREDS_KEYRING_FAILED");
        assert!(!error.is_user_error());
    }

    #[test]
    fn test_dangling_message() {
        let error = ContextError::DanglingUser {
            context: "ctx1".to_string(),
            user: "ghost".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "context 'ctx1' references unknown user 'ghost'"
        );
    }
}
