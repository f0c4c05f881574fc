use std::error::Error;

/// Base trait for all oscli errors
pub trait OscliError: Error + Send + Sync + 'static {
    /// Error code for programmatic handling
    fn error_code(&self) -> &'static str;

    /// Whether this error is caused by user input or configuration rather
    /// than by the environment (keyring, filesystem, ...)
    fn is_user_error(&self) -> bool {
        false
    }
}

/// Common result type for the application
pub type OscliResult<T> = Result<T, Box<dyn OscliError>>;

pub use crate::config::errors::ConfigError;
pub use crate::context::errors::ContextError;
pub use crate::creds::errors::{CredentialError, VaultError};
pub use crate::settings::errors::SettingsError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_oscli_result() {
        let _result: OscliResult<i32> = Ok(42);
    }

    #[test]
    fn test_boxed_error_keeps_code() {
        let error: Box<dyn OscliError> = Box::new(ConfigError::NoActiveContext);
        assert_eq!(error.error_code(), "CONFIG_NO_ACTIVE_CONTEXT");
        assert!(error.is_user_error());
    }
}
