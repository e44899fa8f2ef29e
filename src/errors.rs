use energy_config::ConfigError;
use energy_core::CoreError;
use thiserror::Error;

/// Application-level failure, folded from the core and configuration layers.
#[derive(Error, Debug)]
pub enum BillingError {
    #[error("{0}")]
    Validation(String),
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl BillingError {
    pub fn is_validation(&self) -> bool {
        matches!(self, BillingError::Validation(_))
    }
}

/// User-facing CLI error wrapper.
#[derive(Error, Debug)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] BillingError),
    #[error("Invalid input: {0}")]
    Input(String),
    #[error("Command failed: {0}")]
    Command(String),
}

impl From<CoreError> for BillingError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(message) => BillingError::Validation(message),
            CoreError::Storage(message) | CoreError::Serde(message) => {
                BillingError::Storage(message)
            }
            CoreError::Io(err) => BillingError::Storage(err.to_string()),
            CoreError::Internal(message) => BillingError::Internal(message),
        }
    }
}

impl From<ConfigError> for BillingError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::Io(io) => BillingError::Storage(io.to_string()),
            ConfigError::Serde(message) => BillingError::Config(message),
            ConfigError::UnknownKey(_) | ConfigError::InvalidValue { .. } => {
                BillingError::Validation(err.to_string())
            }
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        CliError::from(BillingError::from(err))
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        CliError::from(BillingError::from(err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn core_errors_keep_their_category() {
        let err = BillingError::from(CoreError::Validation("bad month".into()));
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "bad month");

        let err = BillingError::from(CoreError::Serde("dataset `ledger`: eof".into()));
        assert!(matches!(err, BillingError::Storage(_)));

        let err = BillingError::from(CoreError::Internal("empty".into()));
        assert!(matches!(err, BillingError::Internal(_)));
    }

    #[test]
    fn config_key_errors_are_validation() {
        let err = BillingError::from(ConfigError::UnknownKey("theme".into()));
        assert!(err.is_validation());
    }
}
