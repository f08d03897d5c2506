//! Error types for the IV spike monitor

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpikeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

pub type SpikeResult<T> = Result<T, SpikeError>;

impl SpikeError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn notification(msg: impl Into<String>) -> Self {
        Self::Notification(msg.into())
    }
}

impl From<reqwest::Error> for SpikeError {
    fn from(err: reqwest::Error) -> Self {
        Self::Network(err.to_string())
    }
}

impl From<toml::de::Error> for SpikeError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        assert!(matches!(SpikeError::from(io), SpikeError::IO(_)));

        let toml_err = toml::from_str::<toml::Table>("[scan").unwrap_err();
        let err = SpikeError::from(toml_err);
        assert!(matches!(err, SpikeError::Serialization(_)));

        assert_eq!(
            SpikeError::config("bad threshold").to_string(),
            "Configuration error: bad threshold"
        );
        assert!(matches!(SpikeError::invalid_input("x"), SpikeError::InvalidInput(_)));
        assert!(matches!(SpikeError::notification("x"), SpikeError::Notification(_)));
    }
}
