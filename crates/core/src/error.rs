use thiserror::Error;

pub type TouchcreditResult<T> = Result<T, TouchcreditError>;

#[derive(Error, Debug)]
pub enum TouchcreditError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed touchpoint at record {index}: missing {field}")]
    MalformedTouchpoint { index: usize, field: &'static str },

    #[error("Invalid model parameter: {0}")]
    InvalidParameter(String),

    #[error("Unknown attribution model: {0}")]
    UnknownModel(String),

    #[error("Journey source error: {0}")]
    Source(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for TouchcreditError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
