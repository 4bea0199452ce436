use aws_credential_types::provider::error::CredentialsError;
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("failed to resolve credentials: {0}")]
    Credentials(#[from] CredentialsError),

    #[error("failed to sign request: {0}")]
    Signing(String),

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("endpoint answered {status}: {body}")]
    Http { status: u16, body: String },

    #[error("graphql errors: {0}")]
    Graphql(Value),

    #[error("response carried neither data nor errors")]
    EmptyResponse,

    #[error("invalid event: {0}")]
    InvalidEvent(String),

    #[error("schema error: {0}")]
    Schema(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Error {
        Error::Config(msg.into())
    }
}

impl From<aws_sigv4::http_request::SigningError> for Error {
    fn from(value: aws_sigv4::http_request::SigningError) -> Error {
        Error::Signing(format!("{}", value))
    }
}
