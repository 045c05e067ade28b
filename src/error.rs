use axum::http::StatusCode;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

const FALLBACK_MESSAGE: &str = "Internal Server Error";

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{0}")]
    BadInput(String),

    #[error("Method Not Allowed")]
    MethodNotAllowed,

    #[error("Upstream error: {status} {body}")]
    Upstream { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Address parse error: {0}")]
    AddrParse(#[from] std::net::AddrParseError),

    #[error("Invalid state transition: {current} -> {requested}")]
    InvalidTransition { current: String, requested: String },

    #[error("{0}")]
    Internal(String),
}

impl Error {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn bad_input(msg: impl Into<String>) -> Self {
        Self::BadInput(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Status code sent to the caller. Bad input is deliberately reported as
    /// a server error, matching the relay's established wire contract.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Text placed in the outbound `{ "error": ... }` body.
    pub fn outbound_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            FALLBACK_MESSAGE.to_string()
        } else {
            message
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_method_not_allowed_maps_to_405() {
        let err = Error::MethodNotAllowed;
        assert_eq!(err.status_code(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(err.outbound_message(), "Method Not Allowed");
    }

    #[test]
    fn test_bad_input_maps_to_500() {
        let err = Error::bad_input("Prompt is required");
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.outbound_message(), "Prompt is required");
    }

    #[test]
    fn test_upstream_message_embeds_status_and_body() {
        let err = Error::Upstream {
            status: 503,
            body: "overloaded".to_string(),
        };
        let message = err.outbound_message();
        assert!(message.contains("503"));
        assert!(message.contains("overloaded"));
    }

    #[test]
    fn test_empty_message_uses_fallback() {
        let err = Error::internal("");
        assert_eq!(err.outbound_message(), "Internal Server Error");
    }
}
