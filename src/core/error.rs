use std::fmt;

use thiserror::Error;

/// Machine readable error codes. Configuration codes are raised eagerly
/// at startup, the rest are produced by the HTTP client and turned into
/// chat content by the chat service.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    ApiKeyMissing,
    ApiUrlMissing,
    InvalidApiUrl,
    HttpStatus,
    Timeout,
    Network,
    InvalidResponse,
    EmptyResponse,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ApiKeyMissing => "API_KEY_MISSING",
            ErrorCode::ApiUrlMissing => "API_URL_MISSING",
            ErrorCode::InvalidApiUrl => "INVALID_API_URL",
            ErrorCode::HttpStatus => "HTTP_STATUS",
            ErrorCode::Timeout => "TIMEOUT",
            ErrorCode::Network => "NETWORK_ERROR",
            ErrorCode::InvalidResponse => "INVALID_RESPONSE",
            ErrorCode::EmptyResponse => "EMPTY_RESPONSE",
            ErrorCode::Unknown => "UNKNOWN_ERROR",
        }
    }

    pub fn is_config(&self) -> bool {
        matches!(
            self,
            ErrorCode::ApiKeyMissing | ErrorCode::ApiUrlMissing | ErrorCode::InvalidApiUrl
        )
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
#[error("{message} ({code})")]
pub struct ApiError {
    pub message: String,
    pub code: ErrorCode,
    pub status: Option<u16>,
}

impl ApiError {
    pub fn new(message: impl Into<String>, code: ErrorCode) -> Self {
        Self {
            message: message.into(),
            code,
            status: None,
        }
    }

    pub fn with_status(message: impl Into<String>, status: u16) -> Self {
        Self {
            message: message.into(),
            code: ErrorCode::HttpStatus,
            status: Some(status),
        }
    }

    pub fn timeout() -> Self {
        Self::new("request timed out", ErrorCode::Timeout)
    }

    pub fn invalid_response() -> Self {
        Self::new("Invalid response from API", ErrorCode::InvalidResponse)
    }

    pub fn empty_response() -> Self {
        Self::new("Empty response from API", ErrorCode::EmptyResponse)
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            return Self::timeout();
        }
        if err.is_decode() {
            return Self::invalid_response();
        }
        if let Some(status) = err.status() {
            return Self::with_status(err.to_string(), status.as_u16());
        }
        if err.is_connect() || err.is_request() {
            return Self::new(err.to_string(), ErrorCode::Network);
        }
        Self::new(err.to_string(), ErrorCode::Unknown)
    }
}
