/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

use std::io;
use thiserror::Error;

/// Error conditions that can be returned
#[derive(Error, Debug)]
pub enum FlickrError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Request network error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("URL Parse error: {0}")]
    UrlParsing(#[from] url::ParseError),

    #[error("XML read error: {0}")]
    Xml(#[from] quick_xml::Error),

    #[error("XML payload deserialization error: {0}")]
    XmlDeserialization(#[from] quick_xml::DeError),

    #[error("Token cache deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Unsupported HTTP method")]
    UnsupportedMethod(#[from] strum::ParseError),

    #[error("Request signing error: {0}")]
    Signing(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument format: {0}")]
    InvalidArgs(String),

    #[error("Client not found")]
    ClientNotFound(),

    #[error("Photo {0} has no original url, request it with the url_o extra")]
    OriginalUnavailable(String),

    #[error("Expected response missing")]
    ResponseMissing(),

    /// An application level error reported by the API inside the response envelope
    #[error("{code}: {message}")]
    ApiResponse { code: String, message: String },

    #[error("API Response is malformed: {0}")]
    ApiResponseMalformed(String),
}

impl FlickrError {
    /// Returns the provider error code when this is an application level error
    pub fn api_code(&self) -> Option<&str> {
        match self {
            Self::ApiResponse { code, .. } => Some(code.as_str()),
            _ => None,
        }
    }

    /// Check if this error was reported by the API rather than the network or parser
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::ApiResponse { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_response_displays_code_and_message() {
        let err = FlickrError::ApiResponse {
            code: "4".to_string(),
            message: "Set already in collection".to_string(),
        };
        assert_eq!(err.to_string(), "4: Set already in collection");
        assert_eq!(err.api_code(), Some("4"));
        assert!(err.is_api_error());
    }

    #[test]
    fn transport_errors_carry_no_api_code() {
        let err = FlickrError::from(io::Error::new(io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.api_code(), None);
        assert!(!err.is_api_error());
    }
}
