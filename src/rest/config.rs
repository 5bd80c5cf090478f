/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::signer::{OAUTH_CONSUMER_KEY, OAUTH_TOKEN, percent_encode};
use serde::Deserialize;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

// Flickr REST endpoints
pub const API_ENDPOINT: &str = "https://api.flickr.com/services/rest";
pub const UPLOAD_ENDPOINT: &str = "https://up.flickr.com/services/upload";
pub const REPLACE_ENDPOINT: &str = "https://up.flickr.com/services/replace";

/// Consumer key and access token merged into every request.
#[derive(Default, Clone, PartialEq, Eq)]
pub struct AuthContext {
    consumer_key: String,
    access_token: Option<String>,
}

impl AuthContext {
    pub fn new(consumer_key: &str, access_token: Option<&str>) -> Self {
        Self {
            consumer_key: consumer_key.into(),
            access_token: access_token.map(Into::into),
        }
    }

    /// The OAuth parameters this context contributes to a request
    pub fn params(&self) -> Vec<(&str, &str)> {
        let mut params = vec![(OAUTH_CONSUMER_KEY, self.consumer_key.as_str())];
        if let Some(token) = self.access_token.as_deref() {
            params.push((OAUTH_TOKEN, token));
        }
        params
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("consumer_key", &"xxx")
            .field("access_token", &self.access_token.as_ref().map(|_| "xxx"))
            .finish()
    }
}

/// Credentials used for signing requests.
///
/// The consumer key/secret come from the Flickr app registration. The access token/secret are
/// obtained via the OAuth1 authorization flow, which is left to the consumer of this library.
#[derive(Default, Clone)]
pub struct Creds {
    auth: AuthContext,
    signing_secret: String,
}

impl Creds {
    /// Creates the credentials from the individual tokens.
    pub fn from_tokens(
        consumer_key: &str,
        consumer_secret: Option<&str>,
        access_token: Option<&str>,
        token_secret: Option<&str>,
    ) -> Self {
        let signing_secret = format!(
            "{}&{}",
            percent_encode(consumer_secret.unwrap_or_default()),
            percent_encode(token_secret.unwrap_or_default())
        );
        Self {
            auth: AuthContext::new(consumer_key, access_token),
            signing_secret,
        }
    }

    /// Creates the credentials from an already composed `consumer_secret&token_secret` value
    pub fn from_composite_secret(consumer_key: &str, access_token: &str, secret: &str) -> Self {
        Self {
            auth: AuthContext::new(consumer_key, Some(access_token)),
            signing_secret: secret.into(),
        }
    }

    pub fn auth_context(&self) -> &AuthContext {
        &self.auth
    }

    /// Key used for the HMAC-SHA1 signature
    pub fn signing_secret(&self) -> &str {
        &self.signing_secret
    }
}

impl std::fmt::Debug for Creds {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Creds")
            .field("auth", &self.auth)
            .field("signing_secret", &"xxx")
            .finish()
    }
}

/// OAuth access token pair as stored in a JSON cache file
#[derive(Deserialize)]
pub struct TokenCache {
    pub token: String,
    pub secret: String,
}

impl TokenCache {
    /// Reads `{"token": "...", "secret": "..."}` from the given file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, FlickrError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        Ok(serde_json::from_reader(reader)?)
    }
}

impl std::fmt::Debug for TokenCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenCache")
            .field("token", &"xxx")
            .field("secret", &"xxx")
            .finish()
    }
}

/// Client configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// REST endpoint for GET and form POST calls
    pub api_endpoint: String,
    /// Endpoint for multipart photo uploads
    pub upload_endpoint: String,
    /// Endpoint for replacing the content of an existing photo
    pub replace_endpoint: String,
    /// Request timeout
    pub timeout: Duration,
    /// User agent string
    pub user_agent: String,
    /// Attempts made by the retrying operations
    pub retry_attempts: u32,
    /// Delay before the first retry, doubled for each one after
    pub retry_delay: Duration,
    pub creds: Creds,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_endpoint: API_ENDPOINT.to_string(),
            upload_endpoint: UPLOAD_ENDPOINT.to_string(),
            replace_endpoint: REPLACE_ENDPOINT.to_string(),
            timeout: Duration::from_secs(300),
            user_agent: format!("flickr-rs/{}", env!("CARGO_PKG_VERSION")),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(1),
            creds: Creds::default(),
        }
    }
}

impl Config {
    /// Create a new config for the given credentials using the public Flickr endpoints
    pub fn new(creds: Creds) -> Self {
        Self {
            creds,
            ..Default::default()
        }
    }

    /// Point all three endpoints below a different origin, e.g. a local mock server
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        let base_url = base_url.trim_end_matches('/');
        self.api_endpoint = format!("{}/services/rest", base_url);
        self.upload_endpoint = format!("{}/services/upload", base_url);
        self.replace_endpoint = format!("{}/services/replace", base_url);
        self
    }

    /// Set timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy used by the retrying operations
    pub fn with_retry(mut self, attempts: u32, initial_delay: Duration) -> Self {
        self.retry_attempts = attempts;
        self.retry_delay = initial_delay;
        self
    }

    /// Checks that all endpoints are absolute urls
    pub fn validate(&self) -> Result<(), FlickrError> {
        for endpoint in [
            &self.api_endpoint,
            &self.upload_endpoint,
            &self.replace_endpoint,
        ] {
            let url = url::Url::parse(endpoint)?;
            if url.query().is_some() {
                return Err(FlickrError::Config(format!(
                    "endpoint must not carry a query string: {}",
                    endpoint
                )));
            }
        }
        Ok(())
    }
}
