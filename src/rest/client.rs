/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::retry::retry;
use crate::rest::{ApiClient, ApiParams, Config, Creds, Request, Verb};
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Shared handle for making API calls.
///
/// Cheap to clone. Every call builds a fresh [`Request`] per attempt and retries according to
/// the [`Config`] it was created with.
///
/// ```rust,no_run
/// use flickr::rest::{Client, Creds, Verb};
///
/// # async fn echo() -> Result<(), flickr::rest::FlickrError> {
/// let client = Client::from_creds(Creds::from_tokens(
///     "api key",
///     Some("api secret"),
///     Some("access token"),
///     Some("token secret"),
/// ))?;
/// let payload = client.call(Verb::Get, "flickr.test.echo", &[("name", "value")]).await?;
/// println!("{}", payload);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct Client {
    api_client: Arc<ApiClient>,
}

impl Client {
    pub fn new(config: Config) -> Result<Self, FlickrError> {
        Ok(Self {
            api_client: Arc::new(ApiClient::new(config)?),
        })
    }

    /// Client for the public Flickr endpoints with the default retry policy
    pub fn from_creds(creds: Creds) -> Result<Self, FlickrError> {
        Self::new(Config::new(creds))
    }

    /// The lower level transport used by this client
    pub fn api(&self) -> &ApiClient {
        &self.api_client
    }

    /// Builds a request for `method` with the given arguments
    pub fn request(&self, verb: Verb, method: &str, args: &ApiParams<'_>) -> Request {
        let mut params: Vec<(&str, &str)> = vec![("method", method)];
        params.extend_from_slice(args);
        self.api_client.request(verb, Some(&params))
    }

    /// Calls an API method and returns the raw payload XML
    pub async fn call(
        &self,
        verb: Verb,
        method: &str,
        args: &ApiParams<'_>,
    ) -> Result<String, FlickrError> {
        let config = self.api_client.config();
        retry(config.retry_attempts, config.retry_delay, || async move {
            let mut request = self.request(verb, method, args);
            self.api_client.execute(&mut request).await
        })
        .await
    }

    /// Calls an API method and deserializes the payload
    pub async fn call_as<T: DeserializeOwned>(
        &self,
        verb: Verb,
        method: &str,
        args: &ApiParams<'_>,
    ) -> Result<T, FlickrError> {
        let payload = self.call(verb, method, args).await?;
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(FlickrError::ResponseMissing());
        }
        Ok(quick_xml::de::from_str(payload)?)
    }

    /// Uploads a photo and returns its id.
    ///
    /// The whole upload is retried per the [`Config`], each attempt with a freshly signed request.
    pub async fn upload_photo(
        &self,
        path: impl AsRef<Path>,
        content_type: &str,
    ) -> Result<String, FlickrError> {
        let path = path.as_ref();
        let config = self.api_client.config();
        retry(config.retry_attempts, config.retry_delay, || async move {
            let mut request = self.api_client.request(Verb::Post, None);
            self.api_client
                .upload_file(&mut request, path, content_type)
                .await
        })
        .await
    }

    /// Replaces the content of an existing photo
    pub async fn replace_photo(
        &self,
        photo_id: &str,
        path: impl AsRef<Path>,
        content_type: &str,
    ) -> Result<String, FlickrError> {
        let path = path.as_ref();
        let config = self.api_client.config();
        retry(config.retry_attempts, config.retry_delay, || async move {
            let mut request = self.api_client.request(Verb::Post, None);
            self.api_client
                .replace_file(&mut request, photo_id, path, content_type)
                .await
        })
        .await
    }
}
