/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::envelope::{classify, into_payload, photo_id};
use crate::rest::errors::FlickrError;
use crate::rest::macros::retry_with_backoff;
use crate::rest::multipart::MultipartBody;
use crate::rest::{ApiParams, Config, Envelope, Request, Verb};
use futures::StreamExt;
use log::debug;
use reqwest::header::{CONTENT_LENGTH, CONTENT_TYPE};
use std::path::Path;
use std::time::Duration;
use tokio::fs::File;
use tokio::io::AsyncWriteExt;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Directly communicates with the API.
///
/// Signs each [`Request`] for the endpoint it is sent to, performs the call and reduces the
/// response to either the payload or a single [`FlickrError`].
#[derive(Clone)]
pub struct ApiClient {
    config: Config,
    https_client: reqwest::Client,
}

impl ApiClient {
    /// Creates a new instance from the provided configuration
    pub fn new(config: Config) -> Result<Self, FlickrError> {
        config.validate()?;
        let https_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str())
            .build()?;
        Ok(Self {
            config,
            https_client,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Builds a request carrying the configured credentials plus `extra`
    pub fn request(&self, verb: Verb, extra: Option<&ApiParams<'_>>) -> Request {
        Request::new(
            verb,
            self.config.creds.auth_context(),
            extra,
            self.config.creds.signing_secret(),
        )
    }

    /// Signs and sends the request to the REST endpoint, returning the raw payload.
    ///
    /// GET requests carry the parameters in the query string, POST requests in a url-encoded
    /// form body.
    pub async fn execute(&self, request: &mut Request) -> Result<String, FlickrError> {
        let endpoint = self.config.api_endpoint.as_str();
        request.sign(endpoint)?;
        debug!("{} {} {:?}", request.verb(), endpoint, request.param("method"));

        let sent = match request.verb() {
            Verb::Get => {
                let url = format!("{}?{}", endpoint, request.encoded_params());
                self.https_client.get(url).send().await
            }
            Verb::Post => {
                self.https_client
                    .post(endpoint)
                    .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
                    .body(request.encoded_params())
                    .send()
                    .await
            }
        };
        into_payload(Self::read_envelope(sent).await?)
    }

    /// [`ApiClient::execute`] with bounded retries.
    ///
    /// The request keeps its arguments across attempts but gets a new nonce and timestamp each
    /// time it is resent.
    pub async fn execute_with_retry(
        &self,
        request: &mut Request,
        attempts: u32,
        initial_delay: Duration,
    ) -> Result<String, FlickrError> {
        let mut first = true;
        retry_with_backoff!(attempts, initial_delay, {
            renew_after_first(request, &mut first);
            self.execute(request)
        })
    }

    /// Uploads a file and returns the id of the new photo.
    ///
    /// The request is turned into a POST and signed for the upload endpoint. Its parameters are
    /// sent as multipart fields ahead of the streamed file.
    pub async fn upload_file(
        &self,
        request: &mut Request,
        path: impl AsRef<Path>,
        content_type: &str,
    ) -> Result<String, FlickrError> {
        let endpoint = self.config.upload_endpoint.as_str();
        let payload = self
            .post_file(endpoint, request, path.as_ref(), content_type)
            .await?;
        photo_id(&payload)
    }

    /// [`ApiClient::upload_file`] with bounded retries
    pub async fn upload_file_with_retry(
        &self,
        request: &mut Request,
        path: impl AsRef<Path>,
        content_type: &str,
        attempts: u32,
        initial_delay: Duration,
    ) -> Result<String, FlickrError> {
        let path = path.as_ref();
        let mut first = true;
        retry_with_backoff!(attempts, initial_delay, {
            renew_after_first(request, &mut first);
            self.upload_file(request, path, content_type)
        })
    }

    /// Replaces the content of an existing photo, returning its id
    pub async fn replace_file(
        &self,
        request: &mut Request,
        photo: &str,
        path: impl AsRef<Path>,
        content_type: &str,
    ) -> Result<String, FlickrError> {
        request.insert("photo_id", photo);
        let endpoint = self.config.replace_endpoint.as_str();
        let payload = self
            .post_file(endpoint, request, path.as_ref(), content_type)
            .await?;
        photo_id(&payload)
    }

    /// [`ApiClient::replace_file`] with bounded retries
    pub async fn replace_file_with_retry(
        &self,
        request: &mut Request,
        photo: &str,
        path: impl AsRef<Path>,
        content_type: &str,
        attempts: u32,
        initial_delay: Duration,
    ) -> Result<String, FlickrError> {
        let path = path.as_ref();
        let mut first = true;
        retry_with_backoff!(attempts, initial_delay, {
            renew_after_first(request, &mut first);
            self.replace_file(request, photo, path, content_type)
        })
    }

    /// Streams the resource at `url` into `file`, returning the number of bytes written.
    ///
    /// Static photo urls are public so the request is sent unsigned.
    pub async fn download(&self, url: &str, file: &mut File) -> Result<u64, FlickrError> {
        debug!("Downloading {}", url);
        let response = self
            .https_client
            .get(url)
            .send()
            .await?
            .error_for_status()?;
        let mut stream = response.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        Ok(written)
    }

    async fn post_file(
        &self,
        endpoint: &str,
        request: &mut Request,
        path: &Path,
        content_type: &str,
    ) -> Result<String, FlickrError> {
        request.set_verb(Verb::Post);
        request.sign(endpoint)?;
        // Opening the file first keeps a missing file from ever reaching the network
        let body = MultipartBody::open(request.params(), path, content_type).await?;
        debug!(
            "Uploading {} ({} bytes) to {}",
            path.display(),
            body.content_length(),
            endpoint
        );
        self.send_multipart(endpoint, body).await
    }

    // A failure while streaming the file aborts the request and surfaces as a transport error
    async fn send_multipart(
        &self,
        endpoint: &str,
        body: MultipartBody,
    ) -> Result<String, FlickrError> {
        let content_length = body.content_length();
        let sent = self
            .https_client
            .post(endpoint)
            .header(CONTENT_TYPE, MultipartBody::content_type())
            .header(CONTENT_LENGTH, content_length)
            .body(reqwest::Body::wrap_stream(body.into_stream()))
            .send()
            .await;
        into_payload(Self::read_envelope(sent).await?)
    }

    // Reads the whole body and classifies the outcome. An envelope error takes precedence over a
    // bad HTTP status, which takes precedence over an unparseable body.
    async fn read_envelope(
        sent: Result<reqwest::Response, reqwest::Error>,
    ) -> Result<Envelope, FlickrError> {
        let response = sent?;
        let transport = response
            .error_for_status_ref()
            .map(|_| ())
            .map_err(FlickrError::from);
        let body = response.text().await?;

        match Envelope::parse(&body) {
            Ok(envelope) => {
                debug!("Response status: {}", envelope.status);
                classify(transport, Some(&envelope))?;
                Ok(envelope)
            }
            Err(err) => {
                classify(transport, None)?;
                debug!("Unparseable response body: {}", body);
                Err(err)
            }
        }
    }
}

// The caller's nonce and timestamp are used as given for the first attempt only
fn renew_after_first(request: &mut Request, first: &mut bool) {
    if !std::mem::take(first) {
        request.renew();
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("api_endpoint", &self.config.api_endpoint)
            .finish()
    }
}
