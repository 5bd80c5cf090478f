/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::AuthContext;
use crate::rest::errors::FlickrError;
use crate::rest::signer::{
    self, HMAC_SHA1, OAUTH_NONCE, OAUTH_SIGNATURE, OAUTH_SIGNATURE_METHOD, OAUTH_TIMESTAMP,
};
use chrono::Utc;
use std::collections::HashMap;
use strum_macros::{Display, EnumString, IntoStaticStr};

/// Method name and method specific arguments for an API call
pub type ApiParams<'a> = [(&'a str, &'a str)];

/// HTTP verbs the REST endpoint accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString, IntoStaticStr)]
#[strum(ascii_case_insensitive)]
pub enum Verb {
    #[strum(serialize = "GET")]
    Get,
    #[strum(serialize = "POST")]
    Post,
}

/// A single API call: verb, parameters and the secret they get signed with.
///
/// The nonce and timestamp are fixed at construction, so a request should not be reused for a
/// different logical call.
#[derive(Clone)]
pub struct Request {
    verb: Verb,
    params: HashMap<String, String>,
    secret: String,
}

impl Request {
    /// Builds a request from the auth context plus any extra arguments.
    ///
    /// Extra arguments are merged last and win over the generated OAuth values.
    pub fn new(
        verb: Verb,
        auth: &AuthContext,
        extra: Option<&ApiParams<'_>>,
        secret: &str,
    ) -> Self {
        let mut params = HashMap::new();
        params.insert(OAUTH_NONCE.to_string(), new_nonce());
        params.insert(OAUTH_TIMESTAMP.to_string(), new_timestamp());
        params.insert(OAUTH_SIGNATURE_METHOD.to_string(), HMAC_SHA1.to_string());
        for (k, v) in auth.params() {
            params.insert(k.to_string(), v.to_string());
        }
        for (k, v) in extra.unwrap_or_default() {
            params.insert(k.to_string(), v.to_string());
        }

        Self {
            verb,
            params,
            secret: secret.into(),
        }
    }

    /// Replaces the generated nonce and timestamp, mostly useful for reproducible signatures
    pub fn with_nonce_and_timestamp(mut self, nonce: &str, timestamp: i64) -> Self {
        self.params.insert(OAUTH_NONCE.to_string(), nonce.to_string());
        self.params
            .insert(OAUTH_TIMESTAMP.to_string(), timestamp.to_string());
        self
    }

    /// Gives the request a new nonce and the current timestamp, dropping any signature.
    ///
    /// Used before every retry so a resent call is never a replay of the previous attempt.
    pub fn renew(&mut self) {
        self.params.remove(OAUTH_SIGNATURE);
        self.params.insert(OAUTH_NONCE.to_string(), new_nonce());
        self.params.insert(OAUTH_TIMESTAMP.to_string(), new_timestamp());
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub(crate) fn set_verb(&mut self, verb: Verb) {
        self.verb = verb;
    }

    pub fn params(&self) -> &HashMap<String, String> {
        &self.params
    }

    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Adds or overwrites an argument. Any existing signature is dropped since it no longer
    /// covers the parameter set.
    pub fn insert(&mut self, key: &str, value: &str) {
        self.params.remove(OAUTH_SIGNATURE);
        self.params.insert(key.to_string(), value.to_string());
    }

    /// The signature from the last call to [`Request::sign`], if any
    pub fn signature(&self) -> Option<&str> {
        self.param(OAUTH_SIGNATURE)
    }

    /// Signs the request for the given endpoint
    pub fn sign(&mut self, url: &str) -> Result<(), FlickrError> {
        signer::sign(self.verb, url, &mut self.params, &self.secret)
    }

    /// `key=value&...` form of the current parameters
    pub fn encoded_params(&self) -> String {
        signer::encode_query(&self.params)
    }
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("verb", &self.verb)
            .field("method", &self.param("method"))
            .field("secret", &"xxx")
            .finish()
    }
}

fn new_nonce() -> String {
    format!("{:016x}", rand::random::<u64>())
}

fn new_timestamp() -> String {
    Utc::now().timestamp().to_string()
}

/// Parses `key1=value1&key2=value2` into argument pairs
pub fn parse_args(args: &str) -> Result<Vec<(String, String)>, FlickrError> {
    if args.is_empty() {
        return Ok(Vec::new());
    }
    args.split('&')
        .map(|pair| {
            let parts: Vec<&str> = pair.split('=').collect();
            match parts.as_slice() {
                [k, v] if !k.is_empty() => Ok((k.to_string(), v.to_string())),
                _ => Err(FlickrError::InvalidArgs(pair.to_string())),
            }
        })
        .collect()
}
