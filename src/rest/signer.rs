/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! OAuth1 HMAC-SHA1 request signing and the url-encoded parameter serialization that goes with
//! it.
//!
//! Percent encoding follows RFC 3986: `A-Z a-z 0-9 - . _ ~` are left alone, everything else is
//! written as `%XX` with uppercase hex. A space is always `%20`, never `+`.
use crate::rest::Verb;
use crate::rest::errors::FlickrError;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::borrow::Cow;
use std::collections::HashMap;

type HmacSha1 = Hmac<Sha1>;

pub const OAUTH_CONSUMER_KEY: &str = "oauth_consumer_key";
pub const OAUTH_TOKEN: &str = "oauth_token";
pub const OAUTH_NONCE: &str = "oauth_nonce";
pub const OAUTH_TIMESTAMP: &str = "oauth_timestamp";
pub const OAUTH_SIGNATURE_METHOD: &str = "oauth_signature_method";
pub const OAUTH_SIGNATURE: &str = "oauth_signature";
pub const HMAC_SHA1: &str = "HMAC-SHA1";

/// Percent encodes a single value using the RFC 3986 unreserved set
pub fn percent_encode(value: &str) -> Cow<'_, str> {
    urlencoding::encode(value)
}

/// Builds the signature base string `VERB&enc(url)&enc(sorted params)`.
///
/// Any `oauth_signature` already present in `params` is ignored.
pub fn base_string(verb: Verb, url: &str, params: &HashMap<String, String>) -> String {
    let mut keys: Vec<&String> = params
        .keys()
        .filter(|k| k.as_str() != OAUTH_SIGNATURE)
        .collect();
    keys.sort();

    let param_str = keys
        .iter()
        .map(|k| format!("{}={}", percent_encode(k), percent_encode(&params[*k])))
        .collect::<Vec<_>>()
        .join("&");

    let verb: &'static str = verb.into();
    format!(
        "{}&{}&{}",
        verb,
        percent_encode(url),
        percent_encode(&param_str)
    )
}

/// Base64 encoded HMAC-SHA1 of `base` keyed with `secret`
pub fn signature(base: &str, secret: &str) -> Result<String, FlickrError> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| FlickrError::Signing(e.to_string()))?;
    mac.update(base.as_bytes());
    Ok(STANDARD.encode(mac.finalize().into_bytes()))
}

/// Signs `params` for a request to `url` and stores the result under `oauth_signature`.
///
/// Re-signing replaces the previous signature, so the map always ends up with exactly one.
/// An empty secret is allowed and signs with an empty key.
pub fn sign(
    verb: Verb,
    url: &str,
    params: &mut HashMap<String, String>,
    secret: &str,
) -> Result<(), FlickrError> {
    params.remove(OAUTH_SIGNATURE);
    let base = base_string(verb, url, params);
    log::trace!("Signature base string: {}", base);
    params.insert(OAUTH_SIGNATURE.to_string(), signature(&base, secret)?);
    Ok(())
}

/// Serializes the parameters as `key=value&key=value` for a query string or form body.
///
/// Ordering carries no meaning on the wire, keys are emitted sorted so output is stable.
pub fn encode_query(params: &HashMap<String, String>) -> String {
    let mut pairs: Vec<(&String, &String)> = params.iter().collect();
    pairs.sort();
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", percent_encode(k), percent_encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}
