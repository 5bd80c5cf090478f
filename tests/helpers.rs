/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use flickr::rest::{Client, Config, Creds, TokenCache};
use std::time::Duration;

pub(crate) const CONSUMER_KEY: &str = "k";
pub(crate) const ACCESS_TOKEN: &str = "t";
pub(crate) const SECRET: &str = "s";

#[allow(dead_code)]
pub(crate) fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Config pointing at the mock server with a fast retry policy
#[allow(dead_code)]
pub(crate) fn mock_config(server: &mockito::Server) -> Config {
    Config::new(Creds::from_composite_secret(
        CONSUMER_KEY,
        ACCESS_TOKEN,
        SECRET,
    ))
    .with_base_url(&server.url())
    .with_retry(3, Duration::from_millis(5))
}

#[allow(dead_code)]
pub(crate) fn mock_client(server: &mockito::Server) -> Client {
    Client::new(mock_config(server)).unwrap()
}

#[allow(dead_code)]
pub(crate) fn ok_envelope(payload: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n<rsp stat=\"ok\">\n{}\n</rsp>\n",
        payload
    )
}

#[allow(dead_code)]
pub(crate) fn fail_envelope(code: &str, msg: &str) -> String {
    format!(
        concat!(
            "<?xml version=\"1.0\" encoding=\"utf-8\" ?>\n",
            "<rsp stat=\"fail\">\n\t<err code=\"{}\" msg=\"{}\" />\n</rsp>\n"
        ),
        code,
        msg
    )
}

/// Value of a plain multipart form field in a recorded request body
#[allow(dead_code)]
pub(crate) fn multipart_field(body: &[u8], name: &str) -> Option<String> {
    let body = String::from_utf8_lossy(body);
    let marker = format!("name=\"{}\"\r\n\r\n", name);
    let start = body.find(&marker)? + marker.len();
    let len = body[start..].find("\r\n")?;
    Some(body[start..start + len].to_string())
}

#[allow(dead_code)]
pub(crate) fn get_full_auth_tokens() -> anyhow::Result<Creds> {
    let api_key = std::env::var("FLICKR_API_KEY")?;
    let api_secret = std::env::var("FLICKR_API_SECRET")?;
    let token_cache = std::env::var("FLICKR_AUTH_CACHE")?;
    let tokens = TokenCache::from_file(token_cache)?;

    Ok(Creds::from_tokens(
        &api_key,
        Some(&api_secret),
        Some(&tokens.token),
        Some(&tokens.secret),
    ))
}
