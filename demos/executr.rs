/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

extern crate flickr;

use anyhow::{Result, bail};
use dotenvy::dotenv;
use flickr::rest::{Client, Creds, TokenCache, Verb, parse_args};
use std::str::FromStr;

// Runs a single API method and prints the payload, e.g.
//   executr GET flickr.photosets.getPhotos "photoset_id=72157&page=2"
#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(verb), Some(method)) = (args.next(), args.next()) else {
        bail!("usage: executr <GET|POST> <method> [k=v&k2=v2]");
    };
    let verb = Verb::from_str(&verb)?;
    let extra = parse_args(&args.next().unwrap_or_default())?;
    let extra: Vec<(&str, &str)> = extra.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();

    let api_key = std::env::var("FLICKR_API_KEY")?;
    let api_secret = std::env::var("FLICKR_API_SECRET")?;
    let tokens = TokenCache::from_file(std::env::var("FLICKR_AUTH_CACHE")?)?;
    let client = Client::from_creds(Creds::from_tokens(
        &api_key,
        Some(&api_secret),
        Some(&tokens.token),
        Some(&tokens.secret),
    ))?;

    let payload = client.call(verb, &method, &extra).await?;
    println!("{}", payload.trim());
    Ok(())
}
