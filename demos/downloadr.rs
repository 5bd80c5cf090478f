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
use flickr::rest::{Client, Creds, Photoset, TokenCache};
use futures::{StreamExt, pin_mut};
use std::path::Path;

// Downloads every original of the album into `<dir>/<album title>/`
async fn download_album(client: &Client, album: &Photoset, dir: &Path) -> Result<usize> {
    let folder = dir.join(&album.title);
    tokio::fs::create_dir_all(&folder).await?;

    let photos = album.photos()?;
    pin_mut!(photos);
    let mut count = 0;
    while let Some(photo) = photos.next().await {
        let path = photo?.download(client, &folder).await?;
        println!("  {}", path.display());
        count += 1;
    }
    Ok(count)
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let Some(dir) = args.next() else {
        bail!("usage: downloadr <directory> [album title]...");
    };
    let wanted: Vec<String> = args.collect();

    let api_key = std::env::var("FLICKR_API_KEY")?;
    let api_secret = std::env::var("FLICKR_API_SECRET")?;
    let tokens = TokenCache::from_file(std::env::var("FLICKR_AUTH_CACHE")?)?;
    let client = Client::from_creds(Creds::from_tokens(
        &api_key,
        Some(&api_secret),
        Some(&tokens.token),
        Some(&tokens.secret),
    ))?;

    for album in Photoset::list(client.clone()).await? {
        if !wanted.is_empty() && !wanted.contains(&album.title) {
            continue;
        }
        // Albums fetched on an earlier run are left alone
        if Path::new(&dir).join(&album.title).exists() {
            println!("Skipped {}", album.title);
            continue;
        }
        println!("Downloading {}", album.title);
        let count = download_album(&client, &album, Path::new(&dir)).await?;
        println!("Downloaded {} photos from {}", count, album.title);
    }
    Ok(())
}
