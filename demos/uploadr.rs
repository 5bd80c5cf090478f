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
use flickr::rest::{Client, Collection, Creds, Photo, Photoset, TokenCache};
use std::path::{Path, PathBuf};

// Flickr error code for a set that is already part of the collection
const SET_ALREADY_IN_COLLECTION: &str = "4";

// Collects the JPEG files directly under `dir`, sorted by name
fn jpegs_in(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file())
        .filter(|path| mime_guess::from_path(path).first() == Some(mime_guess::mime::IMAGE_JPEG))
        .collect();
    files.sort();
    Ok(files)
}

async fn upload_into_album(
    client: &Client,
    files: &[PathBuf],
    album_title: &str,
) -> Result<Photoset> {
    let mut album = Photoset::find_by_title(client.clone(), album_title).await?;

    for path in files {
        let photo_id = Photo::upload(client, path, "image/jpeg").await?;
        println!("Uploaded {} as {}", path.display(), photo_id);

        // A new album is created around its first photo
        match &album {
            Some(set) => set.add_photo(&photo_id).await?,
            None => {
                let set = Photoset::create(client.clone(), album_title, &photo_id).await?;
                println!("Created album {} ({})", set.title, set.id);
                album = Some(set);
            }
        }
    }

    match album {
        Some(set) => Ok(set),
        None => bail!("No photos were uploaded to {}", album_title),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let (Some(dir), Some(album_title)) = (args.next(), args.next()) else {
        bail!("usage: uploadr <directory> <album title> [collection id]");
    };
    let collection_id = args.next();

    let api_key = std::env::var("FLICKR_API_KEY")?;
    let api_secret = std::env::var("FLICKR_API_SECRET")?;
    let token_cache = std::env::var("FLICKR_AUTH_CACHE")?;
    let tokens = TokenCache::from_file(token_cache)?;

    let client = Client::from_creds(Creds::from_tokens(
        &api_key,
        Some(&api_secret),
        Some(&tokens.token),
        Some(&tokens.secret),
    ))?;

    let files = jpegs_in(Path::new(&dir))?;
    if files.is_empty() {
        bail!("No JPEG files found in {}", dir);
    }
    let album = upload_into_album(&client, &files, &album_title).await?;

    if let Some(collection_id) = collection_id {
        match Collection::add_photoset_with_client(client, &collection_id, &album.id).await {
            Ok(()) => println!("Added album {} to collection {}", album.id, collection_id),
            Err(e) if e.api_code() == Some(SET_ALREADY_IN_COLLECTION) => {
                println!("Album {} already in collection {}", album.id, collection_id)
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}
