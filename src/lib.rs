/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */

//! # Flickr
//!
//! This library was created for working with the Flickr REST API.
//!
//! For further details on the Rest API refer to the [Flickr API Docs](https://www.flickr.com/services/api/)
//!
//! ## Features
//!
//! - OAuth1 HMAC-SHA1 request signing
//! - GET and form POST calls with the XML response envelope checked for API errors
//! - Photo upload and replace with the file streamed rather than loaded into memory
//! - Streaming download of originals
//! - Bounded retries with exponential backoff
//! - Photosets
//!     - List, create, add photos
//!     - Stream the photos contained in a photoset
//! - Collections
//!     - List the collection tree, add photosets
//!
//! *The Flickr API uses OAuth1. This library handles the request signing.
//! Getting the Access Token/Secret is left up to the consumer of this library*
//!
//! *If you want to use this library for more that is currently implemented,
//! [`rest::Client::call`] and [`rest::ApiClient`] make request/responses in a more direct way*
//!
//! ## Usage
//!
//! **You will need to acquire an API key/secret from Flickr prior to using the API**
//!
//! ```rust,no_run
//! use flickr::rest::{Client, Creds, Photo, Photoset};
//!
//! async fn upload_to_album(
//!     api_key: &str,
//!     api_secret: &str,
//!     access_token: &str,
//!     access_token_secret: &str,
//!     album: &str,
//!     path: &str,
//! ) -> anyhow::Result<()> {
//!     // The API key/secret is obtained from your Flickr account
//!     // The Access Token/Secret is obtained via Oauth1 process external to this
//!     let client = Client::from_creds(Creds::from_tokens(
//!         api_key,
//!         Some(api_secret),
//!         Some(access_token),
//!         Some(access_token_secret),
//!     ))?;
//!
//!     let photo_id = Photo::upload(&client, path, "image/jpeg").await?;
//!     match Photoset::find_by_title(client.clone(), album).await? {
//!         Some(set) => set.add_photo(&photo_id).await?,
//!         None => {
//!             Photoset::create(client.clone(), album, &photo_id).await?;
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
pub mod rest;
