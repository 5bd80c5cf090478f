/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::{Client, Photo, Verb};
use async_stream::try_stream;
use futures::Stream;
use serde::Deserialize;

/// Extra photo fields requested when listing a photoset
pub const PHOTO_EXTRAS: &str = "url_o,original_format";

/// Holds information returned from the photosets API.
///
/// See [Flickr API Docs](https://www.flickr.com/services/api/flickr.photosets.getList.html) for
/// more details on the individual fields.
#[derive(Deserialize, Debug, Clone)]
pub struct Photoset {
    #[serde(skip)]
    pub(crate) client: Option<Client>,

    #[serde(rename = "@id")]
    pub id: String,

    // An element in list responses, an attribute in photo listings
    #[serde(rename = "title", alias = "@title", default)]
    pub title: String,

    #[serde(rename = "@primary", default)]
    pub primary: Option<String>,

    #[serde(rename = "@photos", default)]
    pub photo_count: Option<u64>,

    #[serde(rename = "@url", default)]
    pub url: Option<String>,
}

impl Photoset {
    /// Returns all photosets of the authenticated user
    pub async fn list(client: Client) -> Result<Vec<Self>, FlickrError> {
        let resp: PhotosetsResponse = client
            .call_as(Verb::Get, "flickr.photosets.getList", &[])
            .await?;
        Ok(resp
            .photosets
            .into_iter()
            .map(|mut v| {
                v.client = Some(client.clone());
                v
            })
            .collect())
    }

    /// Returns the first photoset with exactly this title
    pub async fn find_by_title(client: Client, title: &str) -> Result<Option<Self>, FlickrError> {
        Ok(Self::list(client)
            .await?
            .into_iter()
            .find(|set| set.title == title))
    }

    /// Creates a photoset. Flickr requires every set to start with a primary photo.
    pub async fn create(
        client: Client,
        title: &str,
        primary_photo_id: &str,
    ) -> Result<Self, FlickrError> {
        let mut set: Photoset = client
            .call_as(
                Verb::Post,
                "flickr.photosets.create",
                &[("title", title), ("primary_photo_id", primary_photo_id)],
            )
            .await?;
        if set.title.is_empty() {
            set.title = title.to_string();
        }
        set.primary = Some(primary_photo_id.to_string());
        set.client = Some(client);
        Ok(set)
    }

    /// Adds a photo to this photoset
    pub async fn add_photo(&self, photo_id: &str) -> Result<(), FlickrError> {
        self.client()?
            .call(
                Verb::Post,
                "flickr.photosets.addPhoto",
                &[("photoset_id", self.id.as_str()), ("photo_id", photo_id)],
            )
            .await?;
        Ok(())
    }

    /// Streams the photos in this photoset, one page at a time
    pub fn photos(&self) -> Result<impl Stream<Item = Result<Photo, FlickrError>>, FlickrError> {
        Ok(self.photos_with_client(self.client()?.clone()))
    }

    /// Streams the photos in this photoset using the provided client
    pub fn photos_with_client(
        &self,
        client: Client,
    ) -> impl Stream<Item = Result<Photo, FlickrError>> + use<> {
        let photoset_id = self.id.clone();
        try_stream! {
            let mut page: u32 = 1;
            loop {
                let page_str = page.to_string();
                let resp: PhotosetPhotosResponse = client.call_as(
                    Verb::Get,
                    "flickr.photosets.getPhotos",
                    &[
                        ("photoset_id", photoset_id.as_str()),
                        ("extras", PHOTO_EXTRAS),
                        ("page", page_str.as_str()),
                    ],
                ).await?;

                let is_done = resp.photos.is_empty() || page >= resp.pages;
                for photo in resp.photos {
                    yield photo;
                }
                if is_done {
                    break;
                }
                page += 1;
            }
        }
    }

    fn client(&self) -> Result<&Client, FlickrError> {
        self.client.as_ref().ok_or(FlickrError::ClientNotFound())
    }
}

// Expected payload of a photosets.getList request
#[derive(Deserialize, Debug)]
struct PhotosetsResponse {
    #[serde(rename = "photoset", default)]
    photosets: Vec<Photoset>,
}

// Expected payload of one page of a photosets.getPhotos request
#[derive(Deserialize, Debug)]
struct PhotosetPhotosResponse {
    #[serde(rename = "@pages", default = "one")]
    pages: u32,

    #[serde(rename = "photo", default)]
    photos: Vec<Photo>,
}

fn one() -> u32 {
    1
}
