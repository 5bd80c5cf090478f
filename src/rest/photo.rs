/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::Client;
use crate::rest::errors::FlickrError;
use crate::rest::parsers::{from_empty_str_to_none, from_flag};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs::{File, OpenOptions};

/// A photo as listed inside a photoset.
///
/// See [Flickr API Docs](https://www.flickr.com/services/api/flickr.photosets.getPhotos.html)
/// for more details on the individual fields.
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@title", default)]
    pub title: String,

    #[serde(rename = "@isprimary", default, deserialize_with = "from_flag")]
    pub is_primary: bool,

    // Only present when requested through the `extras` argument
    #[serde(rename = "@url_o", default, deserialize_with = "from_empty_str_to_none")]
    pub url_o: Option<String>,

    #[serde(
        rename = "@originalformat",
        default,
        deserialize_with = "from_empty_str_to_none"
    )]
    pub original_format: Option<String>,
}

impl Photo {
    /// Uploads the file and returns the id of the new photo
    pub async fn upload(
        client: &Client,
        path: impl AsRef<Path>,
        content_type: &str,
    ) -> Result<String, FlickrError> {
        client.upload_photo(path, content_type).await
    }

    /// Replaces the content of the photo with `photo_id`
    pub async fn replace(
        client: &Client,
        photo_id: &str,
        path: impl AsRef<Path>,
        content_type: &str,
    ) -> Result<String, FlickrError> {
        client.replace_photo(photo_id, path, content_type).await
    }

    /// Downloads the original into `dir` and returns the path written.
    ///
    /// The file is named after [`Photo::file_name`], or the id for untitled photos. When that name
    /// is taken a counter is appended to the title (`title1.jpg`, `title2.jpg`, ...) so existing
    /// files are never overwritten.
    /// A failed download leaves no partial file behind.
    pub async fn download(
        &self,
        client: &Client,
        dir: impl AsRef<Path>,
    ) -> Result<PathBuf, FlickrError> {
        let url = self
            .url_o
            .as_deref()
            .ok_or_else(|| FlickrError::OriginalUnavailable(self.id.clone()))?;
        let (path, mut file) = self.create_unique(dir.as_ref()).await?;

        match client.api().download(url, &mut file).await {
            Ok(_) => Ok(path),
            Err(err) => {
                drop(file);
                if let Err(e) = tokio::fs::remove_file(&path).await {
                    log::warn!("Could not remove partial download {}: {}", path.display(), e);
                }
                Err(err)
            }
        }
    }

    async fn create_unique(&self, dir: &Path) -> Result<(PathBuf, File), FlickrError> {
        let mut index = 0u32;
        loop {
            let path = dir.join(self.numbered_file_name(index));
            match OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .await
            {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => index += 1,
                Err(e) => return Err(e.into()),
            }
        }
    }

    // Untitled photos are named after their id
    fn numbered_file_name(&self, index: u32) -> String {
        let mut name = match self.title.as_str() {
            "" => self.id.clone(),
            title => title.to_string(),
        };
        if index > 0 {
            name.push_str(&index.to_string());
        }
        if let Some(ext) = &self.original_format {
            name.push('.');
            name.push_str(ext);
        }
        name
    }

    /// Title with the file extension the original was uploaded with, if known
    pub fn file_name(&self) -> String {
        match &self.original_format {
            Some(ext) => format!("{}.{}", self.title, ext),
            None => self.title.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_from_attributes() {
        let photo: Photo = quick_xml::de::from_str(
            r#"<photo id="2484" secret="123456" server="1" title="my photo" isprimary="1"
                url_o="https://live.staticflickr.com/1/2484_o.jpg" originalformat="jpg"/>"#,
        )
        .unwrap();
        assert_eq!(photo.id, "2484");
        assert_eq!(photo.title, "my photo");
        assert!(photo.is_primary);
        assert_eq!(
            photo.url_o.as_deref(),
            Some("https://live.staticflickr.com/1/2484_o.jpg")
        );
        assert_eq!(photo.file_name(), "my photo.jpg");
    }

    #[test]
    fn numbered_names_keep_extension() {
        let photo: Photo =
            quick_xml::de::from_str(r#"<photo id="1" title="beach" originalformat="png"/>"#)
                .unwrap();
        assert_eq!(photo.numbered_file_name(0), "beach.png");
        assert_eq!(photo.numbered_file_name(2), "beach2.png");

        let untitled: Photo = quick_xml::de::from_str(r#"<photo id="77"/>"#).unwrap();
        assert_eq!(untitled.numbered_file_name(0), "77");
        assert_eq!(untitled.numbered_file_name(1), "771");
    }

    #[test]
    fn optional_attributes_default() {
        let photo: Photo = quick_xml::de::from_str(r#"<photo id="1" url_o=""/>"#).unwrap();
        assert_eq!(photo.title, "");
        assert!(!photo.is_primary);
        assert_eq!(photo.url_o, None);
        assert_eq!(photo.file_name(), "");
    }
}
