/*
 * Copyright (c) 2025 Craig Hamilton and Contributors.
 * Licensed under either of
 *  - Apache License, Version 2.0 <http://www.apache.org/licenses/LICENSE-2.0> OR
 *  - MIT license <http://opensource.org/licenses/MIT>
 *  at your option.
 */
use crate::rest::errors::FlickrError;
use crate::rest::{Client, Verb};
use serde::Deserialize;

/// A collection of photosets (and possibly of other collections).
///
/// See [Flickr API Docs](https://www.flickr.com/services/api/flickr.collections.getTree.html)
/// for more details on the individual fields.
#[derive(Deserialize, Debug, Clone)]
pub struct Collection {
    #[serde(skip)]
    pub(crate) client: Option<Client>,

    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@title", default)]
    pub title: String,

    #[serde(rename = "set", default)]
    pub sets: Vec<CollectionSet>,

    #[serde(rename = "collection", default)]
    pub collections: Vec<Collection>,
}

/// Reference to a photoset inside a collection
#[derive(Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct CollectionSet {
    #[serde(rename = "@id")]
    pub id: String,

    #[serde(rename = "@title", default)]
    pub title: String,
}

impl Collection {
    /// Returns the collection tree of the authenticated user
    pub async fn list(client: Client) -> Result<Vec<Self>, FlickrError> {
        let resp: CollectionsResponse = client
            .call_as(Verb::Get, "flickr.collections.getTree", &[])
            .await?;
        Ok(resp
            .collections
            .into_iter()
            .map(|mut v| {
                v.attach(&client);
                v
            })
            .collect())
    }

    /// Adds a photoset to the collection with the given id.
    ///
    /// Adding a set that is already in the collection is reported by the API as an error, see
    /// [`FlickrError::api_code`].
    pub async fn add_photoset_with_client(
        client: Client,
        collection_id: &str,
        photoset_id: &str,
    ) -> Result<(), FlickrError> {
        client
            .call(
                Verb::Post,
                "flickr.collections.addSet",
                &[("collection_id", collection_id), ("photoset_id", photoset_id)],
            )
            .await?;
        Ok(())
    }

    /// Adds a photoset to this collection
    pub async fn add_photoset(&self, photoset_id: &str) -> Result<(), FlickrError> {
        let client = self
            .client
            .as_ref()
            .ok_or(FlickrError::ClientNotFound())?
            .clone();
        Self::add_photoset_with_client(client, &self.id, photoset_id).await
    }

    /// True if the photoset is directly in this collection
    pub fn contains_photoset(&self, photoset_id: &str) -> bool {
        self.sets.iter().any(|s| s.id == photoset_id)
    }

    fn attach(&mut self, client: &Client) {
        self.client = Some(client.clone());
        for child in self.collections.iter_mut() {
            child.attach(client);
        }
    }
}

// Expected payload of a collections.getTree request
#[derive(Deserialize, Debug)]
struct CollectionsResponse {
    #[serde(rename = "collection", default)]
    collections: Vec<Collection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_payload_deserializes() {
        let resp: CollectionsResponse = quick_xml::de::from_str(
            r#"<collections>
  <collection id="12-72157594586579649" title="All My Photos" description="a collection">
    <set id="92157594171298291" title="kitesurfing" description=""/>
    <set id="72157594247596158" title="faves" description=""/>
  </collection>
  <collection id="12-1" title="Nested">
    <collection id="12-2" title="Inner"/>
  </collection>
</collections>"#,
        )
        .unwrap();
        assert_eq!(resp.collections.len(), 2);
        let first = &resp.collections[0];
        assert_eq!(first.title, "All My Photos");
        assert_eq!(first.sets.len(), 2);
        assert!(first.contains_photoset("72157594247596158"));
        assert!(!first.contains_photoset("1"));
        assert_eq!(resp.collections[1].collections[0].id, "12-2");
    }

    #[test]
    fn empty_tree() {
        let resp: CollectionsResponse = quick_xml::de::from_str("<collections/>").unwrap();
        assert!(resp.collections.is_empty());
    }
}
