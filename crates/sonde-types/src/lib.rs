//! Types shared between the sonde core and its HTTP surface.

use facet::Facet;

/// One reachable diagnostic page, as shown on the index.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Documentation string of the page handler, if it has one.
    pub doc: Option<String>,

    /// Slug of the page, re-validated at listing time.
    pub slug: String,

    /// Owning application name, slugified.
    pub app_name: String,

    /// Human-readable label for the link.
    pub link_name: String,
}

impl IndexEntry {
    /// Path of the page relative to the mount prefix, with trailing slash.
    pub fn href(&self) -> String {
        format!("{}/{}/", self.app_name, self.slug)
    }
}

/// Keyed index entry, sorted by registry key.
#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct KeyedIndexEntry {
    pub key: String,
    pub entry: IndexEntry,
}

#[derive(Facet, Debug, Clone, PartialEq, Eq)]
pub struct IndexListing {
    pub title: String,
    pub entries: Vec<KeyedIndexEntry>,
}

#[derive(Facet, Debug, Clone)]
pub struct ApiError {
    pub error: String,
}
