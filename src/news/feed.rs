//! The static news payload.

use axum::body::Bytes;
use serde::{Deserialize, Serialize};

/// A single news entry as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem<'a> {
    #[serde(rename = "Title")]
    pub title: &'a str,

    #[serde(rename = "Content")]
    pub content: &'a str,
}

/// Every news item the service knows about.
pub const NEWS_ITEMS: [NewsItem<'static>; 2] = [
    NewsItem {
        title: "News Service Complete",
        content: "Congratulations:Your News Service Complete",
    },
    NewsItem {
        title: "Total Ticket System Complete",
        content: "Just a total test",
    },
];

/// Pre-encoded JSON array of [`NEWS_ITEMS`].
///
/// Cloning is a reference-count bump, so each request gets its own handle
/// to the same immutable bytes.
#[derive(Debug, Clone)]
pub struct NewsFeed {
    payload: Bytes,
}

impl NewsFeed {
    /// Encode the built-in items.
    pub fn new() -> Result<Self, serde_json::Error> {
        Self::from_items(&NEWS_ITEMS)
    }

    /// Encode an arbitrary item list.
    pub fn from_items(items: &[NewsItem<'_>]) -> Result<Self, serde_json::Error> {
        let payload = serde_json::to_vec(items)?;
        Ok(Self {
            payload: Bytes::from(payload),
        })
    }

    /// The encoded payload.
    pub fn payload(&self) -> Bytes {
        self.payload.clone()
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }
}
