//! News content served by the service.
//!
//! # Data Flow
//! ```text
//! NEWS_ITEMS (compiled in)
//!     → NewsFeed::new() (encode once at server construction)
//!     → shared Bytes in AppState
//!     → cloned into every response body
//! ```

pub mod feed;

pub use feed::{NewsFeed, NewsItem, NEWS_ITEMS};
