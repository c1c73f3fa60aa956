//! Row store boundary backed by a Notion database.
//!
//! - [`RowStore`]: the three operations the pipeline needs (query, flag, append)
//! - [`NotionClient`]: the Notion REST implementation

mod client;
mod store;

pub use client::{NOTION_VERSION, NotionClient, NotionClientConfig};
pub use store::{MAX_BLOCKS_PER_APPEND, RowStore};
