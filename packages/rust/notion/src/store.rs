//! The row store trait.

use async_trait::async_trait;

use blogdraft_shared::{Result, Row};

/// Notion accepts at most this many children per append request.
pub const MAX_BLOCKS_PER_APPEND: usize = 100;

/// Query/update/append operations against the row store.
///
/// Implementations return errors unchanged; the caller decides whether a
/// failure is fatal.
#[async_trait]
pub trait RowStore: Send + Sync {
    /// All rows whose checkbox column `column` is false, in store order.
    async fn query_unchecked(&self, column: &str) -> Result<Vec<Row>>;

    /// Set the checkbox column `column` of `row_id`. Idempotent.
    async fn set_checkbox(&self, row_id: &str, column: &str, value: bool) -> Result<()>;

    /// Append one paragraph block per chunk to the page body, in order.
    async fn append_paragraphs(&self, row_id: &str, chunks: &[String]) -> Result<()>;
}
