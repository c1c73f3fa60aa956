//! In-memory doubles for the row store and the generation provider.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use async_trait::async_trait;

use blogdraft_llm::{ChatCompletion, ChatRequest, ChatResponse};
use blogdraft_notion::RowStore;
use blogdraft_shared::{BlogDraftError, Result, Row};

/// Provider that replays scripted replies and records requests.
pub(crate) struct ScriptedLlm {
    replies: Mutex<VecDeque<Result<ChatResponse>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedLlm {
    pub(crate) fn new(replies: Vec<Result<ChatResponse>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn requests(&self) -> Vec<ChatRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub(crate) fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ChatCompletion for ScriptedLlm {
    async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(BlogDraftError::generation("no scripted reply left")))
    }
}

/// Row store kept in memory. Appends and flag updates mutate the rows.
#[derive(Default)]
pub(crate) struct MemoryStore {
    rows: Mutex<Vec<Row>>,
    appended: Mutex<HashMap<String, Vec<String>>>,
    /// Operations in call order, e.g. `append:p1`, `flag:p1`.
    log: Mutex<Vec<String>>,
    append_times: Mutex<Vec<tokio::time::Instant>>,
    fail_query: bool,
    fail_append_for: Option<String>,
}

impl MemoryStore {
    pub(crate) fn new(rows: Vec<Row>) -> Self {
        Self {
            rows: Mutex::new(rows),
            ..Default::default()
        }
    }

    pub(crate) fn failing_query() -> Self {
        Self {
            fail_query: true,
            ..Default::default()
        }
    }

    pub(crate) fn fail_append_for(mut self, row_id: &str) -> Self {
        self.fail_append_for = Some(row_id.to_string());
        self
    }

    pub(crate) fn row(&self, row_id: &str) -> Row {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == row_id)
            .cloned()
            .unwrap()
    }

    pub(crate) fn appended(&self, row_id: &str) -> Vec<String> {
        self.appended
            .lock()
            .unwrap()
            .get(row_id)
            .cloned()
            .unwrap_or_default()
    }

    pub(crate) fn log(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Clock readings taken at each append call.
    pub(crate) fn append_times(&self) -> Vec<tokio::time::Instant> {
        self.append_times.lock().unwrap().clone()
    }
}

#[async_trait]
impl RowStore for MemoryStore {
    async fn query_unchecked(&self, column: &str) -> Result<Vec<Row>> {
        if self.fail_query {
            return Err(BlogDraftError::store("HTTP 401 Unauthorized"));
        }
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| row.checkbox(column) == Some(false))
            .cloned()
            .collect())
    }

    async fn set_checkbox(&self, row_id: &str, column: &str, value: bool) -> Result<()> {
        self.log.lock().unwrap().push(format!("flag:{row_id}"));
        let mut rows = self.rows.lock().unwrap();
        let row = rows
            .iter_mut()
            .find(|r| r.id == row_id)
            .ok_or_else(|| BlogDraftError::store(format!("no such page {row_id}")))?;
        *row = std::mem::take(row).with_checkbox(column, value);
        Ok(())
    }

    async fn append_paragraphs(&self, row_id: &str, chunks: &[String]) -> Result<()> {
        self.log.lock().unwrap().push(format!("append:{row_id}"));
        self.append_times
            .lock()
            .unwrap()
            .push(tokio::time::Instant::now());
        if self.fail_append_for.as_deref() == Some(row_id) {
            return Err(BlogDraftError::Network(format!("append to {row_id} timed out")));
        }
        self.appended
            .lock()
            .unwrap()
            .entry(row_id.to_string())
            .or_default()
            .extend_from_slice(chunks);
        Ok(())
    }
}
