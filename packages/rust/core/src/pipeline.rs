//! End-to-end run: fetch unwritten rows → generate → persist.

use std::time::{Duration, Instant};

use tracing::{error, info, instrument, warn};

use blogdraft_llm::ChatCompletion;
use blogdraft_notion::RowStore;
use blogdraft_shared::{AppConfig, ColumnsConfig, FieldKind, Result, Row};

use crate::chunk::split_chunks;
use crate::draft::{PromptContext, generate_draft};

/// Settings for one pipeline run.
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Chat model used for drafting.
    pub model: String,
    /// Database column names.
    pub columns: ColumnsConfig,
    /// Pause between a successful generation and the write-back.
    pub delay: Duration,
    /// Maximum UTF-16 code units per appended block.
    pub chunk_size: usize,
}

impl From<&AppConfig> for PipelineOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            model: config.openai.model.clone(),
            columns: config.notion.columns.clone(),
            delay: config.pipeline.delay(),
            chunk_size: config.pipeline.chunk_size,
        }
    }
}

/// Outcome of a pipeline run.
#[derive(Debug, Default)]
pub struct RunReport {
    /// Unwritten rows returned by the store.
    pub fetched: usize,
    /// Rows whose draft was appended and flagged.
    pub written: usize,
    /// Rows left untouched (blank name or empty draft).
    pub skipped: usize,
    /// Rows that failed, as (row id, error message).
    pub failures: Vec<(String, String)>,
    pub elapsed: Duration,
}

impl RunReport {
    /// True when no row failed.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called before a row is processed.
    fn row_started(&self, label: &str, current: usize, total: usize);
    /// Called when the run completes.
    fn done(&self, report: &RunReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn row_started(&self, _label: &str, _current: usize, _total: usize) {}
    fn done(&self, _report: &RunReport) {}
}

#[derive(Debug, PartialEq, Eq)]
enum RowOutcome {
    Written { chunks: usize },
    Skipped(SkipReason),
}

/// Why a row was left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SkipReason {
    BlankTitle,
    EmptyDraft,
}

/// All rows whose written flag is unchecked, in store order.
pub async fn fetch_unprocessed_rows(
    store: &dyn RowStore,
    columns: &ColumnsConfig,
) -> Result<Vec<Row>> {
    store.query_unchecked(&columns.written).await
}

/// Write a non-empty draft back to its row.
///
/// The text is appended first and the written flag set afterwards, so a
/// failed append leaves the row unwritten and it is picked up again on the
/// next run. Returns the number of blocks appended.
#[instrument(skip_all, fields(row_id = %row.id))]
pub async fn persist(
    store: &dyn RowStore,
    row: &Row,
    draft: &str,
    options: &PipelineOptions,
) -> Result<usize> {
    let chunks = split_chunks(draft, options.chunk_size);
    store.append_paragraphs(&row.id, &chunks).await?;
    store
        .set_checkbox(&row.id, &options.columns.written, true)
        .await?;
    Ok(chunks.len())
}

/// Run the pipeline once over every unwritten row.
///
/// Failing to list rows aborts the run. A failure on a single row is logged
/// and recorded in the report; the remaining rows are still processed.
#[instrument(skip_all, fields(model = %options.model))]
pub async fn run_pipeline(
    store: &dyn RowStore,
    llm: &dyn ChatCompletion,
    options: &PipelineOptions,
    progress: &dyn ProgressReporter,
) -> Result<RunReport> {
    let start = Instant::now();

    progress.phase("Fetching unwritten rows");
    let rows = fetch_unprocessed_rows(store, &options.columns).await?;
    info!(rows = rows.len(), "fetched unwritten rows");

    let mut report = RunReport {
        fetched: rows.len(),
        ..Default::default()
    };

    let total = rows.len();
    for (i, row) in rows.iter().enumerate() {
        let label = row_label(row, &options.columns);
        progress.row_started(&label, i + 1, total);

        match process_row(store, llm, options, row).await {
            Ok(RowOutcome::Written { chunks }) => {
                info!(row_id = %row.id, restaurant = %label, chunks, "draft written");
                report.written += 1;
            }
            Ok(RowOutcome::Skipped(reason)) => {
                match reason {
                    SkipReason::BlankTitle => warn!(
                        row_id = %row.id,
                        column = %options.columns.title,
                        "restaurant name is blank, skipping row"
                    ),
                    SkipReason::EmptyDraft => warn!(
                        row_id = %row.id,
                        restaurant = %label,
                        "generated draft is empty, skipping row"
                    ),
                }
                report.skipped += 1;
            }
            Err(e) => {
                error!(row_id = %row.id, restaurant = %label, error = %e, "row failed");
                report.failures.push((row.id.clone(), e.to_string()));
            }
        }
    }

    report.elapsed = start.elapsed();
    progress.done(&report);

    info!(
        fetched = report.fetched,
        written = report.written,
        skipped = report.skipped,
        failed = report.failures.len(),
        elapsed_ms = report.elapsed.as_millis(),
        "pipeline complete"
    );

    Ok(report)
}

async fn process_row(
    store: &dyn RowStore,
    llm: &dyn ChatCompletion,
    options: &PipelineOptions,
    row: &Row,
) -> Result<RowOutcome> {
    if PromptContext::from_row(row, &options.columns).is_none() {
        return Ok(RowOutcome::Skipped(SkipReason::BlankTitle));
    }

    let draft = generate_draft(llm, &options.model, &options.columns, row).await?;
    if draft.trim().is_empty() {
        return Ok(RowOutcome::Skipped(SkipReason::EmptyDraft));
    }

    if !options.delay.is_zero() {
        tokio::time::sleep(options.delay).await;
    }

    let chunks = persist(store, row, &draft, options).await?;
    Ok(RowOutcome::Written { chunks })
}

/// Restaurant name for logs, falling back to the page id.
fn row_label(row: &Row, columns: &ColumnsConfig) -> String {
    let name = row.text(&columns.title, FieldKind::Title);
    if name.trim().is_empty() {
        row.id.clone()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MemoryStore, ScriptedLlm};
    use blogdraft_llm::ChatResponse;
    use blogdraft_shared::BlogDraftError;

    fn options() -> PipelineOptions {
        PipelineOptions {
            model: "gpt-4".into(),
            columns: ColumnsConfig::default(),
            delay: Duration::ZERO,
            chunk_size: 2000,
        }
    }

    fn row(id: &str, title: &str, menu: &str) -> Row {
        let c = ColumnsConfig::default();
        Row::new(id)
            .with_title(&c.title, title)
            .with_rich_text(&c.menu, menu)
            .with_checkbox(&c.written, false)
    }

    fn written(store: &MemoryStore, id: &str) -> Option<bool> {
        store.row(id).checkbox(&ColumnsConfig::default().written)
    }

    #[tokio::test]
    async fn writes_draft_and_flags_row() {
        let store = MemoryStore::new(vec![row("p1", "Test House", "kimchi stew")]);
        let draft = "오늘은 Test House에 다녀왔어요~";
        let llm = ScriptedLlm::new(vec![Ok(ChatResponse::from_text(draft))]);

        let report = run_pipeline(&store, &llm, &options(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.fetched, 1);
        assert_eq!(report.written, 1);
        assert!(report.is_clean());

        let requests = llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].messages[1].content.contains("Test House"));
        assert!(requests[0].messages[1].content.contains("kimchi stew"));

        assert_eq!(written(&store, "p1"), Some(true));
        let blocks = store.appended("p1");
        assert!(!blocks.is_empty());
        assert_eq!(blocks.concat(), draft);
    }

    #[tokio::test]
    async fn blank_title_is_skipped_untouched() {
        let store = MemoryStore::new(vec![row("p1", "", "")]);
        let llm = ScriptedLlm::new(vec![]);

        let report = run_pipeline(&store, &llm, &options(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert_eq!(report.written, 0);
        assert_eq!(llm.call_count(), 0);
        assert!(store.log().is_empty());
        assert_eq!(written(&store, "p1"), Some(false));
    }

    #[tokio::test]
    async fn whitespace_draft_is_not_persisted() {
        let store = MemoryStore::new(vec![row("p1", "Test House", "")]);
        let llm = ScriptedLlm::new(vec![Ok(ChatResponse::from_text("  \n\t "))]);

        let report = run_pipeline(&store, &llm, &options(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.skipped, 1);
        assert!(store.log().is_empty());
        assert_eq!(written(&store, "p1"), Some(false));
    }

    #[tokio::test]
    async fn long_draft_is_split_into_blocks() {
        let store = MemoryStore::new(vec![row("p1", "Test House", "")]);
        let draft = "가".repeat(4500);
        let llm = ScriptedLlm::new(vec![Ok(ChatResponse::from_text(draft.clone()))]);

        run_pipeline(&store, &llm, &options(), &SilentProgress)
            .await
            .unwrap();

        let blocks = store.appended("p1");
        assert_eq!(blocks.len(), 3);
        assert!(blocks.iter().all(|b| b.chars().count() <= 2000));
        assert_eq!(blocks.concat(), draft);
    }

    #[tokio::test]
    async fn appends_before_flagging() {
        let store = MemoryStore::new(vec![row("p1", "Test House", "")]);
        let llm = ScriptedLlm::new(vec![Ok(ChatResponse::from_text("draft"))]);

        run_pipeline(&store, &llm, &options(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(store.log(), vec!["append:p1", "flag:p1"]);
    }

    #[tokio::test]
    async fn failed_row_does_not_abort_batch() {
        let store = MemoryStore::new(vec![
            row("p1", "First", ""),
            row("p2", "Second", ""),
            row("p3", "Third", ""),
        ])
        .fail_append_for("p1");
        let llm = ScriptedLlm::new(vec![
            Ok(ChatResponse::from_text("one")),
            Err(BlogDraftError::generation("HTTP 429: rate limited")),
            Ok(ChatResponse::from_text("three")),
        ]);

        let report = run_pipeline(&store, &llm, &options(), &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.fetched, 3);
        assert_eq!(report.written, 1);
        assert_eq!(report.failures.len(), 2);
        assert!(!report.is_clean());
        assert_eq!(report.failures[0].0, "p1");
        assert_eq!(report.failures[1].0, "p2");

        // Append failed, so the flag was never set.
        assert_eq!(written(&store, "p1"), Some(false));
        assert_eq!(written(&store, "p2"), Some(false));
        assert_eq!(written(&store, "p3"), Some(true));
        assert_eq!(store.appended("p3"), vec!["three"]);
    }

    #[tokio::test]
    async fn query_failure_aborts_run() {
        let store = MemoryStore::failing_query();
        let llm = ScriptedLlm::new(vec![]);

        let err = run_pipeline(&store, &llm, &options(), &SilentProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, BlogDraftError::Store(_)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn already_written_rows_are_not_fetched() {
        let c = ColumnsConfig::default();
        let done = row("p0", "Done", "").with_checkbox(&c.written, true);
        let store = MemoryStore::new(vec![done, row("p1", "Pending", "")]);

        let rows = fetch_unprocessed_rows(&store, &c).await.unwrap();
        let ids: Vec<&str> = rows.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["p1"]);
    }

    #[tokio::test]
    async fn persist_is_idempotent_on_flag() {
        let c = ColumnsConfig::default();
        let r = row("p1", "Test House", "").with_checkbox(&c.written, true);
        let store = MemoryStore::new(vec![r.clone()]);

        let blocks = persist(&store, &r, "draft", &options()).await.unwrap();
        assert_eq!(blocks, 1);
        assert_eq!(written(&store, "p1"), Some(true));
    }

    #[tokio::test]
    async fn skip_reasons_are_distinguished() {
        let store = MemoryStore::new(vec![]);
        let llm = ScriptedLlm::new(vec![Ok(ChatResponse::from_text(" "))]);

        let blank = process_row(&store, &llm, &options(), &row("p1", " ", "")).await.unwrap();
        assert_eq!(blank, RowOutcome::Skipped(SkipReason::BlankTitle));
        assert_eq!(llm.call_count(), 0);

        let empty = process_row(&store, &llm, &options(), &row("p2", "Test House", ""))
            .await
            .unwrap();
        assert_eq!(empty, RowOutcome::Skipped(SkipReason::EmptyDraft));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn pauses_before_append_only_for_written_rows() {
        let delay = Duration::from_millis(1500);
        let opts = PipelineOptions {
            delay,
            ..options()
        };
        let store = MemoryStore::new(vec![
            row("p1", "", ""),
            row("p2", "Empty Draft", ""),
            row("p3", "Test House", ""),
        ]);
        let llm = ScriptedLlm::new(vec![
            Ok(ChatResponse::from_text("")),
            Ok(ChatResponse::from_text("draft")),
        ]);

        let start = tokio::time::Instant::now();
        let report = run_pipeline(&store, &llm, &opts, &SilentProgress)
            .await
            .unwrap();

        assert_eq!(report.written, 1);
        assert_eq!(report.skipped, 2);

        // Only the written row waited, and it waited before its append.
        let appends = store.append_times();
        assert_eq!(appends.len(), 1);
        assert_eq!(appends[0] - start, delay);
        assert_eq!(start.elapsed(), delay);
    }

    #[test]
    fn options_from_app_config() {
        let config = AppConfig::default();
        let opts = PipelineOptions::from(&config);
        assert_eq!(opts.model, "gpt-4");
        assert_eq!(opts.chunk_size, 2000);
        assert_eq!(opts.delay, Duration::from_millis(1000));
        assert_eq!(opts.columns.written, "작성됨");
    }

    #[test]
    fn row_label_falls_back_to_id() {
        let c = ColumnsConfig::default();
        assert_eq!(row_label(&row("p1", "Test House", ""), &c), "Test House");
        assert_eq!(row_label(&row("p1", "", ""), &c), "p1");
    }
}
