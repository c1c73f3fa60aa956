//! Draft generation and pipeline orchestration for blogdraft.
//!
//! This crate ties the row store and the generation provider together into
//! the end-to-end run (`run_pipeline`).

pub mod chunk;
pub mod draft;
pub mod pipeline;

#[cfg(test)]
mod testing;

pub use chunk::split_chunks;
pub use draft::{PromptContext, build_prompt, generate_draft, primary_keyword};
pub use pipeline::{
    PipelineOptions, ProgressReporter, RunReport, SilentProgress, fetch_unprocessed_rows, persist,
    run_pipeline,
};
