//! Pipeline-wide error type. Each variant corresponds to one of the error
//! kinds in the component design: fail-fast kinds are propagated as
//! `PipelineError`; per-row data-quality issues (ParseWarning, EmptyPartition)
//! are not represented here — they are filtered or logged at the call site.

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("missing input: {0}")]
    MissingInput(String),

    #[error("schema mismatch in {source}: {detail}")]
    SchemaMismatch { source: String, detail: String },

    #[error("model release date missing for: {0:?}")]
    ModelReleaseMissing(Vec<String>),
}
