#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("http fetch failed for {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("cache read/write failed at {path}: {source}")]
    Cache {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("xlsx read failed for {path}: {source}")]
    Xlsx {
        path: String,
        #[source]
        source: calamine::Error,
    },
    #[error("tsv read failed for {path}: {source}")]
    Tsv {
        path: String,
        #[source]
        source: csv::Error,
    },
    #[error("{0}")]
    Pipeline(#[from] risk_core::PipelineError),
}
