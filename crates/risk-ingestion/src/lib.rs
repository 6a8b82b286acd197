pub mod benchmark;
pub mod employment;
pub mod error;
pub mod fetch;
pub mod taxonomy;
pub mod tool_sources;

pub use error::IngestError;
pub use fetch::{CachingHttpFetcher, Fetcher, StaticFetcher};
