pub mod collect;
pub mod config;
pub mod context;
pub mod error;
pub mod filter;
pub mod images;
pub mod links;
pub mod models;
pub mod pagination;
mod patterns;
pub mod resolve;
pub mod rule;
pub mod source;
pub mod testutil;
pub mod traits;

pub use collect::Collector;
pub use config::{CompiledConfig, ExtractionConfig, JoinMode, PaginationMode, SourceType};
pub use context::{CrawlContext, VisitedSet};
pub use error::AppError;
pub use models::{CandidateLink, ExtractedRecord, compute_hash};
pub use traits::{Fetcher, Transcoder};
