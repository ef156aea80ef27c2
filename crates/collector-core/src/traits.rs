use std::future::Future;

use crate::error::AppError;

/// Fetches the raw bytes of a page or feed.
///
/// Timeouts and transport policy belong to the implementation; the engine
/// treats any `Err` as "no data for this URL".
pub trait Fetcher: Send + Sync + Clone {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, AppError>> + Send;
}

/// Decodes fetched bytes from a source charset into UTF-8.
pub trait Transcoder: Send + Sync + Clone {
    /// Decode `bytes` labelled with `charset`. A UTF-8 label is a plain decode.
    fn transcode(&self, bytes: &[u8], charset: &str) -> Result<String, AppError>;
}

/// Returns true if `charset` names UTF-8 (or is empty, meaning the default).
pub fn is_utf8_label(charset: &str) -> bool {
    let label = charset.trim();
    label.is_empty() || label.eq_ignore_ascii_case("utf-8") || label.eq_ignore_ascii_case("utf8")
}
