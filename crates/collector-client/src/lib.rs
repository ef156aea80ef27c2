pub mod fetcher;
pub mod settings;
pub mod transcoder;

pub use fetcher::ReqwestFetcher;
pub use settings::{FetchSettings, parse_flag};
pub use transcoder::EncodingTranscoder;
