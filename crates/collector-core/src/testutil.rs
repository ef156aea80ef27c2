//! Test utilities: mock implementations of the collaborator traits.
//!
//! Handwritten mocks for dependency injection in unit and integration tests.
//! All mocks use `Arc<Mutex<_>>` for interior mutability, allowing test
//! assertions on recorded calls.

#![allow(clippy::unwrap_used)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use crate::error::AppError;
use crate::traits::{Fetcher, Transcoder};

// ---------------------------------------------------------------------------
// MockFetcher
// ---------------------------------------------------------------------------

/// Mock fetcher serving pages from an in-memory URL map.
///
/// Unknown URLs fail with `HttpError` (as a 404 would); URLs registered with
/// [`with_timeout`](Self::with_timeout) fail with `Timeout`. Every request is
/// recorded, including failed ones.
#[derive(Clone, Default)]
pub struct MockFetcher {
    pages: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    timeouts: Arc<Mutex<HashSet<String>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `html` at `url`.
    pub fn with_page(self, url: &str, html: &str) -> Self {
        self.with_bytes(url, html.as_bytes().to_vec())
    }

    /// Serve raw `bytes` at `url` (e.g. a non-UTF-8 page).
    pub fn with_bytes(self, url: &str, bytes: Vec<u8>) -> Self {
        self.pages.lock().unwrap().insert(url.to_string(), bytes);
        self
    }

    /// Make requests for `url` time out.
    pub fn with_timeout(self, url: &str) -> Self {
        self.timeouts.lock().unwrap().insert(url.to_string());
        self
    }

    /// All requested URLs, in request order.
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// How many times `url` was requested.
    pub fn request_count(&self, url: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|u| *u == url)
            .count()
    }
}

impl Fetcher for MockFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, AppError> {
        self.requests.lock().unwrap().push(url.to_string());
        if self.timeouts.lock().unwrap().contains(url) {
            return Err(AppError::Timeout(30));
        }
        self.pages
            .lock()
            .unwrap()
            .get(url)
            .cloned()
            .ok_or_else(|| AppError::HttpError(format!("HTTP 404 for {url}")))
    }
}

// ---------------------------------------------------------------------------
// MockTranscoder
// ---------------------------------------------------------------------------

/// Mock transcoder that decodes lossily and records every charset it was asked for.
#[derive(Clone, Default)]
pub struct MockTranscoder {
    pub charsets: Arc<Mutex<Vec<String>>>,
    fail: Arc<Mutex<bool>>,
}

impl MockTranscoder {
    pub fn passthrough() -> Self {
        Self::default()
    }

    /// A transcoder that rejects every input.
    pub fn failing() -> Self {
        Self {
            charsets: Arc::new(Mutex::new(Vec::new())),
            fail: Arc::new(Mutex::new(true)),
        }
    }
}

impl Transcoder for MockTranscoder {
    fn transcode(&self, bytes: &[u8], charset: &str) -> Result<String, AppError> {
        self.charsets.lock().unwrap().push(charset.to_string());
        if *self.fail.lock().unwrap() {
            return Err(AppError::TranscodeError(format!("cannot decode {charset}")));
        }
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
