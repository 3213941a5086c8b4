//! Resource loading: URLs, the fetch seam and its default network implementation.

pub mod client;
pub mod http;
pub mod tls;
pub mod transport;
pub mod url;

use ln_core::LanternError;
use ln_core::LanternResult;
use std::collections::BTreeMap;
use std::collections::HashMap;

pub use client::NetFetcher;
pub use http::encode_form;
pub use url::ResourceUrl;
pub use url::Scheme;

/// A fetched resource, decoded to text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub status: u16,
    /// Case-folded header names.
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl FetchResponse {
    pub fn ok(body: impl Into<String>) -> Self {
        Self {
            status: 200,
            headers: BTreeMap::new(),
            body: body.into(),
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn is_success(&self) -> bool {
        (200..=299).contains(&self.status)
    }
}

/// Loads the bytes behind a URL. A `body` turns the request into a submission.
pub trait Fetch {
    fn fetch(&self, url: &ResourceUrl, body: Option<&str>) -> LanternResult<FetchResponse>;
}

/// Serves canned bodies keyed by absolute URL; anything else is not found.
#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    resources: HashMap<String, String>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, url: &str, body: impl Into<String>) -> Self {
        self.insert(url, body);
        self
    }

    pub fn insert(&mut self, url: &str, body: impl Into<String>) {
        let key = match ResourceUrl::parse(url) {
            Ok(parsed) => parsed.as_str().to_owned(),
            Err(_) => url.to_owned(),
        };
        self.resources.insert(key, body.into());
    }
}

impl Fetch for MemoryFetcher {
    fn fetch(&self, url: &ResourceUrl, _body: Option<&str>) -> LanternResult<FetchResponse> {
        self.resources
            .get(url.as_str())
            .map(|body| FetchResponse::ok(body.clone()))
            .ok_or_else(|| {
                LanternError::new("net.memory.not_found", format!("no resource at `{url}`"))
            })
    }
}
