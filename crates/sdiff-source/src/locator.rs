//! Classification of user-supplied schema locations.

use std::path::{Path, PathBuf};

use reqwest::Url;

/// Where a schema snapshot comes from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Locator {
    /// An existing regular file holding a pre-fetched snapshot.
    File(PathBuf),
    /// A server location: an absolute URL or a path relative to a base URL.
    Remote(String),
}

impl Locator {
    /// A location naming an existing regular file is a file; anything else
    /// is treated as a server location.
    pub fn classify(raw: &str) -> Self {
        let path = Path::new(raw);
        if path.is_file() {
            Self::File(path.to_path_buf())
        } else {
            Self::Remote(raw.to_string())
        }
    }

    pub fn is_file(&self) -> bool {
        matches!(self, Self::File(_))
    }

    /// Whether `raw` parses as an absolute URL with a host.
    pub fn is_absolute_url(raw: &str) -> bool {
        Url::parse(raw).is_ok_and(|url| url.has_host())
    }
}

/// Join a base URL, a server-relative locator and an endpoint path.
///
/// Redundant slashes at the seams are collapsed; an empty locator addresses
/// the base URL itself.
pub fn join_url(base: &str, locator: &str, endpoint: &str) -> String {
    let mut url = base.trim_end_matches('/').to_string();
    let path = locator.trim_matches('/');
    if !path.is_empty() {
        url.push('/');
        url.push_str(path);
    }
    let endpoint = endpoint.trim_start_matches('/');
    if !endpoint.is_empty() {
        url.push('/');
        url.push_str(endpoint);
    }
    url
}
