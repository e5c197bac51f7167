//! Navigation context with typed query parameters.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::lifecycle::TimingContext;

static NEXT_NAVIGATION: AtomicU64 = AtomicU64::new(1);

/// Unique navigation identifier for tracing.
///
/// Ids are monotonically increasing within a process, so a larger id always
/// belongs to a newer navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NavigationId(pub u64);

impl NavigationId {
    /// Generate a fresh navigation id.
    pub fn generate() -> Self {
        Self(NEXT_NAVIGATION.fetch_add(1, Ordering::Relaxed))
    }
}

impl std::fmt::Display for NavigationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "nav-{:06}", self.0)
    }
}

/// Query string parameters.
pub type QueryParams = HashMap<String, String>;

/// Typed context for one navigation.
#[derive(Debug, Clone)]
pub struct NavigationContext {
    /// Unique navigation identifier.
    pub navigation_id: NavigationId,
    /// Route path (without query string).
    pub path: String,
    /// Decoded query string parameters.
    pub query: QueryParams,
    /// Timing context for observability.
    pub timing: TimingContext,
}

impl NavigationContext {
    /// Create a context from a path that may carry a query string.
    pub fn new(path_with_query: impl AsRef<str>) -> Self {
        let path_with_query = path_with_query.as_ref();
        let (path, query) = match path_with_query.split_once('?') {
            Some((path, qs)) => (path, parse_query(qs)),
            None => (path_with_query, QueryParams::new()),
        };

        Self {
            navigation_id: NavigationId::generate(),
            path: path.to_string(),
            query,
            timing: TimingContext::new(),
        }
    }

    /// Get a query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(|s| s.as_str())
    }
}

/// Parse a URL query string into decoded key/value pairs.
///
/// Later duplicates win. Keys without `=` map to an empty value.
pub fn parse_query(qs: &str) -> QueryParams {
    qs.trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
        .collect()
}

/// Percent-decode a query component (`+` decodes to a space).
pub fn decode_component(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => out.push(b' '),
            b'%' => {
                let hex = s
                    .get(i + 1..i + 3)
                    .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(byte) => {
                        out.push(byte);
                        i += 2;
                    }
                    None => out.push(b'%'),
                }
            }
            b => out.push(b),
        }
        i += 1;
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Percent-encode a query component.
pub fn encode_component(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for byte in s.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            b' ' => out.push('+'),
            _ => out.push_str(&format!("%{:02X}", byte)),
        }
    }
    out
}
