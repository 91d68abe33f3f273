//! Discovery pass-through response and its header whitelist.

use bytes::Bytes;

/// Every discovery read lives under this prefix upstream.
pub const CONTENT_PREFIX: &str = "/content/";

/// Whether an upstream response header is copied to the client.
///
/// Only `content-type*` and `access-control-*` headers pass.
pub fn is_forwardable_header(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    name.starts_with("content-type") || name.starts_with("access-control-")
}

/// Whether `path_and_query` stays under [`CONTENT_PREFIX`] once resolved.
///
/// Dot segments are rejected outright, including percent-encoded dots and
/// encoded or backslash separators, since the HTTP client and the upstream
/// would both resolve them.
pub fn is_content_read_path(path_and_query: &str) -> bool {
    let path = path_and_query
        .split_once('?')
        .map_or(path_and_query, |(path, _)| path);
    if !path.starts_with(CONTENT_PREFIX) {
        return false;
    }

    let decoded = decode_separators(path);
    decoded
        .split(|c| c == '/' || c == '\\')
        .all(|segment| segment != "." && segment != "..")
}

/// Decode `%2e`, `%2f` and `%5c` (any case); other escapes stay as they are.
fn decode_separators(path: &str) -> String {
    let mut out = String::with_capacity(path.len());
    let mut rest = path;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let escape = rest.get(pos + 1..pos + 3).map(str::to_ascii_lowercase);
        match escape.as_deref() {
            Some("2e") => out.push('.'),
            Some("2f") => out.push('/'),
            Some("5c") => out.push('\\'),
            _ => {
                out.push('%');
                rest = &rest[pos + 1..];
                continue;
            }
        }
        rest = &rest[pos + 3..];
    }
    out.push_str(rest);
    out
}

/// Upstream answer to a discovery read, status and body verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxiedResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl ProxiedResponse {
    /// Drop every header outside the whitelist.
    pub fn filtered(mut self) -> Self {
        self.headers.retain(|(name, _)| is_forwardable_header(name));
        self
    }
}
