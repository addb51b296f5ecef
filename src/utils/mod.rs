//! Utility functions and helpers.

pub mod http;
pub mod log;

use url::Url;

use crate::error::{AppError, Result};

/// Parse a base URL, making sure it ends with `/` so that relative
/// endpoint paths are joined below it instead of replacing its last segment.
pub fn parse_base_url(base_url: &str) -> Result<Url> {
    let mut base = Url::parse(base_url.trim())?;
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    Ok(base)
}

/// Build an endpoint URL from a base, a relative endpoint path and raw
/// path segments.
///
/// Segments are usage keys and course ids such as
/// `block-v1:org+cs101+run+type@html+block@a1`, which must not be parsed
/// as URLs themselves, so they are pushed as literal path segments.
pub fn endpoint_url(
    base: &Url,
    endpoint: &str,
    segments: &[&str],
    trailing_slash: bool,
) -> Result<Url> {
    let mut url = base.join(endpoint.trim_start_matches('/'))?;
    {
        let mut path = url
            .path_segments_mut()
            .map_err(|_| AppError::config(format!("{base} cannot be a base URL")))?;
        path.pop_if_empty();
        path.extend(segments);
        if trailing_slash {
            path.push("");
        }
    }
    Ok(url)
}
