//! Utility functions shared by every site plugin.

use url::Url;

/// Resolves a possibly-relative URL against a base URL.
///
/// Handles protocol-relative (`//host/path`), absolute, and relative
/// inputs. Returns `None` for empty or malformed input instead of
/// erroring, since scraped `href`/`src` attributes are untrusted.
pub fn make_absolute(relative_url: &str, base_url: &str) -> Option<String> {
    if relative_url.is_empty() {
        return None;
    }

    if relative_url.starts_with("//") {
        let base = Url::parse(base_url).ok()?;
        return Some(format!("{}:{}", base.scheme(), relative_url));
    }

    if relative_url.starts_with("http://") || relative_url.starts_with("https://") {
        return Some(relative_url.to_string());
    }

    // Normalize both sides before joining so that "/a/" + "/b" and
    // "/a" + "b" resolve the same way.
    let base = base_url.trim_end_matches('/');
    let relative = relative_url.trim_start_matches('/');

    Url::parse(base)
        .ok()?
        .join(relative)
        .ok()
        .map(|u| u.to_string())
}
