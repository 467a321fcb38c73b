/// Filename resolution for catalog image references
///
/// This is the single place that decides which file an entry points to.
/// The existence filter and the reaper both go through it.
use serde_json::Value;

use crate::state::data::CatalogEntry;

/// Resolve the filename an entry's `image` field points to.
///
/// Returns `None` when there is no `image` key, when the value is not a
/// string, or when the URL path ends in an empty segment.
pub fn entry_filename(entry: &CatalogEntry) -> Option<String> {
    entry.image().and_then(resolve_filename)
}

/// Resolve a raw `image` value to a filename
pub fn resolve_filename(image: &Value) -> Option<String> {
    let name = filename_from_url(image.as_str()?);
    if name.is_empty() {
        None
    } else {
        Some(name.to_string())
    }
}

/// Final path segment of a URL-like string.
///
/// Parsing is lenient and never fails: fragment and query are dropped, then
/// an optional `scheme:` and `//authority`, and the text after the last `/`
/// of what remains is returned (minus any `;params`). Percent-escapes are
/// left as they are.
pub fn filename_from_url(url: &str) -> &str {
    let url = before(url, '#');
    let url = before(url, '?');
    let rest = strip_scheme(url);

    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => authority_and_path
            .find('/')
            .map_or("", |slash| &authority_and_path[slash..]),
        None => rest,
    };

    let segment = path.rsplit_once('/').map_or(path, |(_, last)| last);
    before(segment, ';')
}

fn before(s: &str, delimiter: char) -> &str {
    s.split_once(delimiter).map_or(s, |(head, _)| head)
}

fn strip_scheme(url: &str) -> &str {
    let Some((scheme, rest)) = url.split_once(':') else {
        return url;
    };
    let mut chars = scheme.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if valid {
        rest
    } else {
        url
    }
}
