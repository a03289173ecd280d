//! Base URL composition.
//!
//! A client owns a base URL; groups and calls are relative references joined
//! onto it. The join keeps the scheme and authority of the base, glues the paths
//! with exactly one `/`, and concatenates query strings base first.

use url::{ParseError, Url};

// Used to resolve scheme-less references, only its path and query are kept.
const RELATIVE_ROOT: &str = "http://relative.invalid/";

/// Joins `relative` onto `base`.
///
/// `relative` may be a path (`/users`, `users?active=true`) or an absolute URL;
/// in both cases only its path and query are used, the scheme and host always
/// come from `base`. Fragments are dropped.
///
/// # Errors
///
/// Returns the [`ParseError`] of a malformed `relative` reference.
///
/// # Example
///
/// ```rust
/// use restline_core::join_group;
/// use url::Url;
///
/// # fn example() -> Result<(), url::ParseError> {
/// let base = Url::parse("https://api.example.com/v1?k=v")?;
/// let url = join_group(&base, "/users?active=true")?;
/// assert_eq!(url.as_str(), "https://api.example.com/v1/users?k=v&active=true");
/// # Ok(())
/// # }
/// ```
pub fn join_group(base: &Url, relative: &str) -> Result<Url, ParseError> {
    let relative = parse_relative(relative)?;

    let mut url = base.clone();
    url.set_fragment(None);
    url.set_path(&single_joining_slash(base.path(), relative.path()));
    let query = merge_query(
        base.query().unwrap_or_default(),
        relative.query().unwrap_or_default(),
    );
    url.set_query(query.as_deref());

    Ok(url)
}

/// Appends an already encoded query string to the URL, after any existing query.
pub(in crate::client) fn append_query(url: &mut Url, query: &str) {
    let merged = merge_query(url.query().unwrap_or_default(), query);
    url.set_query(merged.as_deref());
}

fn parse_relative(relative: &str) -> Result<Url, ParseError> {
    match Url::parse(relative) {
        Err(ParseError::RelativeUrlWithoutBase) => Url::parse(RELATIVE_ROOT)?.join(relative),
        result => result,
    }
}

fn single_joining_slash(left: &str, right: &str) -> String {
    match (left.ends_with('/'), right.strip_prefix('/')) {
        (true, Some(right)) => format!("{left}{right}"),
        (false, None) => format!("{left}/{right}"),
        _ => format!("{left}{right}"),
    }
}

fn merge_query(left: &str, right: &str) -> Option<String> {
    match (left.is_empty(), right.is_empty()) {
        (true, true) => None,
        (false, true) => Some(left.to_string()),
        (true, false) => Some(right.to_string()),
        (false, false) => Some(format!("{left}&{right}")),
    }
}
