//! Helpers for building catalog service URLs
use url::Url;

/// Append `path` to the path portion of `base`, leaving scheme, host, query and fragment alone.
pub fn append_path(base: &Url, path: &str) -> Url {
    let mut url = base.clone();
    let mut joined = url.path().to_owned();
    if !joined.ends_with('/') && !path.starts_with('/') {
        joined.push('/');
    }
    joined.push_str(path);
    url.set_path(&joined);
    url
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_path() {
        let base = Url::parse("https://discover.digitalglobe.com/v2/stac").unwrap();
        let url = append_path(&base, "catalog/wv");
        assert_eq!(url.as_str(), "https://discover.digitalglobe.com/v2/stac/catalog/wv");
    }

    #[test]
    fn test_append_path_trailing_slash() {
        let base = Url::parse("https://example.com/stac/").unwrap();
        assert_eq!(append_path(&base, "search").as_str(), "https://example.com/stac/search");
    }

    #[test]
    fn test_append_path_keeps_query() {
        let base = Url::parse("https://example.com/stac?key=1").unwrap();
        assert_eq!(
            append_path(&base, "search").as_str(),
            "https://example.com/stac/search?key=1"
        );
    }
}
