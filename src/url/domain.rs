use url::Url;

/// Normalizes a domain key by trimming whitespace and lowercasing it
///
/// Registration and lookup both go through this function, so
/// `" Example.COM "` and `"example.com"` address the same crawler.
///
/// # Examples
///
/// ```
/// use mind_digest::url::normalize_domain;
///
/// assert_eq!(normalize_domain(" Example.COM "), "example.com");
/// assert_eq!(normalize_domain("spektrum.de"), "spektrum.de");
/// ```
pub fn normalize_domain(domain: &str) -> String {
    domain.trim().to_lowercase()
}

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
/// If the URL has no host, it returns None.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use mind_digest::url::extract_domain;
///
/// let url = Url::parse("https://EXAMPLE.COM/path").unwrap();
/// assert_eq!(extract_domain(&url), Some("example.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_trims_and_lowercases() {
        assert_eq!(normalize_domain("  Example.COM\t"), "example.com");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_domain(" Spektrum.DE ");
        assert_eq!(normalize_domain(&once), once);
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize_domain("   "), "");
    }

    #[test]
    fn test_extract_simple_domain() {
        let url = Url::parse("https://example.com/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_subdomain() {
        let url = Url::parse("https://www.spektrum.de/news/x/1").unwrap();
        assert_eq!(extract_domain(&url), Some("www.spektrum.de".to_string()));
    }

    #[test]
    fn test_extract_with_port() {
        let url = Url::parse("https://example.com:8080/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }

    #[test]
    fn test_extract_mixed_case() {
        let url = Url::parse("https://Example.COM/").unwrap();
        assert_eq!(extract_domain(&url), Some("example.com".to_string()));
    }
}
