//! Hostname canonicalization.
//!
//! Runtime hostnames and user-typed blacklist entries go through the same
//! normalization so that matching compares like with like.

use crate::NudgeError;

const WWW_PREFIX: &str = "www.";

/// Lowercase a hostname and strip exactly one leading `www.`.
///
/// Total: any string is accepted, `""` maps to `""`.
pub fn normalize(host: &str) -> String {
    let lower = host.to_lowercase();
    match lower.strip_prefix(WWW_PREFIX) {
        Some(rest) => rest.to_string(),
        None => lower,
    }
}

/// Parse a URL or bare domain typed by the user into a normalized domain.
///
/// Accepts `https://www.Example.com/path?q#frag` and `example.com` alike.
///
/// # Errors
/// * `InvalidDomain` - the remainder does not look like a domain
pub fn parse_user_input(raw: &str) -> Result<String, NudgeError> {
    let lower = raw.trim().to_lowercase();

    let without_scheme = lower
        .strip_prefix("https://")
        .or_else(|| lower.strip_prefix("http://"))
        .unwrap_or(&lower);
    let without_www = without_scheme
        .strip_prefix(WWW_PREFIX)
        .unwrap_or(without_scheme);

    let end = without_www
        .find(['/', '?', '#'])
        .unwrap_or(without_www.len());
    let domain = &without_www[..end];

    if !is_valid_domain(domain) {
        return Err(NudgeError::InvalidDomain(raw.trim().to_string()));
    }

    Ok(domain.to_string())
}

/// Domain-shape check for already-lowercased input.
///
/// Requires at least two `.`-separated labels, each made of ASCII
/// alphanumerics with single interior hyphens, and a final label of two or
/// more letters.
pub fn is_valid_domain(domain: &str) -> bool {
    if domain.len() < 3 || !domain.contains('.') {
        return false;
    }

    let labels: Vec<&str> = domain.split('.').collect();
    let Some((tld, rest)) = labels.split_last() else {
        return false;
    };

    if tld.len() < 2 || !tld.bytes().all(|b| b.is_ascii_lowercase()) {
        return false;
    }

    rest.iter().all(|label| is_valid_label(label))
}

fn is_valid_label(label: &str) -> bool {
    if label.is_empty() || label.starts_with('-') || label.ends_with('-') || label.contains("--")
    {
        return false;
    }
    label
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_lowercases_and_strips_www() {
        assert_eq!(normalize("www.Twitter.com"), "twitter.com");
        assert_eq!(normalize("M.Twitter.COM"), "m.twitter.com");
    }

    #[test]
    fn test_normalize_strips_only_one_www() {
        assert_eq!(normalize("www.www.example.com"), "www.example.com");
    }

    #[test]
    fn test_normalize_only_strips_leading_www() {
        assert_eq!(normalize("wwwexample.com"), "wwwexample.com");
        assert_eq!(normalize("foo.www.example.com"), "foo.www.example.com");
    }

    #[test]
    fn test_normalize_empty() {
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_parse_full_url() {
        assert_eq!(
            parse_user_input("  https://www.Reddit.com/r/rust?sort=new#top ").unwrap(),
            "reddit.com"
        );
        assert_eq!(parse_user_input("http://news.ycombinator.com").unwrap(), "news.ycombinator.com");
    }

    #[test]
    fn test_parse_bare_domain() {
        assert_eq!(parse_user_input("YouTube.com").unwrap(), "youtube.com");
        assert_eq!(parse_user_input("my-site.co.uk").unwrap(), "my-site.co.uk");
    }

    #[test]
    fn test_parse_truncates_at_query_and_fragment() {
        assert_eq!(parse_user_input("example.com?x=1").unwrap(), "example.com");
        assert_eq!(parse_user_input("example.com#a/b").unwrap(), "example.com");
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(matches!(parse_user_input(""), Err(NudgeError::InvalidDomain(_))));
        assert!(matches!(parse_user_input("localhost"), Err(NudgeError::InvalidDomain(_))));
        assert!(matches!(parse_user_input("exa mple.com"), Err(NudgeError::InvalidDomain(_))));
        assert!(matches!(parse_user_input("example.c"), Err(NudgeError::InvalidDomain(_))));
        assert!(matches!(parse_user_input("example.c0m"), Err(NudgeError::InvalidDomain(_))));
        assert!(matches!(parse_user_input("ftp://example.com"), Err(NudgeError::InvalidDomain(_))));
    }

    #[test]
    fn test_valid_domain_hyphen_rules() {
        assert!(is_valid_domain("a-b.com"));
        assert!(!is_valid_domain("-ab.com"));
        assert!(!is_valid_domain("ab-.com"));
        assert!(!is_valid_domain("a--b.com"));
        assert!(!is_valid_domain("a..com"));
        assert!(!is_valid_domain(".com"));
    }
}
