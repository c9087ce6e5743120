//! Subdomain-aware blacklist matching.
//!
//! A visit matches entry `b` when the normalized host equals `b` or ends
//! with `"." + b`. The dot boundary is mandatory: `nottwitter.com` must not
//! match `twitter.com`.

use crate::domain::normalize;

/// Return the first blacklist entry (normalized) that `domain` falls under.
///
/// `domain` is expected to be normalized already; entries are re-normalized
/// so hand-edited stores still match.
pub fn matching_entry<'a, I>(domain: &str, blacklist: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    blacklist.into_iter().find_map(|entry| {
        let entry = normalize(entry);
        if entry.is_empty() {
            return None;
        }
        if domain == entry || is_subdomain_of(domain, &entry) {
            Some(entry)
        } else {
            None
        }
    })
}

/// Check whether `domain` is covered by any blacklist entry.
pub fn is_blacklisted<'a, I>(domain: &str, blacklist: I) -> bool
where
    I: IntoIterator<Item = &'a str>,
{
    matching_entry(domain, blacklist).is_some()
}

fn is_subdomain_of(domain: &str, entry: &str) -> bool {
    domain
        .strip_suffix(entry)
        .is_some_and(|head| head.ends_with('.'))
}
