//! Domain name syntax checks.

use regex::Regex;
use std::sync::OnceLock;

/// Largest batch accepted by [`AvailabilityChecker::check_batch`](crate::AvailabilityChecker::check_batch).
pub const MAX_BATCH_SIZE: usize = 10;

static DOMAIN_PATTERN: OnceLock<Option<Regex>> = OnceLock::new();

fn domain_pattern() -> Option<&'static Regex> {
    DOMAIN_PATTERN
        .get_or_init(|| Regex::new(r"^[a-zA-Z0-9][a-zA-Z0-9-]{0,61}[a-zA-Z0-9]?\.[a-zA-Z]{2,}$").ok())
        .as_ref()
}

/// Whether `name` looks like a registrable `label.tld` domain.
///
/// # Examples
///
/// ```
/// use domainforge_domains::validate_domain_name;
///
/// assert!(validate_domain_name("brandly.com"));
/// assert!(validate_domain_name("a.io"));
/// assert!(!validate_domain_name("-bad.com"));
/// assert!(!validate_domain_name("nodot"));
/// assert!(!validate_domain_name("sub.domain.com"));
/// ```
pub fn validate_domain_name(name: &str) -> bool {
    domain_pattern().is_some_and(|re| re.is_match(name))
}
