//! Input checks shared by every store implementation.

use crate::DatabaseResult;
use domainforge_error::{DatabaseError, DatabaseErrorKind};

/// Longest storable domain name.
pub const MAX_DOMAIN_NAME_LEN: usize = 255;

/// Largest history page.
pub const MAX_PAGE_SIZE: i64 = 50;

/// Keep the storable suggestions, lower-cased.
///
/// A name is storable when it is non-empty, at most 255 characters and made of
/// ASCII letters, digits, dots and hyphens.
///
/// # Errors
///
/// Returns an invalid-input error when nothing storable remains.
///
/// # Examples
///
/// ```
/// use domainforge_database::filter_suggestions;
///
/// let names = vec!["Brandly.com".to_string(), "".to_string(), "bad name".to_string()];
/// assert_eq!(filter_suggestions(&names).unwrap(), vec!["brandly.com"]);
/// ```
pub fn filter_suggestions(names: &[String]) -> DatabaseResult<Vec<String>> {
    let kept: Vec<String> = names
        .iter()
        .map(|n| n.trim())
        .filter(|n| is_storable(n))
        .map(str::to_lowercase)
        .collect();

    if kept.is_empty() {
        return Err(DatabaseError::new(DatabaseErrorKind::InvalidInput(
            "No valid domain names to save".to_string(),
        )));
    }
    Ok(kept)
}

fn is_storable(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= MAX_DOMAIN_NAME_LEN
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-')
}

/// Check history paging arguments.
///
/// # Errors
///
/// Fails unless `1 <= limit <= 50` and `offset >= 0`.
pub fn validate_page(limit: i64, offset: i64) -> DatabaseResult<()> {
    if !(1..=MAX_PAGE_SIZE).contains(&limit) {
        return Err(DatabaseError::new(DatabaseErrorKind::InvalidInput(format!(
            "Limit must be between 1 and {}",
            MAX_PAGE_SIZE
        ))));
    }
    if offset < 0 {
        return Err(DatabaseError::new(DatabaseErrorKind::InvalidInput(
            "Offset must be non-negative".to_string(),
        )));
    }
    Ok(())
}
