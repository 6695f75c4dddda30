//! Model output parsing.

/// Most names kept from one completion.
pub const MAX_SUGGESTIONS: usize = 5;

/// Split model output into at most five candidate names.
///
/// Lines are trimmed and blank lines dropped. No other shape checks are made.
///
/// # Examples
///
/// ```
/// use domainforge_generation::parse_domain_suggestions;
///
/// let parsed = parse_domain_suggestions("alpha\n\nbeta\nBeta again\n \ngamma\ndelta\nepsilon\nzeta");
/// assert_eq!(parsed, vec!["alpha", "beta", "Beta again", "gamma", "delta"]);
/// ```
pub fn parse_domain_suggestions(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(MAX_SUGGESTIONS)
        .map(str::to_string)
        .collect()
}
