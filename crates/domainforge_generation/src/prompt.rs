//! Prompt construction.

use domainforge_core::GenerationOptions;

const BASE_SYSTEM_PROMPT: &str = "You are an expert domain name generator specializing in creating brandable, memorable, and available domain names for businesses.

GUIDELINES:
1. Generate exactly 5 domain names without the .com extension
2. Focus on brandable names (not generic/descriptive)
3. Keep names short (5-12 characters ideal)
4. Make names easy to pronounce and spell
5. Avoid hyphens, numbers, and confusing spellings
6. Consider trademark-friendly options
7. Think about modern naming trends (portmanteau, invented words, etc.)

RESPONSE FORMAT:
Return only the domain names, one per line, with no additional text, explanations, or formatting.";

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Fixed instructions, plus a CONTEXT block when business type or style is set.
///
/// # Examples
///
/// ```
/// use domainforge_core::{GenerationOptions, GenerationOptionsBuilder};
/// use domainforge_generation::system_prompt;
///
/// let plain = system_prompt(&GenerationOptions::default());
/// assert!(plain.ends_with("or formatting."));
///
/// let options = GenerationOptionsBuilder::default()
///     .style(Some("playful".to_string()))
///     .build()
///     .unwrap();
/// assert!(system_prompt(&options).ends_with("CONTEXT:\nStyle Preference: playful"));
/// ```
pub fn system_prompt(options: &GenerationOptions) -> String {
    let business_type = non_blank(options.business_type());
    let style = non_blank(options.style());

    if business_type.is_none() && style.is_none() {
        return BASE_SYSTEM_PROMPT.to_string();
    }

    let mut context = Vec::new();
    if let Some(bt) = business_type {
        context.push(format!("Business Type: {}", bt));
    }
    if let Some(s) = style {
        context.push(format!("Style Preference: {}", s));
    }

    format!("{}\n\nCONTEXT:\n{}", BASE_SYSTEM_PROMPT, context.join("\n"))
}

/// The business description with optional industry and keyword lines.
///
/// # Examples
///
/// ```
/// use domainforge_core::GenerationOptionsBuilder;
/// use domainforge_generation::user_prompt;
///
/// let options = GenerationOptionsBuilder::default()
///     .business_type(Some("fintech".to_string()))
///     .keywords(vec!["pay".to_string(), "swift".to_string()])
///     .build()
///     .unwrap();
///
/// assert_eq!(
///     user_prompt("mobile payments", &options),
///     "Business concept: mobile payments\nIndustry: fintech\nKeywords to consider: pay, swift"
/// );
/// ```
pub fn user_prompt(prompt: &str, options: &GenerationOptions) -> String {
    let mut text = format!("Business concept: {}", prompt.trim());

    if let Some(bt) = non_blank(options.business_type()) {
        text.push_str(&format!("\nIndustry: {}", bt));
    }

    let keywords: Vec<&str> = options
        .keywords()
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .collect();
    if !keywords.is_empty() {
        text.push_str(&format!("\nKeywords to consider: {}", keywords.join(", ")));
    }

    text
}
