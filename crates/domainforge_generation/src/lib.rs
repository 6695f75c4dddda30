//! Domain name generation.
//!
//! Builds the system and user prompts, picks providers for the requested
//! model, falls back from the primary to the secondary provider once, and
//! parses the completion into at most five candidate names.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod orchestrator;
mod parser;
mod prompt;

pub use orchestrator::{Attempt, GenerationOrchestrator, MAX_PROMPT_CHARS, validate_prompt};
pub use parser::{MAX_SUGGESTIONS, parse_domain_suggestions};
pub use prompt::{system_prompt, user_prompt};
