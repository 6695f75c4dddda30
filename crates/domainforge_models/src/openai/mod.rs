//! OpenAI chat completions.

mod driver;

pub use driver::{OPENAI_ENDPOINT, OpenAiDriver};
