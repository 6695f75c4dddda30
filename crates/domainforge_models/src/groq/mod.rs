//! Groq LPU inference.

mod driver;

pub use driver::{GROQ_ENDPOINT, GroqDriver};
