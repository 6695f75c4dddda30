//! Shared client for providers speaking the OpenAI chat completions protocol.

mod client;
mod request;
mod response;

pub use client::OpenAiCompatibleClient;
pub use request::{ChatCompletionRequest, ChatMessage, SamplingParams};
pub use response::{ChatCompletionResponse, Choice, ChoiceMessage, Usage};
