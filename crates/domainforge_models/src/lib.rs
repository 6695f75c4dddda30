//! LLM provider integrations for Domainforge.
//!
//! Both supported providers speak the OpenAI chat completions protocol and
//! share [`OpenAiCompatibleClient`]:
//!
//! - **OpenAI** - primary provider, [`OpenAiDriver`] (`OPENAI_API_KEY`)
//! - **Groq** - secondary provider, [`GroqDriver`] (`GROQ_API_KEY`)
//!
//! # Example
//!
//! ```no_run
//! use domainforge_core::AiModel;
//! use domainforge_interface::CompletionProvider;
//! use domainforge_models::GroqDriver;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let driver = GroqDriver::new()?;
//! let text = driver
//!     .complete("Reply with one word.", "Say hello", AiModel::Llama3_8b)
//!     .await?;
//! println!("{}", text);
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod groq;
mod openai;
mod openai_compat;

pub use groq::{GROQ_ENDPOINT, GroqDriver};
pub use openai::{OPENAI_ENDPOINT, OpenAiDriver};
pub use openai_compat::{
    ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice, ChoiceMessage,
    OpenAiCompatibleClient, SamplingParams, Usage,
};
