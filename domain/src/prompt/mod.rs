//! Prompt domain
//!
//! Templates for the prompts sent to the reasoning provider.

mod template;

pub use template::PromptTemplate;
