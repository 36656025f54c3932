//! LLM gateway implementations for ACE.
//!
//! All gateways implement the `ace_core::Provider` trait.
//! The router builds the configured gateway from `AppConfig`.

pub mod openai_compat;
pub mod router;

pub use openai_compat::OpenAiCompatProvider;
pub use router::ProviderRouter;
