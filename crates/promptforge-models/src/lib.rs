//! Model implementations for PromptForge.
//!
//! This crate provides concrete implementations of the `Model` trait and the
//! provider registry that hands them out.
//!
//! # Supported Providers
//!
//! - **Novita**: OpenAI-compatible host for open models (API key required)
//! - **OpenAI**: OpenAI's GPT models (API key required)
//! - **Anthropic**: Claude models via the native messages API (API key required)
//! - **Stub**: deterministic scripted playback, used when credentials are absent

pub mod claude;
pub mod openai;
pub mod registry;
pub mod stub;

pub use claude::ClaudeModel;
pub use openai::OpenAiCompatModel;
pub use registry::{Credentials, Provider, ProviderRegistry};
pub use stub::{StubModel, StubTurn};
