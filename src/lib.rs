//! Blocking client and CLI for the OpenAI chat, embedding and vision endpoints.

/// CLI command implementations.
pub mod commands;
/// API key resolution and TOML profiles.
pub mod config;
/// Process-wide logger setup.
pub mod logging;
/// OpenAI HTTP client, wire types and errors.
pub mod openai;
