//! Typed wrapper over the OpenAI chat-completions and embeddings endpoints.
//!
//! Requests are sent one at a time with a blocking HTTP client. Responses are
//! returned as deserialized, without interpretation.

mod client;
mod error;
/// Image loading and data-URL encoding for vision requests.
pub mod image;
mod messages;
mod response;

pub use client::{
    ChatOptions, DEFAULT_CHAT_MODEL, DEFAULT_EMBEDDING_MODEL, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE, DEFAULT_VISION_MODEL, OpenAIClient,
};
pub use error::ClientError;
pub use messages::{ContentPart, ImageDetail, ImageUrl, Message, MessageContent, Role};
pub use response::{ChatCompletion, Choice, ResponseMessage, Usage};
