use std::path::PathBuf;

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(
        "OpenAI API key is required. Set the OPENAI_API_KEY environment variable or pass an api key explicitly."
    )]
    MissingApiKey,
    #[error("At least one message is required")]
    EmptyMessages,
    #[error("Image file not found: {}", path.display())]
    ImageNotFound { path: PathBuf },
    #[error("Request Error: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API Error: {status}, {message}")]
    Api { status: StatusCode, message: String },
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Response did not contain {0}")]
    EmptyResponse(&'static str),
}

impl ClientError {
    /// Missing or unusable credentials.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::MissingApiKey)
    }

    /// The image file is missing or unreadable.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::ImageNotFound { .. })
    }
}
