use std::path::Path;

use log::{debug, error, info};
use reqwest::blocking::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::error::ClientError;
use super::image::image_url;
use super::messages::Message;
use super::response::{ChatCompletion, EmbeddingResponse, error_message};
use crate::config::ClientConfig;

pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o";
pub const DEFAULT_VISION_MODEL: &str = "gpt-4o-vision-preview";
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-large";
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_TOKENS: u32 = 1000;

const CHAT_COMPLETIONS_PATH: &str = "/v1/chat/completions";
const EMBEDDINGS_PATH: &str = "/v1/embeddings";

/// Sampling options for a chat request.
///
/// `model: None` falls back to the client's default model, then to the
/// built-in default for the endpoint being called. The optional penalties are
/// left off the wire when unset.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatOptions {
    pub model: Option<String>,
    pub temperature: f32,
    pub max_tokens: u32,
    pub top_p: Option<f32>,
    pub frequency_penalty: Option<f32>,
    pub presence_penalty: Option<f32>,
}

impl Default for ChatOptions {
    fn default() -> Self {
        Self {
            model: None,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
        }
    }
}

impl ChatOptions {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }
}

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frequency_penalty: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    presence_penalty: Option<f32>,
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

/// Blocking OpenAI client. One request per call, no retries.
pub struct OpenAIClient {
    client: Client,
    config: ClientConfig,
}

impl OpenAIClient {
    pub fn new(config: ClientConfig) -> Self {
        info!("OpenAI client initialized");
        Self {
            client: Client::new(),
            config,
        }
    }

    /// Builds a client from an explicit key or the `OPENAI_API_KEY` env var.
    pub fn from_env(api_key: Option<&str>) -> Result<Self, ClientError> {
        Ok(Self::new(ClientConfig::from_env(api_key)?))
    }

    /// Sends `messages` to the chat endpoint and returns the response unmodified.
    pub fn chat_completion(
        &self,
        messages: &[Message],
        options: &ChatOptions,
    ) -> Result<ChatCompletion, ClientError> {
        if messages.is_empty() {
            return Err(ClientError::EmptyMessages);
        }

        let model = self.resolve_model(options, DEFAULT_CHAT_MODEL);
        debug!("Generating chat completion with model: {model}");

        let request = ChatCompletionRequest {
            model,
            messages,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: options.top_p,
            frequency_penalty: options.frequency_penalty,
            presence_penalty: options.presence_penalty,
        };

        let completion: ChatCompletion = self
            .post(CHAT_COMPLETIONS_PATH, &request)
            .inspect_err(|err| error!("Error generating chat completion: {err}"))?;

        debug!(
            "Chat completion generated successfully. Usage: {:?}",
            completion.usage
        );
        Ok(completion)
    }

    /// Embeds `text` and returns the first vector of the response.
    pub fn create_embedding(
        &self,
        text: &str,
        model: Option<&str>,
    ) -> Result<Vec<f32>, ClientError> {
        let model = model.unwrap_or(DEFAULT_EMBEDDING_MODEL);
        debug!("Creating embedding with model: {model}");

        let request = EmbeddingRequest { model, input: text };
        let embedding = self
            .post::<_, EmbeddingResponse>(EMBEDDINGS_PATH, &request)
            .and_then(|response| {
                response
                    .data
                    .into_iter()
                    .next()
                    .map(|data| data.embedding)
                    .ok_or(ClientError::EmptyResponse("embedding data"))
            })
            .inspect_err(|err| error!("Error creating embedding: {err}"))?;

        debug!(
            "Embedding created successfully. Dimensions: {}",
            embedding.len()
        );
        Ok(embedding)
    }

    /// Attaches the image at `image_path` to the last message and sends the conversation.
    ///
    /// The file is checked before anything is sent, so a missing image never
    /// reaches the network. Earlier messages are forwarded as they are.
    pub fn chat_with_image(
        &self,
        messages: &[Message],
        image_path: impl AsRef<Path>,
        options: &ChatOptions,
    ) -> Result<ChatCompletion, ClientError> {
        let Some((last, history)) = messages.split_last() else {
            return Err(ClientError::EmptyMessages);
        };

        let model = self.resolve_model(options, DEFAULT_VISION_MODEL);
        debug!("Generating chat completion with image using model: {model}");

        let image = image_url(image_path.as_ref())
            .inspect_err(|err| error!("Error generating chat completion with image: {err}"))?;

        let mut formatted = history.to_vec();
        formatted.push(last.clone().with_image(image));

        let request = ChatCompletionRequest {
            model,
            messages: &formatted,
            temperature: options.temperature,
            max_tokens: options.max_tokens,
            top_p: None,
            frequency_penalty: None,
            presence_penalty: None,
        };

        let completion: ChatCompletion = self
            .post(CHAT_COMPLETIONS_PATH, &request)
            .inspect_err(|err| error!("Error generating chat completion with image: {err}"))?;

        debug!(
            "Chat completion with image generated successfully. Usage: {:?}",
            completion.usage
        );
        Ok(completion)
    }

    fn resolve_model<'a>(&'a self, options: &'a ChatOptions, fallback: &'static str) -> &'a str {
        options
            .model
            .as_deref()
            .or(self.config.default_model.as_deref())
            .unwrap_or(fallback)
    }

    fn post<T, R>(&self, path: &str, payload: &T) -> Result<R, ClientError>
    where
        T: Serialize + ?Sized,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.config.base_url.trim_end_matches('/'));
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(payload)
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(ClientError::Api {
                status,
                message: error_message(&body),
            });
        }

        Ok(serde_json::from_str(&body)?)
    }
}
