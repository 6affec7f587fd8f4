use std::env;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use log::{error, info};
use thiserror::Error;

use crate::config::{self, ClientConfig, ConfigError, ProfileConfig};
use crate::openai::{
    ChatCompletion, ChatOptions, ClientError, DEFAULT_CHAT_MODEL, DEFAULT_MAX_TOKENS,
    DEFAULT_TEMPERATURE, DEFAULT_VISION_MODEL, Message, OpenAIClient,
};

pub const DEFAULT_MESSAGE: &str = "Tell me about the role of AI in healthcare.";
pub const DEFAULT_SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant specializing in medical information.";

pub const EXIT_FAILURE: i32 = 1;
pub const EXIT_CONFIG: i32 = 2;
pub const EXIT_NOT_FOUND: i32 = 3;

#[derive(Debug, Args, Clone)]
pub struct ChatArgs {
    #[arg(long, default_value = DEFAULT_MESSAGE, help = "Message to send to the API")]
    pub message: String,
    #[arg(long, help = "Model to use [default: gpt-4o, or gpt-4o-vision-preview with --image]")]
    pub model: Option<String>,
    #[arg(long, help = "Sampling temperature (0.0-2.0) [default: 0.7]")]
    pub temperature: Option<f32>,
    #[arg(long, help = "Maximum tokens to generate [default: 1000]")]
    pub max_tokens: Option<u32>,
    #[arg(long, help = "Path to image file for vision model queries")]
    pub image: Option<PathBuf>,
    #[arg(long, help = "OpenAI API key (defaults to OPENAI_API_KEY env var)")]
    pub api_key: Option<String>,
    #[arg(long, help = "Override the system prompt")]
    pub system: Option<String>,
    #[arg(long, help = "Load defaults from a named config profile")]
    pub profile: Option<String>,
    #[arg(long, help = "Print the full response as JSON")]
    pub json: bool,
    #[arg(long, help = "Enable verbose logging")]
    pub verbose: bool,
}

#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("Response did not contain message content")]
    EmptyContent,
    #[error("Failed to write output: {0}")]
    Output(#[from] io::Error),
    #[error("Failed to serialize response: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl CommandError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Config(_) => EXIT_CONFIG,
            Self::Client(err) if err.is_config() => EXIT_CONFIG,
            Self::Client(err) if err.is_not_found() => EXIT_NOT_FOUND,
            _ => EXIT_FAILURE,
        }
    }

    /// Line reported to the user for this failure.
    pub fn summary(&self) -> String {
        match self {
            Self::Client(ClientError::ImageNotFound { path }) => {
                format!("Image file not found: {}", path.display())
            }
            _ if self.exit_code() == EXIT_CONFIG => format!("Configuration error: {self}"),
            _ => format!("Error during execution: {self}"),
        }
    }

    pub fn log(&self) {
        error!("{}", self.summary());
    }
}

/// Fully resolved request: CLI flags over profile values over built-in defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPlan {
    pub messages: Vec<Message>,
    pub options: ChatOptions,
    pub image: Option<PathBuf>,
    pub base_url: Option<String>,
}

impl ChatPlan {
    pub fn resolve(args: &ChatArgs, profile: ProfileConfig) -> Self {
        let fallback_model = if args.image.is_some() {
            DEFAULT_VISION_MODEL
        } else {
            DEFAULT_CHAT_MODEL
        };
        let model = args
            .model
            .clone()
            .or(profile.model)
            .unwrap_or_else(|| fallback_model.to_string());
        let system = args
            .system
            .clone()
            .or(profile.system)
            .unwrap_or_else(|| DEFAULT_SYSTEM_PROMPT.to_string());

        let options = ChatOptions {
            temperature: args
                .temperature
                .or(profile.temperature)
                .unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: args
                .max_tokens
                .or(profile.max_tokens)
                .unwrap_or(DEFAULT_MAX_TOKENS),
            ..ChatOptions::default()
        }
        .with_model(model);

        Self {
            messages: default_messages(&system, &args.message),
            options,
            image: args.image.clone(),
            base_url: profile.base_url,
        }
    }

    fn model(&self) -> &str {
        self.options.model.as_deref().unwrap_or(DEFAULT_CHAT_MODEL)
    }
}

/// System prompt followed by the user's message.
pub fn default_messages(system: &str, user_message: &str) -> Vec<Message> {
    vec![Message::system(system), Message::user(user_message)]
}

pub fn run(args: ChatArgs) -> Result<(), CommandError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run_with_output(args, &mut out)
}

pub fn run_with_output(args: ChatArgs, out: &mut impl Write) -> Result<(), CommandError> {
    let profile = match args.profile.as_deref() {
        Some(name) => config::load_profile(name)?,
        None => ProfileConfig::default(),
    };
    let plan = ChatPlan::resolve(&args, profile);

    let client_config = ClientConfig::resolve(
        args.api_key.as_deref(),
        plan.base_url.as_deref(),
        |name| env::var(name).ok(),
    )?;
    let client = OpenAIClient::new(client_config);
    info!("Using model: {}", plan.model());

    let completion = dispatch(&client, &plan)?;
    render(&completion, args.json, out)
}

fn dispatch(client: &OpenAIClient, plan: &ChatPlan) -> Result<ChatCompletion, ClientError> {
    match &plan.image {
        Some(path) => {
            info!("Processing request with image: {}", path.display());
            client.chat_with_image(&plan.messages, path, &plan.options)
        }
        None => {
            info!("Processing text-only request");
            client.chat_completion(&plan.messages, &plan.options)
        }
    }
}

fn render(
    completion: &ChatCompletion,
    json: bool,
    out: &mut impl Write,
) -> Result<(), CommandError> {
    if json {
        serde_json::to_writer_pretty(&mut *out, completion)?;
        writeln!(out)?;
        return Ok(());
    }

    let content = completion.content().ok_or(CommandError::EmptyContent)?;
    let rule = "-".repeat(40);
    writeln!(out, "\nResponse:")?;
    writeln!(out, "{rule}")?;
    writeln!(out, "{content}")?;
    writeln!(out, "{rule}")?;

    if let Some(usage) = &completion.usage {
        writeln!(out, "\nToken Usage:")?;
        writeln!(out, "  Prompt tokens: {}", usage.prompt_tokens)?;
        writeln!(out, "  Completion tokens: {}", usage.completion_tokens)?;
        writeln!(out, "  Total tokens: {}", usage.total_tokens)?;
    }
    Ok(())
}
