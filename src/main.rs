use std::process;

use clap::Parser;
use oaichat::commands::chat::{self, ChatArgs};
use oaichat::logging;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit: ",
    env!("OAICHAT_GIT_SHA"),
    ", built: ",
    env!("OAICHAT_BUILD_TS"),
    ")"
);

const HELP_EXAMPLES: &str = "Examples:\n  oaichat --message \"Summarize the latest sepsis guidelines\"\n  oaichat --model gpt-4o-mini --temperature 0.2 --max-tokens 300 --message \"2+2?\"\n  oaichat --image scan.png --message \"Describe this image\"\n  oaichat --profile work --json --message \"hello\"";

#[derive(Debug, Parser)]
#[command(
    name = "oaichat",
    about = "OpenAI API client for chat and vision requests",
    version = LONG_VERSION,
    after_help = HELP_EXAMPLES
)]
struct Cli {
    #[command(flatten)]
    chat: ChatArgs,
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.chat.verbose);

    if let Err(err) = chat::run(cli.chat) {
        err.log();
        process::exit(err.exit_code());
    }
}
