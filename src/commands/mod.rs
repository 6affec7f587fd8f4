/// Single-shot chat request: flags, dispatch, output and exit codes.
pub mod chat;
