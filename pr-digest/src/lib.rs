pub mod cli;
pub mod github;
pub mod inputs;
pub mod llm;
pub mod load_config;
pub mod settings;
pub mod slack;

pub use cli::{run, Cli, Commands};
