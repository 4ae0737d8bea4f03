use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use parsekit_sdk::Value;

#[derive(Parser)]
#[command(
    name = "parsekit",
    about = "Store and query objects on a Parse-compatible server",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

/// Where to connect. Flags override values from `--config`.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// TOML client configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Server mount point, e.g. https://api.example.com/parse
    #[arg(long, global = true, env = "PARSE_SERVER_URL")]
    pub server_url: Option<String>,

    #[arg(long, global = true, env = "PARSE_APPLICATION_ID")]
    pub app_id: Option<String>,

    #[arg(long, global = true, env = "PARSE_REST_API_KEY", hide_env_values = true)]
    pub rest_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true)]
    pub timeout: Option<u64>,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create an object, or update it when --id is given
    Save(SaveArgs),
    /// List objects of a class
    Find(FindArgs),
    /// Delete an object
    Delete(DeleteArgs),
    /// Register a new user
    Signup(SignupArgs),
}

#[derive(Args)]
pub struct SaveArgs {
    pub class: String,
    /// Fields as KEY=VALUE; VALUE is read as JSON when it parses, else as a string
    #[arg(value_parser = parse_field)]
    pub fields: Vec<(String, Value)>,
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args)]
pub struct FindArgs {
    pub class: String,
    /// Equality constraint KEY=VALUE; repeatable
    #[arg(short = 'w', long = "where", value_parser = parse_field)]
    pub constraints: Vec<(String, Value)>,
    #[arg(short = 'n', long, default_value = "0")]
    pub limit: u32,
    #[arg(long, default_value = "0")]
    pub skip: u32,
    /// Sort keys, comma-separated; prefix with '-' for descending
    #[arg(long, allow_hyphen_values = true)]
    pub order: Option<String>,
    #[arg(long)]
    pub keys: Option<String>,
    #[arg(long)]
    pub include: Option<String>,
}

#[derive(Args)]
pub struct DeleteArgs {
    pub class: String,
    pub id: String,
}

#[derive(Args)]
pub struct SignupArgs {
    #[arg(short, long)]
    pub username: String,
    #[arg(short, long, env = "PARSE_PASSWORD", hide_env_values = true)]
    pub password: String,
    #[arg(short, long)]
    pub email: Option<String>,
}

/// Split `KEY=VALUE`, reading VALUE as JSON when possible.
pub fn parse_field(s: &str) -> Result<(String, Value), String> {
    let (key, raw) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {s:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {s:?}"));
    }
    let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
    Ok((key.to_string(), value))
}
