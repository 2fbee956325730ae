pub mod client;
pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

use client::ApiClient;

#[derive(Parser)]
#[command(name = "blog")]
#[command(about = "Blog CLI - Command-line client for the Blog API")]
#[command(version)]
pub struct Cli {
    #[arg(
        long,
        global = true,
        env = "BLOG_API_URL",
        default_value = "http://localhost:3000",
        help = "Base URL of the Blog API server"
    )]
    pub server: String,

    #[arg(long, global = true, env = "BLOG_TOKEN", hide_env_values = true, help = "Bearer token from `blog auth login`")]
    pub token: Option<String>,

    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Registration, login and token inspection")]
    Auth {
        #[command(subcommand)]
        cmd: commands::auth::AuthCommands,
    },

    #[command(about = "Create, update and read posts")]
    Post {
        #[command(subcommand)]
        cmd: commands::post::PostCommands,
    },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let client = ApiClient::new(&cli.server, cli.token.clone());

    match cli.command {
        Commands::Auth { cmd } => commands::auth::handle(cmd, &client, output_format).await,
        Commands::Post { cmd } => commands::post::handle(cmd, &client, output_format).await,
    }
}
