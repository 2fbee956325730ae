use clap::Subcommand;
use serde_json::json;

use super::resolve_password;
use crate::cli::client::ApiClient;
use crate::cli::utils::output_success;
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Register new user")]
    Register {
        #[arg(help = "Username (at least 4 letters, digits or underscores)")]
        username: String,
        #[arg(long, help = "Password (falls back to BLOG_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "Login and print a bearer token")]
    Login {
        #[arg(help = "Username")]
        username: String,
        #[arg(long, help = "Password (falls back to BLOG_PASSWORD)")]
        password: Option<String>,
    },

    #[command(about = "Show the claims of the current token")]
    Profile,
}

pub async fn handle(cmd: AuthCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        AuthCommands::Register { username, password } => {
            let password = resolve_password(password)?;
            let body = client
                .post_json("/register", &json!({ "username": username, "password": password }))
                .await?;
            output_success(
                output_format,
                &format!("Registered user '{}'", username),
                Some(body),
            )
        }
        AuthCommands::Login { username, password } => {
            let password = resolve_password(password)?;
            let body = client
                .post_json("/login", &json!({ "username": username, "password": password }))
                .await?;

            match output_format {
                OutputFormat::Json => output_success(output_format, "Login successful", Some(body)),
                OutputFormat::Text => {
                    // Bare token on stdout so it can be captured into BLOG_TOKEN
                    let token = body
                        .get("token")
                        .and_then(|t| t.as_str())
                        .ok_or_else(|| anyhow::anyhow!("login response did not contain a token"))?;
                    println!("{}", token);
                    Ok(())
                }
            }
        }
        AuthCommands::Profile => {
            let body = client.get_authorized("/profile").await?;
            match output_format {
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&body)?),
                OutputFormat::Text => {
                    let user = &body["user"];
                    println!("username: {}", user["username"].as_str().unwrap_or_default());
                    println!("id:       {}", user["id"].as_str().unwrap_or_default());
                    if let Some(exp) = user.get("exp").and_then(|e| e.as_i64()) {
                        println!("expires:  {}", exp);
                    }
                }
            }
            Ok(())
        }
    }
}
