use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Subcommand;
use reqwest::multipart::{Form, Part};
use reqwest::Method;

use crate::cli::client::ApiClient;
use crate::cli::utils::{output_post, output_post_list};
use crate::cli::OutputFormat;

#[derive(Subcommand)]
pub enum PostCommands {
    #[command(about = "List all posts, newest first")]
    List,

    #[command(about = "Show a single post")]
    Show {
        #[arg(help = "Post id")]
        id: String,
    },

    #[command(about = "Create a post with a cover image")]
    Create {
        #[arg(long, help = "Title")]
        title: String,
        #[arg(long, default_value = "", help = "Summary")]
        summary: String,
        #[arg(long, default_value = "", help = "Body text")]
        content: String,
        #[arg(long, help = "Cover image file")]
        file: PathBuf,
    },

    #[command(about = "Update a post you authored")]
    Update {
        #[arg(help = "Post id")]
        id: String,
        #[arg(long, help = "New title")]
        title: Option<String>,
        #[arg(long, help = "New summary")]
        summary: Option<String>,
        #[arg(long, help = "New body text")]
        content: Option<String>,
        #[arg(long, help = "Replacement cover image")]
        file: Option<PathBuf>,
    },
}

pub async fn handle(cmd: PostCommands, client: &ApiClient, output_format: OutputFormat) -> anyhow::Result<()> {
    match cmd {
        PostCommands::List => {
            let posts = client.get("/posts").await?;
            output_post_list(output_format, &posts)
        }
        PostCommands::Show { id } => {
            let post = client.get(&format!("/post/{}", id)).await?;
            output_post(output_format, &post)
        }
        PostCommands::Create { title, summary, content, file } => {
            let form = Form::new()
                .text("title", title)
                .text("summary", summary)
                .text("content", content)
                .part("file", file_part(&file).await?);

            let post = client.send_form(Method::POST, "/post", form).await?;
            output_post(output_format, &post)
        }
        PostCommands::Update { id, title, summary, content, file } => {
            let mut form = Form::new().text("id", id);
            for (name, value) in [("title", title), ("summary", summary), ("content", content)] {
                if let Some(value) = value {
                    form = form.text(name, value);
                }
            }
            if let Some(file) = file {
                form = form.part("file", file_part(&file).await?);
            }

            let post = client.send_form(Method::PUT, "/post", form).await?;
            output_post(output_format, &post)
        }
    }
}

async fn file_part(path: &Path) -> anyhow::Result<Part> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("upload")
        .to_string();

    Ok(Part::bytes(bytes).file_name(file_name))
}
