use serde_json::{json, Value};

use crate::cli::OutputFormat;

/// Output a success message in the appropriate format
pub fn output_success(output_format: OutputFormat, message: &str, data: Option<Value>) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => {
            let mut response = json!({
                "success": true,
                "message": message
            });

            if let Some(data_value) = data {
                response["data"] = data_value;
            }

            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
    }
    Ok(())
}

/// Print a single post
pub fn output_post(output_format: OutputFormat, post: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(post)?),
        OutputFormat::Text => {
            println!("{}", str_field(post, "title"));
            println!("  id:      {}", str_field(post, "id"));
            println!("  author:  {}", author_name(post));
            println!("  cover:   {}", str_field(post, "cover"));
            println!("  created: {}", str_field(post, "createdAt"));
            println!("  updated: {}", str_field(post, "updatedAt"));
            let summary = str_field(post, "summary");
            if !summary.is_empty() {
                println!();
                println!("  {}", summary);
            }
        }
    }
    Ok(())
}

/// Print a list of posts, one line each in text mode
pub fn output_post_list(output_format: OutputFormat, posts: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(posts)?),
        OutputFormat::Text => {
            let items = posts.as_array().map(Vec::as_slice).unwrap_or_default();
            if items.is_empty() {
                println!("No posts yet");
                return Ok(());
            }
            for post in items {
                println!(
                    "{}  {:<20}  {}",
                    str_field(post, "id"),
                    author_name(post),
                    str_field(post, "title")
                );
            }
        }
    }
    Ok(())
}

fn str_field<'a>(value: &'a Value, key: &str) -> &'a str {
    value.get(key).and_then(Value::as_str).unwrap_or_default()
}

/// Author username when expanded, otherwise the bare author id
fn author_name(post: &Value) -> &str {
    match post.get("author") {
        Some(Value::Object(author)) => author.get("username").and_then(Value::as_str).unwrap_or_default(),
        Some(Value::String(id)) => id,
        _ => "",
    }
}
