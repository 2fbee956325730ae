pub mod auth;
pub mod post;

/// Password from the flag, else from `BLOG_PASSWORD`
pub(crate) fn resolve_password(password: Option<String>) -> anyhow::Result<String> {
    password
        .or_else(|| std::env::var("BLOG_PASSWORD").ok())
        .filter(|p| !p.is_empty())
        .ok_or_else(|| anyhow::anyhow!("Password required: pass --password or set BLOG_PASSWORD"))
}
