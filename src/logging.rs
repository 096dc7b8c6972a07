// 📝 Logging - tracing subscriber setup
// RUST_LOG overrides the default directive

use anyhow::{anyhow, Result};
use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn directive(rust_log: Option<String>, default_directive: &str) -> String {
    match rust_log {
        Some(value) if !value.trim().is_empty() => value,
        _ => default_directive.to_string(),
    }
}

fn env_filter(default_directive: &str) -> EnvFilter {
    EnvFilter::new(directive(std::env::var("RUST_LOG").ok(), default_directive))
}

/// Log to stderr
pub fn init(default_directive: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}

/// Log to a file (appending), for the full-screen terminal UI
pub fn init_to_file(default_directive: &str, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        if !dir.as_os_str().is_empty() {
            std::fs::create_dir_all(dir)?;
        }
    }

    let file = OpenOptions::new().create(true).append(true).open(path)?;

    tracing_subscriber::registry()
        .with(env_filter(default_directive))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .try_init()
        .map_err(|e| anyhow!("Failed to initialise logging: {}", e))
}
