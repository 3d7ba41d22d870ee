// crates/server/src/main.rs
//! vidgrab server binary.
//!
//! Binds the HTTP server, prints where it is listening, and optionally opens
//! the page in a browser. Downloads run in the background, one at a time.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;
use vidgrab_core::YtDlpEngine;
use vidgrab_server::reveal::OsRevealer;
use vidgrab_server::{create_app, AppState, Config};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,vidgrab_server=info,vidgrab_core=info".into()),
        )
        .init();

    let config = Config::parse();

    std::fs::create_dir_all(&config.download_dir).with_context(|| {
        format!(
            "creating download directory {}",
            config.download_dir.display()
        )
    })?;

    let ffmpeg = config.ffmpeg_location();
    let engine = YtDlpEngine::new(&config.ytdlp)
        .with_base_args(config.ytdlp_args.iter().cloned())
        .with_ffmpeg(&ffmpeg);
    tracing::info!(
        ytdlp = %config.ytdlp.display(),
        ffmpeg = %ffmpeg.display(),
        download_dir = %config.download_dir.display(),
        "engine configured"
    );

    let state = AppState::with_options(
        Arc::new(engine),
        config.download_dir.clone(),
        config.poll_interval(),
        Arc::new(OsRevealer),
    );
    let app = create_app(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;

    let url = config.page_url();
    eprintln!("\n  vidgrab v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("  Listening on {url}");
    eprintln!("  Saving to    {}\n", config.download_dir.display());

    if config.open {
        if let Err(e) = open::that_detached(&url) {
            tracing::warn!(url = %url, error = %e, "could not open browser");
        }
    }

    axum::serve(listener, app).await?;
    Ok(())
}
