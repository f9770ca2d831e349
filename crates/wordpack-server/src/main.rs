//! wordpack-server - HTTP service that turns vocabulary lists into learning packages.

mod api;
mod config;
mod metrics;
mod upload;

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;
use wordpack_ai::{LlmSettings, ProviderSelector};
use wordpack_learning::LearningService;
use wordpack_ocr::{OcrExtractor, TesseractRecognizer};

use crate::api::AppState;
use crate::config::ServerArgs;
use crate::metrics::ServerMetrics;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = ServerArgs::parse();

    let settings = LlmSettings::load(args.config.as_deref())
        .context("Failed to load LLM provider settings")?;
    let selector = ProviderSelector::new(Arc::new(settings));

    let recognizer = TesseractRecognizer::new(&args.tesseract_bin, &args.ocr_lang);
    info!(
        "OCR via {} (lang={}), uploads in {}",
        args.tesseract_bin.display(),
        args.ocr_lang,
        args.uploads_dir.display()
    );

    let state = Arc::new(AppState {
        learning: LearningService::new(Arc::new(selector)),
        ocr: OcrExtractor::new(Arc::new(recognizer)),
        uploads_dir: args.uploads_dir,
        metrics: ServerMetrics::new(),
    });

    let app = api::router(state);

    info!("Starting wordpack server on {}", args.bind);
    let listener = tokio::net::TcpListener::bind(&args.bind)
        .await
        .with_context(|| format!("Failed to bind {}", args.bind))?;
    axum::serve(listener, app).await?;

    Ok(())
}
