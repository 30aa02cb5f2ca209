use std::sync::Arc;

use draft_pilot::config::Config;
use draft_pilot::llm::{OllamaClient, ReplyGenerator};
use draft_pilot::mailbox::draft::{DraftStore, ImapDraftStore};
use draft_pilot::poller::Poller;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Install rustls crypto provider before any TLS usage
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    // Missing credentials are fatal at startup; everything else has a
    // default.
    let config = match Config::load() {
        Ok(config) => Arc::new(config),
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("  Set EMAIL_USER and EMAIL_PASS in the environment or ./.env");
            std::process::exit(1);
        }
    };

    eprintln!("📬 draft-pilot v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Account: {}", config.email_user);
    eprintln!("   IMAP: {}:{}", config.imap_host, config.imap_port);
    eprintln!("   Drafts folder: {}", config.drafts_folder);
    eprintln!(
        "   Ollama: {} (model: {})",
        config.ollama_base_url, config.ollama_model
    );
    eprintln!("   Poll interval: {}s\n", config.poll_interval_secs);

    let generator: Arc<dyn ReplyGenerator> = Arc::new(OllamaClient::new(
        config.ollama_base_url.clone(),
        config.ollama_model.clone(),
    ));
    let drafts: Arc<dyn DraftStore> = Arc::new(ImapDraftStore::new(Arc::clone(&config)));

    Poller::new(config, generator, drafts).run().await;

    Ok(())
}
