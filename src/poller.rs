//! Mailbox Poller — the orchestrator.
//!
//! Two states: idle between cycles, polling while one cycle runs. A
//! cycle fetches all unseen inbox messages, runs each through the
//! pipeline sequentially, and marks the successfully drafted ones
//! \Seen. One bad message never aborts the rest of the cycle;
//! connection-level failures abort the cycle and are retried on the
//! next timer tick.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::{self, Error, ExtractionError};
use crate::llm::ReplyGenerator;
use crate::mailbox::draft::{DraftDocument, DraftStore};
use crate::mailbox::imap::{self, FetchedMail};
use crate::pipeline::{clean_subject, format_email_body, parse_message};

pub struct Poller {
    config: Arc<Config>,
    generator: Arc<dyn ReplyGenerator>,
    drafts: Arc<dyn DraftStore>,
}

impl Poller {
    pub fn new(
        config: Arc<Config>,
        generator: Arc<dyn ReplyGenerator>,
        drafts: Arc<dyn DraftStore>,
    ) -> Self {
        Self {
            config,
            generator,
            drafts,
        }
    }

    /// Poll forever on the configured interval.
    pub async fn run(&self) {
        info!(
            "Polling {} every {}s",
            self.config.imap_host, self.config.poll_interval_secs
        );

        let mut tick = tokio::time::interval(Duration::from_secs(self.config.poll_interval_secs));

        loop {
            tick.tick().await;
            self.poll_once().await;
        }
    }

    /// One complete cycle: fetch, process, mark seen.
    pub async fn poll_once(&self) {
        let config = Arc::clone(&self.config);
        let fetched =
            match tokio::task::spawn_blocking(move || imap::fetch_unseen(&config)).await {
                Ok(Ok(messages)) => messages,
                Ok(Err(e)) => {
                    error!("Poll cycle aborted: {e}");
                    return;
                }
                Err(e) => {
                    error!("Poll task panicked: {e}");
                    return;
                }
            };

        if fetched.is_empty() {
            return;
        }
        debug!("Fetched {} unseen message(s)", fetched.len());

        let drafted = self.run_cycle(fetched).await;

        // Drafted messages are flagged \Seen so they are not reprocessed
        // next cycle; failed ones stay unseen and get another chance.
        if !drafted.is_empty() {
            let config = Arc::clone(&self.config);
            match tokio::task::spawn_blocking(move || imap::mark_seen(&config, &drafted)).await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => warn!("Failed to mark messages seen: {e}"),
                Err(e) => warn!("Mark-seen task panicked: {e}"),
            }
        }
    }

    /// Process fetched messages in listing order, one fully completing
    /// before the next starts. Returns the uids whose drafts were
    /// created.
    pub async fn run_cycle(&self, fetched: Vec<FetchedMail>) -> Vec<String> {
        let mut drafted = Vec::new();
        for mail in fetched {
            match self.process_message(&mail.raw).await {
                Ok(()) => drafted.push(mail.uid),
                Err(Error::Extraction(e)) => {
                    warn!(uid = %mail.uid, "Skipping unreadable message: {e}");
                }
                Err(Error::Generation(e)) => {
                    error!(uid = %mail.uid, "Generation failed after retries: {e}");
                }
                Err(Error::Draft(e)) => {
                    error!(uid = %mail.uid, "Failed to save draft: {e}");
                }
            }
        }
        drafted
    }

    /// Extract → generate → normalize and format → save draft.
    async fn process_message(&self, raw: &str) -> error::Result<()> {
        let inbound = parse_message(raw.as_bytes())?;
        info!(
            from = inbound.sender_address.as_deref().unwrap_or("unknown"),
            subject = inbound.subject.as_deref().unwrap_or("(none)"),
            "New unseen message"
        );

        let recipient = inbound.recipient_name();
        let reply = self.generator.generate(&inbound.body, &recipient).await?;

        let to = inbound
            .sender_address
            .clone()
            .ok_or(ExtractionError::MissingSender)?;
        let draft = DraftDocument {
            to,
            subject: clean_subject(inbound.subject.as_deref()),
            html_body: format_email_body(&reply),
        };

        info!(to = %draft.to, subject = %draft.subject, "Saving draft reply");
        self.drafts.save_draft(draft).await?;
        Ok(())
    }
}
