//! Draft Writer — compose the HTML reply and append it to the drafts
//! folder with the \Draft flag.

use std::sync::Arc;

use async_trait::async_trait;
use lettre::message::header::ContentType;
use lettre::message::{Message, SinglePart};
use secrecy::ExposeSecret;

use crate::config::Config;
use crate::error::DraftError;
use crate::mailbox::imap::ImapSession;

/// A reply ready to be stored. Write-once; never referenced again after
/// the append.
#[derive(Debug, Clone)]
pub struct DraftDocument {
    /// Sender address of the original message.
    pub to: String,
    /// Normalized subject (reply/forward prefix already stripped).
    pub subject: String,
    /// Formatted paragraph blocks.
    pub html_body: String,
}

/// Stores one draft. Object seam so the poller can run against an
/// in-memory store in tests.
#[async_trait]
pub trait DraftStore: Send + Sync {
    async fn save_draft(&self, draft: DraftDocument) -> Result<(), DraftError>;
}

/// Build the RFC822 bytes for a draft: HTML content type, From set to
/// the configured account.
pub fn build_mime(from: &str, draft: &DraftDocument) -> Result<Vec<u8>, DraftError> {
    let message = Message::builder()
        .from(from
            .parse()
            .map_err(|e| DraftError::Compose(format!("invalid from address: {e}")))?)
        .to(draft
            .to
            .parse()
            .map_err(|e| DraftError::Compose(format!("invalid to address: {e}")))?)
        .subject(draft.subject.clone())
        .singlepart(
            SinglePart::builder()
                .header(ContentType::TEXT_HTML)
                .body(draft.html_body.clone()),
        )
        .map_err(|e| DraftError::Compose(e.to_string()))?;
    Ok(message.formatted())
}

/// Compose and append one draft in a scoped IMAP session. Blocking —
/// run inside `spawn_blocking`.
pub fn save_draft_blocking(config: &Config, draft: &DraftDocument) -> Result<(), DraftError> {
    let bytes = build_mime(&config.email_user, draft)?;
    let mut session = ImapSession::connect(&config.imap_host, config.imap_port)
        .map_err(DraftError::Append)?;
    let result = append_inner(&mut session, config, &bytes);
    session.logout();
    result
}

fn append_inner(
    session: &mut ImapSession,
    config: &Config,
    bytes: &[u8],
) -> Result<(), DraftError> {
    session.login(&config.email_user, config.email_pass.expose_secret())?;
    session.select(&config.drafts_folder)?;
    session.append(&config.drafts_folder, "\\Draft", bytes)?;
    Ok(())
}

/// IMAP-backed draft store.
pub struct ImapDraftStore {
    config: Arc<Config>,
}

impl ImapDraftStore {
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl DraftStore for ImapDraftStore {
    async fn save_draft(&self, draft: DraftDocument) -> Result<(), DraftError> {
        let config = Arc::clone(&self.config);
        tokio::task::spawn_blocking(move || save_draft_blocking(&config, &draft))
            .await
            .map_err(|e| DraftError::Task(e.to_string()))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::format_email_body;

    fn sample_draft() -> DraftDocument {
        DraftDocument {
            to: "jane@x.com".to_string(),
            subject: "Meeting".to_string(),
            html_body: format_email_body("Thank you.\n\nRegards."),
        }
    }

    #[test]
    fn mime_carries_addressing_headers() {
        let bytes = build_mime("me@example.com", &sample_draft()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("From: me@example.com\r\n"));
        assert!(text.contains("To: jane@x.com\r\n"));
        assert!(text.contains("Subject: Meeting\r\n"));
    }

    #[test]
    fn mime_is_html() {
        let bytes = build_mime("me@example.com", &sample_draft()).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("Content-Type: text/html"));
        assert!(text.contains("Thank you."));
        assert!(text.contains("Regards."));
    }

    #[test]
    fn invalid_to_address_is_compose_error() {
        let mut draft = sample_draft();
        draft.to = "not an address".to_string();
        let err = build_mime("me@example.com", &draft).unwrap_err();
        assert!(matches!(err, DraftError::Compose(_)));
    }

    #[test]
    fn invalid_from_address_is_compose_error() {
        let err = build_mime("", &sample_draft()).unwrap_err();
        assert!(matches!(err, DraftError::Compose(_)));
    }
}
