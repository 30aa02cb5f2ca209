//! Message Extractor — raw RFC822 bytes to a normalized inbound message.

use mail_parser::{Message, MessageParser, MimeHeaders};

use crate::error::ExtractionError;

/// Used when neither a display name nor an address local part is
/// available to address the reply to.
pub const FALLBACK_RECIPIENT: &str = "Recipient Name";

/// One unseen message, normalized for the pipeline. Read-only after
/// construction; lives for a single processing pass.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Cleaned display name from the From header, when it looks like a
    /// real name.
    pub sender_name: Option<String>,
    /// Sender address from the From header.
    pub sender_address: Option<String>,
    pub subject: Option<String>,
    /// Decoded text/plain body.
    pub body: String,
}

impl InboundMessage {
    /// Name used to address the reply: display name, else the local
    /// part of the sender address, else a fixed placeholder.
    pub fn recipient_name(&self) -> String {
        if let Some(name) = &self.sender_name {
            return name.clone();
        }
        if let Some(addr) = &self.sender_address
            && let Some(local) = addr.split('@').next()
            && !local.is_empty()
        {
            return local.to_string();
        }
        FALLBACK_RECIPIENT.to_string()
    }
}

/// Parse one fetched message.
///
/// Body rule: the first text/plain part of a multipart message, or the
/// decoded payload of a single-part one. A message with no text body or
/// no sender address is an extraction failure — the caller skips it.
pub fn parse_message(raw: &[u8]) -> Result<InboundMessage, ExtractionError> {
    let parsed = MessageParser::default()
        .parse(raw)
        .ok_or(ExtractionError::Unparseable)?;

    let from = parsed.from().and_then(|addr| addr.first());
    let sender_address = from
        .and_then(|a| a.address.as_ref())
        .map(|s| s.to_string());
    let sender_name = from
        .and_then(|a| a.name.as_ref())
        .and_then(|n| clean_display_name(n));

    if sender_address.is_none() {
        return Err(ExtractionError::MissingSender);
    }

    let body = extract_text_body(&parsed).ok_or(ExtractionError::NoTextBody)?;

    Ok(InboundMessage {
        sender_name,
        sender_address,
        subject: parsed.subject().map(|s| s.to_string()),
        body,
    })
}

/// Body text for the message.
///
/// A single-part message decodes its sole payload directly, whatever
/// the subtype. Multipart messages yield their first text/plain part,
/// scanned in document order; parts without a Content-Type header count
/// as plain text per RFC 2045, and non-text parts never match.
fn extract_text_body(parsed: &Message) -> Option<String> {
    let root = parsed.parts.first()?;
    let is_multipart = root
        .content_type()
        .is_some_and(|ct| ct.ctype().eq_ignore_ascii_case("multipart"));
    if !is_multipart {
        return root.text_contents().map(|s| s.to_string());
    }

    for part in &parsed.parts {
        let is_plain = match part.content_type() {
            Some(ct) => {
                ct.ctype().eq_ignore_ascii_case("text")
                    && ct
                        .subtype()
                        .is_none_or(|st| st.eq_ignore_ascii_case("plain"))
            }
            None => true,
        };
        if is_plain
            && let Some(text) = part.text_contents()
        {
            return Some(text.to_string());
        }
    }
    None
}

/// Clean a raw From-header display name.
///
/// Strips surrounding quotes; rejects names that contain `@` (an
/// address masquerading as a name); keeps only the first token of a
/// multi-word name, on the assumption it is a given name.
pub fn clean_display_name(name: &str) -> Option<String> {
    let name = name.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    if name.is_empty() || name.contains('@') {
        return None;
    }
    name.split_whitespace().next().map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Display name cleaning ───────────────────────────────────────

    #[test]
    fn quoted_full_name_keeps_first_token() {
        assert_eq!(clean_display_name("\"John Smith\""), Some("John".into()));
    }

    #[test]
    fn single_name_kept_as_is() {
        assert_eq!(clean_display_name("Alice"), Some("Alice".into()));
    }

    #[test]
    fn address_as_name_rejected() {
        assert_eq!(clean_display_name("weird@name.com"), None);
    }

    #[test]
    fn empty_and_quotes_only_rejected() {
        assert_eq!(clean_display_name(""), None);
        assert_eq!(clean_display_name("\"\""), None);
        assert_eq!(clean_display_name("  "), None);
    }

    // ── Recipient resolution ────────────────────────────────────────

    fn inbound(name: Option<&str>, address: Option<&str>) -> InboundMessage {
        InboundMessage {
            sender_name: name.map(String::from),
            sender_address: address.map(String::from),
            subject: None,
            body: String::new(),
        }
    }

    #[test]
    fn recipient_prefers_display_name() {
        let msg = inbound(Some("Jane"), Some("jane@x.com"));
        assert_eq!(msg.recipient_name(), "Jane");
    }

    #[test]
    fn recipient_falls_back_to_local_part() {
        let msg = inbound(None, Some("weird@name.com"));
        assert_eq!(msg.recipient_name(), "weird");
    }

    #[test]
    fn recipient_falls_back_to_placeholder() {
        let msg = inbound(None, None);
        assert_eq!(msg.recipient_name(), FALLBACK_RECIPIENT);
    }

    // ── Full message parsing ────────────────────────────────────────

    const SINGLE_PART: &str = "From: \"John Smith\" <john@example.com>\r\n\
        To: me@example.com\r\n\
        Subject: Project Update\r\n\
        Content-Type: text/plain; charset=utf-8\r\n\
        \r\n\
        Please review the attached numbers.\r\n";

    #[test]
    fn single_part_message_extracted() {
        let msg = parse_message(SINGLE_PART.as_bytes()).unwrap();
        assert_eq!(msg.sender_name.as_deref(), Some("John"));
        assert_eq!(msg.sender_address.as_deref(), Some("john@example.com"));
        assert_eq!(msg.subject.as_deref(), Some("Project Update"));
        assert!(msg.body.contains("Please review"));
    }

    #[test]
    fn multipart_takes_first_text_plain() {
        let raw = "From: jane@x.com\r\n\
            Subject: Re: Meeting\r\n\
            Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
            \r\n\
            --b1\r\n\
            Content-Type: text/plain; charset=utf-8\r\n\
            \r\n\
            plain body here\r\n\
            --b1\r\n\
            Content-Type: text/html; charset=utf-8\r\n\
            \r\n\
            <p>html body here</p>\r\n\
            --b1--\r\n";
        let msg = parse_message(raw.as_bytes()).unwrap();
        assert_eq!(msg.body.trim(), "plain body here");
        // Bare address in From carries no display name
        assert_eq!(msg.sender_name, None);
        assert_eq!(msg.recipient_name(), "jane");
    }

    #[test]
    fn single_part_html_decoded_directly() {
        let raw = "From: jane@x.com\r\n\
            Subject: hi\r\n\
            Content-Type: text/html; charset=utf-8\r\n\
            \r\n\
            <p>Hello from a rich client</p>\r\n";
        let msg = parse_message(raw.as_bytes()).unwrap();
        assert!(msg.body.contains("Hello from a rich client"));
    }

    #[test]
    fn multipart_html_only_is_extraction_error() {
        let raw = "From: jane@x.com\r\n\
            Subject: hi\r\n\
            Content-Type: multipart/alternative; boundary=\"b1\"\r\n\
            \r\n\
            --b1\r\n\
            Content-Type: text/html; charset=utf-8\r\n\
            \r\n\
            <p>only html</p>\r\n\
            --b1--\r\n";
        let err = parse_message(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, ExtractionError::NoTextBody));
    }

    #[test]
    fn missing_sender_is_extraction_error() {
        let raw = "Subject: orphan\r\n\
            Content-Type: text/plain\r\n\
            \r\n\
            body\r\n";
        let err = parse_message(raw.as_bytes()).unwrap_err();
        assert!(matches!(err, ExtractionError::MissingSender));
    }
}
