//! The email-to-draft pipeline: extract, normalize, format.
//!
//! Pure transformations only — everything with a network side effect
//! lives in `llm` or `mailbox`.

pub mod extract;
pub mod format;
pub mod subject;

pub use extract::{InboundMessage, clean_display_name, parse_message};
pub use format::format_email_body;
pub use subject::clean_subject;
