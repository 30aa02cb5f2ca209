//! Mailbox access — blocking IMAP session plus the draft writer.
//!
//! Everything in `imap` blocks on the network; the poller runs it in
//! `tokio::task::spawn_blocking`.

pub mod draft;
pub mod imap;

pub use draft::{DraftDocument, DraftStore, ImapDraftStore, build_mime};
pub use imap::{FetchedMail, ImapSession, fetch_unseen, mark_seen};
