//! draft-pilot — unattended draft replies for a single mailbox.
//!
//! Polls an IMAP inbox for unseen messages, asks a local Ollama backend
//! for a professional reply, and appends the result to the drafts folder
//! for human review. Nothing is ever sent.

pub mod config;
pub mod error;
pub mod llm;
pub mod mailbox;
pub mod pipeline;
pub mod poller;
