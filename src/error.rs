//! Error types for draft-pilot.
//!
//! One enum per failure domain so the poller can branch on the stage
//! that failed rather than on a blanket catch-all.

/// Per-message pipeline error — one variant per stage. Configuration
/// and connection failures never reach this type: the former are fatal
/// before the pipeline starts, the latter abort a whole cycle before
/// any message is processed.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Draft error: {0}")]
    Draft(#[from] DraftError),
}

/// Configuration-related errors. Fatal at startup only.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// IMAP transport errors. Abort the current poll cycle only; the next
/// timer tick retries naturally.
#[derive(Debug, thiserror::Error)]
pub enum ConnectionError {
    #[error("Failed to connect to {host}:{port}: {reason}")]
    Connect {
        host: String,
        port: u16,
        reason: String,
    },

    #[error("TLS setup failed: {0}")]
    Tls(String),

    #[error("IMAP login failed for {user}")]
    Auth { user: String },

    #[error("IMAP {command} failed: {reason}")]
    Command { command: String, reason: String },

    #[error("IMAP connection closed unexpectedly")]
    Closed,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A single message could not be turned into an inbound message.
/// The message is skipped; the cycle continues.
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Message could not be parsed")]
    Unparseable,

    #[error("Message has no text/plain part")]
    NoTextBody,

    #[error("Message has no sender address")]
    MissingSender,
}

/// Generation backend errors. Retried per the policy; after exhaustion
/// the message is skipped.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("Generation backend unavailable: {0}")]
    Unavailable(String),

    #[error("Generation request failed: {0}")]
    Request(String),

    #[error("Invalid response from generation backend: {0}")]
    InvalidResponse(String),
}

/// Draft composition or append errors. Logged; the message is lost for
/// this cycle (no re-queue exists).
#[derive(Debug, thiserror::Error)]
pub enum DraftError {
    #[error("Failed to compose draft: {0}")]
    Compose(String),

    #[error("Failed to append draft: {0}")]
    Append(#[from] ConnectionError),

    #[error("Draft task failed: {0}")]
    Task(String),
}

/// Result type alias for the pipeline.
pub type Result<T> = std::result::Result<T, Error>;
