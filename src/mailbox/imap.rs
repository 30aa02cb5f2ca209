//! Blocking IMAP-over-TLS session with tagged commands.
//!
//! A deliberately small subset of the protocol: LOGIN, SELECT,
//! UID SEARCH UNSEEN, UID FETCH RFC822, APPEND, UID STORE \Seen,
//! LOGOUT. Per-message commands use UID semantics throughout because
//! fetching and flagging happen in different sessions. Sessions are
//! acquired and released within a single operation — the free
//! functions here guarantee LOGOUT on every exit path.

use std::io::{Read, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use rustls::pki_types::ServerName;
use secrecy::ExposeSecret;

use crate::config::Config;
use crate::error::ConnectionError;

const READ_TIMEOUT: Duration = Duration::from_secs(30);

/// One unseen message, as fetched from the inbox.
#[derive(Debug, Clone)]
pub struct FetchedMail {
    /// IMAP UID from UID SEARCH. Stable across sessions, unlike
    /// sequence numbers, so a later session can flag it \Seen safely.
    pub uid: String,
    /// Raw RFC822 content.
    pub raw: String,
}

/// An authenticated-capable IMAP session over rustls.
pub struct ImapSession {
    stream: rustls::StreamOwned<rustls::ClientConnection, TcpStream>,
    tag_seq: u32,
}

impl ImapSession {
    /// Connect and consume the server greeting.
    pub fn connect(host: &str, port: u16) -> Result<Self, ConnectionError> {
        let tcp = TcpStream::connect((host, port)).map_err(|e| ConnectionError::Connect {
            host: host.to_string(),
            port,
            reason: e.to_string(),
        })?;
        tcp.set_read_timeout(Some(READ_TIMEOUT))?;

        let mut root_store = rustls::RootCertStore::empty();
        root_store.extend(webpki_roots::TLS_SERVER_ROOTS.iter().cloned());
        let tls_config = Arc::new(
            rustls::ClientConfig::builder()
                .with_root_certificates(root_store)
                .with_no_client_auth(),
        );
        let server_name: ServerName<'static> = ServerName::try_from(host.to_string())
            .map_err(|e| ConnectionError::Tls(e.to_string()))?;
        let conn = rustls::ClientConnection::new(tls_config, server_name)
            .map_err(|e| ConnectionError::Tls(e.to_string()))?;

        let mut session = Self {
            stream: rustls::StreamOwned::new(conn, tcp),
            tag_seq: 0,
        };
        let _greeting = session.read_line()?;
        Ok(session)
    }

    pub fn login(&mut self, user: &str, pass: &str) -> Result<(), ConnectionError> {
        let command = format!("LOGIN \"{user}\" \"{pass}\"");
        match self.send_command(&command, "LOGIN") {
            Ok(_) => Ok(()),
            Err(ConnectionError::Command { .. }) => Err(ConnectionError::Auth {
                user: user.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    pub fn select(&mut self, folder: &str) -> Result<(), ConnectionError> {
        self.send_command(&format!("SELECT \"{folder}\""), "SELECT")?;
        Ok(())
    }

    /// UID SEARCH UNSEEN → message uids, in listing order.
    pub fn search_unseen(&mut self) -> Result<Vec<String>, ConnectionError> {
        let lines = self.send_command("UID SEARCH UNSEEN", "UID SEARCH")?;
        Ok(parse_search_response(&lines))
    }

    /// UID FETCH one message's full RFC822 content.
    pub fn fetch_raw(&mut self, uid: &str) -> Result<String, ConnectionError> {
        let lines = self.send_command(&fetch_command(uid), "UID FETCH")?;
        // Drop the untagged FETCH envelope line, the closing paren line
        // and the tagged completion; the rest is the literal.
        let raw: String = lines
            .iter()
            .skip(1)
            .take(lines.len().saturating_sub(3))
            .cloned()
            .collect();
        Ok(raw)
    }

    /// APPEND a document to `folder` with the given flags and no
    /// internal date (the server assigns one).
    pub fn append(&mut self, folder: &str, flags: &str, body: &[u8]) -> Result<(), ConnectionError> {
        let tag = self.next_tag();
        let command = format!("{tag} APPEND \"{folder}\" ({flags}) {{{}}}\r\n", body.len());
        self.stream.write_all(command.as_bytes())?;
        self.stream.flush()?;

        // The server must send a continuation before the literal.
        let line = self.read_line()?;
        if !line.starts_with('+') {
            return Err(ConnectionError::Command {
                command: "APPEND".to_string(),
                reason: line.trim().to_string(),
            });
        }

        self.stream.write_all(body)?;
        self.stream.write_all(b"\r\n")?;
        self.stream.flush()?;
        self.read_until_tag(&tag, "APPEND")?;
        Ok(())
    }

    pub fn store_seen(&mut self, uid: &str) -> Result<(), ConnectionError> {
        self.send_command(&store_seen_command(uid), "UID STORE")?;
        Ok(())
    }

    /// Best-effort LOGOUT. Errors are ignored so release is safe on
    /// every exit path.
    pub fn logout(mut self) {
        let _ = self.send_command("LOGOUT", "LOGOUT");
    }

    fn next_tag(&mut self) -> String {
        self.tag_seq += 1;
        format!("A{}", self.tag_seq)
    }

    fn send_command(&mut self, command: &str, label: &str) -> Result<Vec<String>, ConnectionError> {
        let tag = self.next_tag();
        let full = format!("{tag} {command}\r\n");
        self.stream.write_all(full.as_bytes())?;
        self.stream.flush()?;
        self.read_until_tag(&tag, label)
    }

    /// Collect response lines up to the tagged completion, which must
    /// report OK.
    fn read_until_tag(&mut self, tag: &str, label: &str) -> Result<Vec<String>, ConnectionError> {
        let mut lines = Vec::new();
        loop {
            let line = self.read_line()?;
            let done = line.starts_with(tag);
            lines.push(line);
            if done {
                break;
            }
        }
        let completion = lines.last().map(String::as_str).unwrap_or_default();
        if !completion.contains("OK") {
            return Err(ConnectionError::Command {
                command: label.to_string(),
                reason: completion.trim().to_string(),
            });
        }
        Ok(lines)
    }

    fn read_line(&mut self) -> Result<String, ConnectionError> {
        let mut buf = Vec::new();
        loop {
            let mut byte = [0u8; 1];
            match self.stream.read(&mut byte) {
                Ok(0) => return Err(ConnectionError::Closed),
                Ok(_) => {
                    buf.push(byte[0]);
                    if buf.ends_with(b"\r\n") {
                        return Ok(String::from_utf8_lossy(&buf).to_string());
                    }
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}

/// Fetch all unseen inbox messages in one scoped session.
pub fn fetch_unseen(config: &Config) -> Result<Vec<FetchedMail>, ConnectionError> {
    let mut session = ImapSession::connect(&config.imap_host, config.imap_port)?;
    let result = fetch_unseen_inner(&mut session, config);
    session.logout();
    result
}

fn fetch_unseen_inner(
    session: &mut ImapSession,
    config: &Config,
) -> Result<Vec<FetchedMail>, ConnectionError> {
    session.login(&config.email_user, config.email_pass.expose_secret())?;
    session.select("INBOX")?;
    let ids = session.search_unseen()?;
    let mut messages = Vec::with_capacity(ids.len());
    for id in ids {
        let raw = session.fetch_raw(&id)?;
        messages.push(FetchedMail { uid: id, raw });
    }
    Ok(messages)
}

/// Flag the given messages \Seen in one scoped session.
pub fn mark_seen(config: &Config, uids: &[String]) -> Result<(), ConnectionError> {
    if uids.is_empty() {
        return Ok(());
    }
    let mut session = ImapSession::connect(&config.imap_host, config.imap_port)?;
    let result = mark_seen_inner(&mut session, config, uids);
    session.logout();
    result
}

fn mark_seen_inner(
    session: &mut ImapSession,
    config: &Config,
    uids: &[String],
) -> Result<(), ConnectionError> {
    session.login(&config.email_user, config.email_pass.expose_secret())?;
    session.select("INBOX")?;
    for uid in uids {
        session.store_seen(uid)?;
    }
    Ok(())
}

fn fetch_command(uid: &str) -> String {
    format!("UID FETCH {uid} RFC822")
}

fn store_seen_command(uid: &str) -> String {
    format!("UID STORE {uid} +FLAGS (\\Seen)")
}

/// Collect ids from untagged SEARCH response lines.
fn parse_search_response(lines: &[String]) -> Vec<String> {
    let mut ids = Vec::new();
    for line in lines {
        if let Some(rest) = line.strip_prefix("* SEARCH") {
            ids.extend(rest.split_whitespace().map(String::from));
        }
    }
    ids
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn search_response_collects_uids_across_lines() {
        let lines = vec![
            "* SEARCH 401 407\r\n".to_string(),
            "* SEARCH 512\r\n".to_string(),
            "A2 OK SEARCH completed\r\n".to_string(),
        ];
        assert_eq!(parse_search_response(&lines), vec!["401", "407", "512"]);
    }

    #[test]
    fn search_response_empty_when_no_hits() {
        let lines = vec!["A2 OK SEARCH completed\r\n".to_string()];
        assert!(parse_search_response(&lines).is_empty());
    }

    // Sequence numbers are session-relative; fetching and flagging run
    // in different sessions, so every per-message command must address
    // the message by UID.
    #[test]
    fn per_message_commands_use_uid_semantics() {
        assert_eq!(fetch_command("407"), "UID FETCH 407 RFC822");
        assert_eq!(store_seen_command("407"), "UID STORE 407 +FLAGS (\\Seen)");
    }
}
