//! Mail client backing the email panel.
//!
//! Configuration is derived from the settings record on every call, so a
//! saved change applies to the next fetch or send without a restart. All
//! functions here block on the network; callers run them off the UI thread.

use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{Message, SmtpTransport, Transport};
use mailparse::MailHeaderMap;
use native_tls::{TlsConnector, TlsStream};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::TcpStream;
use thiserror::Error;

use crate::settings::Settings;

pub const DEFAULT_IMAP_PORT: u16 = 993;
pub const DEFAULT_SMTP_PORT: u16 = 587;
pub const INBOX: &str = "INBOX";
pub const NO_SUBJECT: &str = "(no subject)";

/// Longest sequence set put on one FETCH line. Servers cap command lines
/// (8192 octets is the common floor), so larger sets are split.
pub const MAX_SEQUENCE_SET_LEN: usize = 4000;

/// Folders the panel shows before the server has been asked.
pub const DEFAULT_FOLDERS: [&str; 3] = ["Inbox", "Sent", "Drafts"];

#[derive(Debug, Error)]
pub enum MailError {
    #[error("{0} is not set")]
    MissingField(&'static str),

    #[error("invalid {field}: {value:?}")]
    InvalidPort { field: &'static str, value: String },

    #[error("invalid address: {0}")]
    InvalidAddress(String),

    #[error("TLS error: {0}")]
    Tls(String),

    #[error("IMAP error: {0}")]
    Imap(String),

    #[error("SMTP error: {0}")]
    Smtp(String),

    #[error("could not build message: {0}")]
    Message(String),
}

impl From<native_tls::Error> for MailError {
    fn from(err: native_tls::Error) -> Self {
        MailError::Tls(err.to_string())
    }
}

impl From<imap::Error> for MailError {
    fn from(err: imap::Error) -> Self {
        MailError::Imap(err.to_string())
    }
}

impl From<lettre::transport::smtp::Error> for MailError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        MailError::Smtp(err.to_string())
    }
}

impl From<lettre::error::Error> for MailError {
    fn from(err: lettre::error::Error) -> Self {
        MailError::Message(err.to_string())
    }
}

impl From<lettre::address::AddressError> for MailError {
    fn from(err: lettre::address::AddressError) -> Self {
        MailError::InvalidAddress(err.to_string())
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl Credentials {
    fn from_settings(settings: &Settings) -> Result<Self, MailError> {
        Ok(Self {
            email: required("email", &settings.email)?,
            password: settings.password.clone(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImapConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,
}

impl ImapConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, MailError> {
        Ok(Self {
            host: required("imap_server", &settings.imap_server)?,
            port: parse_port("imap_port", &settings.imap_port, DEFAULT_IMAP_PORT)?,
            credentials: Credentials::from_settings(settings)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub credentials: Credentials,
}

impl SmtpConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self, MailError> {
        Ok(Self {
            host: required("smtp_server", &settings.smtp_server)?,
            port: parse_port("smtp_port", &settings.smtp_port, DEFAULT_SMTP_PORT)?,
            credentials: Credentials::from_settings(settings)?,
        })
    }
}

fn required(field: &'static str, value: &str) -> Result<String, MailError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(MailError::MissingField(field));
    }
    Ok(value.to_string())
}

fn parse_port(field: &'static str, value: &str, default: u16) -> Result<u16, MailError> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(default);
    }
    match value.parse::<u16>() {
        Ok(port) if port != 0 => Ok(port),
        _ => Err(MailError::InvalidPort {
            field,
            value: value.to_string(),
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Folder {
    pub name: String,
}

pub fn default_folders() -> Vec<Folder> {
    DEFAULT_FOLDERS
        .iter()
        .map(|name| Folder { name: name.to_string() })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MessageSummary {
    pub seq: u32,
    pub subject: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct OutgoingMessage {
    pub to: String,
    pub subject: String,
    pub body: String,
}

type ImapSession = imap::Session<TlsStream<TcpStream>>;

fn open_session(config: &ImapConfig) -> Result<ImapSession, MailError> {
    let tls = TlsConnector::new()?;
    let client = imap::connect((config.host.as_str(), config.port), &config.host, &tls)?;
    let session = client
        .login(&config.credentials.email, &config.credentials.password)
        .map_err(|(e, _client)| MailError::from(e))?;
    log::info!("[Mail] Logged in to {}:{}", config.host, config.port);
    Ok(session)
}

/// Lists the subject of every message in the inbox, oldest first.
pub fn fetch_inbox(config: &ImapConfig) -> Result<Vec<MessageSummary>, MailError> {
    let mut session = open_session(config)?;
    session.select(INBOX)?;

    let seqs: Vec<u32> = session.search("ALL")?.into_iter().collect();

    let mut summaries = Vec::with_capacity(seqs.len());
    for sequence_set in sequence_sets(&seqs, MAX_SEQUENCE_SET_LEN) {
        let fetches = session.fetch(sequence_set, "BODY.PEEK[HEADER]")?;
        for fetch in fetches.iter() {
            let subject = fetch
                .header()
                .map(subject_from_header)
                .unwrap_or_else(|| NO_SUBJECT.to_string());
            summaries.push(MessageSummary {
                seq: fetch.message,
                subject,
            });
        }
    }
    summaries.sort_by_key(|m| m.seq);

    session.logout()?;
    log::info!("[Mail] Fetched {} message headers from {}", summaries.len(), config.host);
    Ok(summaries)
}

/// Packs sequence numbers into IMAP sequence sets of at most `max_len`
/// bytes each. Consecutive numbers collapse into `first:last` ranges, so a
/// full `SEARCH ALL` result becomes a single `1:N`.
pub fn sequence_sets(seqs: &[u32], max_len: usize) -> Vec<String> {
    let mut sorted = seqs.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let mut ranges: Vec<String> = Vec::new();
    let mut iter = sorted.into_iter().peekable();
    while let Some(first) = iter.next() {
        let mut last = first;
        while last < u32::MAX && iter.peek() == Some(&(last + 1)) {
            last += 1;
            iter.next();
        }
        ranges.push(if first == last {
            first.to_string()
        } else {
            format!("{}:{}", first, last)
        });
    }

    let mut sets = Vec::new();
    let mut current = String::new();
    for range in ranges {
        if !current.is_empty() && current.len() + 1 + range.len() > max_len {
            sets.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(',');
        }
        current.push_str(&range);
    }
    if !current.is_empty() {
        sets.push(current);
    }
    sets
}

/// Asks the server for its mailbox names.
pub fn list_folders(config: &ImapConfig) -> Result<Vec<Folder>, MailError> {
    let mut session = open_session(config)?;
    let names = session.list(Some(""), Some("*"))?;
    let folders = names
        .iter()
        .map(|n| Folder {
            name: n.name().to_string(),
        })
        .collect();
    session.logout()?;
    Ok(folders)
}

/// Extracts the decoded Subject header from a raw header block.
pub fn subject_from_header(raw: &[u8]) -> String {
    match mailparse::parse_headers(raw) {
        Ok((headers, _)) => headers
            .get_first_value("Subject")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_SUBJECT.to_string()),
        Err(e) => {
            log::warn!("[Mail] Unparseable header block: {}", e);
            NO_SUBJECT.to_string()
        }
    }
}

/// Builds a single-part plain-text message. `to` may list several
/// comma-separated recipients.
pub fn build_message(from: &str, message: &OutgoingMessage) -> Result<Message, MailError> {
    let mut builder = Message::builder()
        .from(from.parse::<Mailbox>()?)
        .subject(message.subject.as_str())
        .header(ContentType::TEXT_PLAIN);

    let mut recipients = 0;
    for addr in message.to.split(',').map(str::trim).filter(|a| !a.is_empty()) {
        builder = builder.to(addr.parse::<Mailbox>()?);
        recipients += 1;
    }
    if recipients == 0 {
        return Err(MailError::MissingField("to"));
    }

    Ok(builder.body(message.body.clone())?)
}

/// Submits `message` over SMTP with STARTTLS.
pub fn send(config: &SmtpConfig, message: &OutgoingMessage) -> Result<(), MailError> {
    let email = build_message(&config.credentials.email, message)?;

    let mailer = SmtpTransport::starttls_relay(&config.host)?
        .port(config.port)
        .credentials(SmtpCredentials::new(
            config.credentials.email.clone(),
            config.credentials.password.clone(),
        ))
        .build();

    mailer.send(&email)?;
    log::info!("[Mail] Sent '{}' via {}:{}", message.subject, config.host, config.port);
    Ok(())
}
