//! One-shot notices carried across a redirect in the session cookie.

use actix_session::Session;
use actix_web::{error, Error};
use serde::{Deserialize, Serialize};

const MESSAGES_SESSION_KEY: &str = "_messages";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Info,
    Success,
    Warning,
    Error,
}

impl Level {
    /// CSS class of the notice.
    pub fn tag(&self) -> &'static str {
        match self {
            Level::Info => "info",
            Level::Success => "success",
            Level::Warning => "warning",
            Level::Error => "error",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub level: Level,
    pub text: String,
}

/// Queues a message for the next page the session renders.
pub fn add_message(session: &Session, level: Level, text: impl Into<String>) -> Result<(), Error> {
    let mut queued = session
        .get::<Vec<Message>>(MESSAGES_SESSION_KEY)
        .unwrap_or_default()
        .unwrap_or_default();
    queued.push(Message {
        level,
        text: text.into(),
    });
    session.insert(MESSAGES_SESSION_KEY, queued).map_err(|e| {
        log::error!("add_message: {}", e);
        error::ErrorInternalServerError("Failed to store message")
    })
}

pub fn success(session: &Session, text: impl Into<String>) -> Result<(), Error> {
    add_message(session, Level::Success, text)
}

pub fn warning(session: &Session, text: impl Into<String>) -> Result<(), Error> {
    add_message(session, Level::Warning, text)
}

/// Removes and returns every queued message.
pub fn take_messages(session: &Session) -> Vec<Message> {
    match session.remove_as::<Vec<Message>>(MESSAGES_SESSION_KEY) {
        Some(Ok(messages)) => messages,
        Some(Err(raw)) => {
            log::warn!("Discarding unreadable session messages: {}", raw);
            Vec::new()
        }
        None => Vec::new(),
    }
}
