// Error type returned by every Tauri command.
// Serializable so the frontend receives `{ type, message }` instead of a bare string.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::modules::calendar::CalendarError;
use crate::modules::mail::MailError;
use crate::modules::tabs::ViewId;
use crate::settings::SettingsError;

#[derive(Debug, Clone, Error, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum AppError {
    #[error("Settings error: {0}")]
    Settings(String),

    #[error("Mail configuration error: {0}")]
    MailConfig(String),

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Calendar error: {0}")]
    Calendar(String),

    #[error("View not found: {0}")]
    ViewNotFound(ViewId),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Shell error: {0}")]
    Shell(String),

    #[error("State lock poisoned: {0}")]
    Poisoned(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<SettingsError> for AppError {
    fn from(err: SettingsError) -> Self {
        AppError::Settings(err.to_string())
    }
}

impl From<MailError> for AppError {
    fn from(err: MailError) -> Self {
        match err {
            MailError::MissingField(_) | MailError::InvalidPort { .. } | MailError::InvalidAddress(_) => {
                AppError::MailConfig(err.to_string())
            }
            other => AppError::Mail(other.to_string()),
        }
    }
}

impl From<CalendarError> for AppError {
    fn from(err: CalendarError) -> Self {
        AppError::Calendar(err.to_string())
    }
}

impl From<tauri::Error> for AppError {
    fn from(err: tauri::Error) -> Self {
        AppError::Shell(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for AppError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        AppError::Poisoned(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let err = AppError::InvalidInput("empty".to_string());
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "InvalidInput");
        assert_eq!(json["message"], "empty");
    }

    #[test]
    fn poisoned_lock_carries_a_message() {
        let lock = std::sync::Arc::new(std::sync::Mutex::new(0));
        let clone = lock.clone();
        let _ = std::thread::spawn(move || {
            let _guard = clone.lock().unwrap();
            panic!("poison the lock");
        })
        .join();

        let err: AppError = lock.lock().unwrap_err().into();
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["type"], "Poisoned");
        assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[test]
    fn mail_config_errors_are_kept_apart_from_transport_errors() {
        let config: AppError = MailError::MissingField("email").into();
        assert!(matches!(config, AppError::MailConfig(_)));

        let transport: AppError = MailError::Imap("connection refused".to_string()).into();
        assert!(matches!(transport, AppError::Mail(_)));
    }
}
