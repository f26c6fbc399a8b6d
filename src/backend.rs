use crate::models::{Category, Habit, LogEntry, LogRow, User};
use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BackendError {
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("request failed: {0}")]
    Transport(String),

    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Errors the backend reported itself, as opposed to transport or decode
    /// failures on our side.
    pub fn is_api(&self) -> bool {
        matches!(self, BackendError::Api { .. })
    }

    /// The backend refused the access token, usually because it expired.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, BackendError::Api { status: 401 | 403, .. })
    }
}

pub type BackendResult<T> = Result<T, BackendError>;

/// Hosted data and auth service the tracker reads from and writes to.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn fetch_categories(&self) -> BackendResult<Vec<Category>>;

    async fn fetch_habits(&self) -> BackendResult<Vec<Habit>>;

    /// Log rows for `date`, each joined with its habit.
    async fn fetch_log_for_date(&self, date: NaiveDate) -> BackendResult<Vec<LogRow>>;

    async fn insert_log_entry(&self, entry: &LogEntry) -> BackendResult<()>;

    /// The user behind the current access token, `None` when signed out.
    async fn current_user(&self) -> BackendResult<Option<User>>;

    /// Resolves the user behind `token` without installing it.
    async fn user_for_token(&self, token: &str) -> BackendResult<Option<User>>;

    async fn sign_in_with_email_link(&self, email: &str, redirect_url: &str) -> BackendResult<()>;

    async fn set_access_token(&self, token: Option<String>);
}
