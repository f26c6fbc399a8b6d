use crate::backend::{Backend, BackendError, BackendResult};
use crate::config::{AppConfig, TableNames};
use crate::models::{Category, Habit, LogEntry, LogRow, User};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tokio::sync::RwLock;
use tracing::debug;

/// Supabase REST (PostgREST) and auth (GoTrue) client.
pub struct SupabaseBackend {
    client: Client,
    base_url: String,
    api_key: String,
    tables: TableNames,
    access_token: RwLock<Option<String>>,
}

impl SupabaseBackend {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.trim_end_matches('/').to_string(),
            api_key: config.supabase_key.clone(),
            tables: config.tables.clone(),
            access_token: RwLock::new(None),
        }
    }

    fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    async fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self.access_token.read().await;
        let bearer = token.as_deref().unwrap_or(&self.api_key);
        request.header("apikey", &self.api_key).bearer_auth(bearer)
    }

    async fn send(&self, request: RequestBuilder) -> BackendResult<Response> {
        let request = self.authorized(request).await;
        self.dispatch(request).await
    }

    async fn dispatch(&self, request: RequestBuilder) -> BackendResult<Response> {
        let response = request
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Err(BackendError::Api {
            status: status.as_u16(),
            message: api_message(status, &body),
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> BackendResult<T> {
        self.send(request)
            .await?
            .json()
            .await
            .map_err(|err| BackendError::Decode(err.to_string()))
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(alias = "msg", alias = "error_description")]
    message: Option<String>,
}

fn api_message(status: StatusCode, body: &str) -> String {
    serde_json::from_str::<ApiErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message)
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| format!("backend returned {status}"))
}

#[async_trait]
impl Backend for SupabaseBackend {
    async fn fetch_categories(&self) -> BackendResult<Vec<Category>> {
        let request = self
            .client
            .get(self.rest_url(&self.tables.habit_categories))
            .query(&[("select", "id,category_name")]);
        self.get_json(request).await
    }

    async fn fetch_habits(&self) -> BackendResult<Vec<Habit>> {
        let request = self
            .client
            .get(self.rest_url(&self.tables.habits))
            .query(&[("select", "id,name,category,default_points")]);
        self.get_json(request).await
    }

    async fn fetch_log_for_date(&self, date: NaiveDate) -> BackendResult<Vec<LogRow>> {
        let request = self.client.get(self.rest_url(&self.tables.habit_log)).query(&[
            (
                "select",
                "date,recorded_points,habits(name,default_points,category)".to_string(),
            ),
            ("date", format!("eq.{date}")),
        ]);
        self.get_json(request).await
    }

    async fn insert_log_entry(&self, entry: &LogEntry) -> BackendResult<()> {
        let request = self
            .client
            .post(self.rest_url(&self.tables.habit_log))
            .header("Prefer", "return=representation")
            .json(entry);
        let inserted: Vec<serde_json::Value> = self.get_json(request).await?;
        debug!(rows = inserted.len(), "log entry inserted");
        Ok(())
    }

    async fn current_user(&self) -> BackendResult<Option<User>> {
        let token = self.access_token.read().await.clone();
        match token {
            Some(token) => self.user_for_token(&token).await,
            None => Ok(None),
        }
    }

    async fn user_for_token(&self, token: &str) -> BackendResult<Option<User>> {
        let request = self
            .client
            .get(self.auth_url("user"))
            .header("apikey", &self.api_key)
            .bearer_auth(token);

        match self.dispatch(request).await {
            Ok(response) => response
                .json()
                .await
                .map(Some)
                .map_err(|err| BackendError::Decode(err.to_string())),
            Err(err) if err.is_unauthorized() => Ok(None),
            Err(err) => Err(err),
        }
    }

    async fn sign_in_with_email_link(&self, email: &str, redirect_url: &str) -> BackendResult<()> {
        let request = self
            .client
            .post(self.auth_url("otp"))
            .query(&[("redirect_to", redirect_url)])
            .json(&serde_json::json!({ "email": email, "create_user": true }));
        self.send(request).await?;
        Ok(())
    }

    async fn set_access_token(&self, token: Option<String>) {
        *self.access_token.write().await = token;
    }
}
