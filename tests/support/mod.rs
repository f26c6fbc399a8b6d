#![allow(dead_code)]

use async_trait::async_trait;
use chrono::NaiveDate;
use habit_tracker::backend::{Backend, BackendError, BackendResult};
use habit_tracker::config::AppConfig;
use habit_tracker::models::{Category, Habit, LogEntry, LogRow, LoggedHabit, RecordId, User};
use habit_tracker::state::{AppState, Connector};
use habit_tracker::router;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

pub const TOKEN: &str = "valid-token";

#[derive(Default)]
pub struct Store {
    pub categories: Vec<Category>,
    pub habits: Vec<Habit>,
    pub entries: Vec<LogEntry>,
    pub access_token: Option<String>,
    pub insert_calls: usize,
    pub log_fetches: Vec<NaiveDate>,
    pub login_links: Vec<(String, String)>,
    pub fail_inserts: bool,
    pub fail_categories: bool,
    pub token_expired: bool,
}

/// In-memory stand-in for the hosted backend.
#[derive(Default)]
pub struct MemoryBackend {
    pub store: Mutex<Store>,
}

impl MemoryBackend {
    pub fn health_and_run() -> Arc<Self> {
        let backend = MemoryBackend::default();
        {
            let mut store = backend.store.lock().unwrap();
            store.categories = vec![Category {
                id: RecordId::from(1),
                name: "Health".to_string(),
            }];
            store.habits = vec![Habit {
                id: RecordId::from(10),
                name: "Run".to_string(),
                category_id: RecordId::from(1),
                default_points: 5,
            }];
        }
        Arc::new(backend)
    }

    pub fn insert_calls(&self) -> usize {
        self.store.lock().unwrap().insert_calls
    }

    pub fn log_fetches(&self) -> Vec<NaiveDate> {
        self.store.lock().unwrap().log_fetches.clone()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.store.lock().unwrap().entries.clone()
    }

    pub fn access_token(&self) -> Option<String> {
        self.store.lock().unwrap().access_token.clone()
    }

    /// Makes every data call fail the way an expired JWT does.
    pub fn expire_token(&self) {
        self.store.lock().unwrap().token_expired = true;
    }
}

fn jwt_expired() -> BackendError {
    BackendError::Api {
        status: 401,
        message: "JWT expired".to_string(),
    }
}

fn user_for(token: Option<&str>) -> Option<User> {
    match token {
        Some(TOKEN) => Some(User {
            id: "user-1".to_string(),
            email: Some("runner@example.com".to_string()),
        }),
        _ => None,
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    async fn fetch_categories(&self) -> BackendResult<Vec<Category>> {
        let store = self.store.lock().unwrap();
        if store.fail_categories {
            return Err(BackendError::Api {
                status: 500,
                message: "categories unavailable".to_string(),
            });
        }
        Ok(store.categories.clone())
    }

    async fn fetch_habits(&self) -> BackendResult<Vec<Habit>> {
        Ok(self.store.lock().unwrap().habits.clone())
    }

    async fn fetch_log_for_date(&self, date: NaiveDate) -> BackendResult<Vec<LogRow>> {
        let mut store = self.store.lock().unwrap();
        store.log_fetches.push(date);
        if store.token_expired {
            return Err(jwt_expired());
        }
        let rows = store
            .entries
            .iter()
            .filter(|entry| entry.date == date)
            .filter_map(|entry| {
                let habit = store.habits.iter().find(|habit| habit.id == entry.habit_id)?;
                Some(LogRow {
                    date: entry.date,
                    recorded_points: Some(entry.recorded_points),
                    habit: LoggedHabit {
                        name: habit.name.clone(),
                        default_points: habit.default_points,
                        category: habit.category_id.clone(),
                    },
                })
            })
            .collect();
        Ok(rows)
    }

    async fn insert_log_entry(&self, entry: &LogEntry) -> BackendResult<()> {
        let mut store = self.store.lock().unwrap();
        store.insert_calls += 1;
        if store.token_expired {
            return Err(jwt_expired());
        }
        if store.fail_inserts {
            return Err(BackendError::Api {
                status: 409,
                message: "insert rejected".to_string(),
            });
        }
        store.entries.push(entry.clone());
        Ok(())
    }

    async fn current_user(&self) -> BackendResult<Option<User>> {
        let store = self.store.lock().unwrap();
        Ok(user_for(store.access_token.as_deref()))
    }

    async fn user_for_token(&self, token: &str) -> BackendResult<Option<User>> {
        Ok(user_for(Some(token)))
    }

    async fn sign_in_with_email_link(&self, email: &str, redirect_url: &str) -> BackendResult<()> {
        self.store
            .lock()
            .unwrap()
            .login_links
            .push((email.to_string(), redirect_url.to_string()));
        Ok(())
    }

    async fn set_access_token(&self, token: Option<String>) {
        self.store.lock().unwrap().access_token = token;
    }
}

pub fn test_config() -> AppConfig {
    AppConfig::new("https://demo.supabase.co", "anon-key", "http://localhost/auth/callback")
}

fn unique_config_path() -> PathBuf {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    let mut path = std::env::temp_dir();
    path.push(format!("habit_tracker_flow_{}_{}.json", std::process::id(), nanos));
    path
}

pub fn test_state(backend: Arc<MemoryBackend>) -> AppState {
    let connector: Connector = Arc::new(move |_: &AppConfig| backend.clone() as Arc<dyn Backend>);
    AppState::with_connector(unique_config_path(), Some(test_config()), connector)
}

/// Serves the router on a random local port and returns its base url.
pub async fn spawn_app(state: AppState) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind random port");
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.unwrap();
    });
    format!("http://{addr}")
}
