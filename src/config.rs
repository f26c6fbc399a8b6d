use crate::aggregate::PointSource;
use crate::errors::AppError;
use serde::{Deserialize, Serialize};
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableNames {
    #[serde(default = "default_categories_table")]
    pub habit_categories: String,
    #[serde(default = "default_log_table")]
    pub habit_log: String,
    #[serde(default = "default_habits_table")]
    pub habits: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            habit_categories: default_categories_table(),
            habit_log: default_log_table(),
            habits: default_habits_table(),
        }
    }
}

fn default_categories_table() -> String {
    "habit_categories".to_string()
}

fn default_log_table() -> String {
    "habit_log".to_string()
}

fn default_habits_table() -> String {
    "habits".to_string()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub supabase_url: String,
    #[serde(default)]
    pub supabase_key: String,
    #[serde(default)]
    pub redirect_url: String,
    #[serde(default)]
    pub tables: TableNames,
    #[serde(default)]
    pub point_source: PointSource,
}

impl AppConfig {
    pub fn new(
        supabase_url: impl Into<String>,
        supabase_key: impl Into<String>,
        redirect_url: impl Into<String>,
    ) -> Self {
        Self {
            supabase_url: supabase_url.into().trim().to_string(),
            supabase_key: supabase_key.into().trim().to_string(),
            redirect_url: redirect_url.into().trim().to_string(),
            tables: TableNames::default(),
            point_source: PointSource::default(),
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let missing = [&self.supabase_url, &self.supabase_key, &self.redirect_url]
            .iter()
            .any(|value| value.trim().is_empty());
        if missing {
            return Err(AppError::config_missing());
        }
        Ok(())
    }
}

/// Form body of the configuration page.
#[derive(Debug, Deserialize)]
pub struct ConfigForm {
    #[serde(default)]
    pub supabase_url: String,
    #[serde(default)]
    pub supabase_key: String,
    #[serde(default)]
    pub redirect_url: String,
}

impl From<ConfigForm> for AppConfig {
    fn from(form: ConfigForm) -> Self {
        AppConfig::new(form.supabase_url, form.supabase_key, form.redirect_url)
    }
}

pub fn resolve_config_path() -> PathBuf {
    if let Ok(path) = env::var("APP_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    PathBuf::from("data/config.json")
}

/// Reads the stored configuration. Missing, unreadable and incomplete files
/// all count as absent.
pub async fn load_config(path: &Path) -> Option<AppConfig> {
    let config: AppConfig = match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice(&bytes) {
            Ok(config) => config,
            Err(err) => {
                error!("failed to parse config file: {err}");
                return None;
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
        Err(err) => {
            error!("failed to read config file: {err}");
            return None;
        }
    };

    config.validate().ok().map(|()| config)
}

pub async fn save_config(path: &Path, config: &AppConfig) -> Result<(), AppError> {
    config.validate()?;
    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await?;
    }
    let payload = serde_json::to_vec_pretty(config).map_err(AppError::internal)?;
    fs::write(path, payload).await?;
    Ok(())
}
