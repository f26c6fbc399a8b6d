use crate::backend::Backend;
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::recording::RecordingFlow;
use crate::session::SessionSlot;
use crate::supabase::SupabaseBackend;
use crate::view::Notice;
use std::{path::PathBuf, sync::Arc};
use tokio::sync::Mutex;

/// Builds the backend client for a saved configuration.
pub type Connector = Arc<dyn Fn(&AppConfig) -> Arc<dyn Backend> + Send + Sync>;

#[derive(Clone)]
pub struct Configured {
    pub config: AppConfig,
    pub backend: Arc<dyn Backend>,
}

#[derive(Clone)]
pub struct AppState {
    pub config_path: PathBuf,
    pub configured: Arc<Mutex<Option<Configured>>>,
    pub connector: Connector,
    pub session: Arc<SessionSlot>,
    pub recorder: Arc<RecordingFlow>,
    pub notice: Arc<Mutex<Option<Notice>>>,
}

impl AppState {
    pub fn new(config_path: PathBuf, config: Option<AppConfig>) -> Self {
        let connector: Connector =
            Arc::new(|config: &AppConfig| Arc::new(SupabaseBackend::new(config)) as Arc<dyn Backend>);
        Self::with_connector(config_path, config, connector)
    }

    pub fn with_connector(
        config_path: PathBuf,
        config: Option<AppConfig>,
        connector: Connector,
    ) -> Self {
        let configured = config.map(|config| Configured {
            backend: connector(&config),
            config,
        });
        Self {
            config_path,
            configured: Arc::new(Mutex::new(configured)),
            connector,
            session: Arc::new(Mutex::new(None)),
            recorder: Arc::new(RecordingFlow::new()),
            notice: Arc::new(Mutex::new(None)),
        }
    }

    /// The configured backend, or `ConfigMissing` before setup.
    pub async fn configured(&self) -> Result<Configured, AppError> {
        self.configured
            .lock()
            .await
            .clone()
            .ok_or_else(AppError::config_missing)
    }

    pub async fn backend(&self) -> Result<Arc<dyn Backend>, AppError> {
        Ok(self.configured().await?.backend)
    }

    pub async fn set_notice(&self, notice: Notice) {
        *self.notice.lock().await = Some(notice);
    }

    pub async fn take_notice(&self) -> Option<Notice> {
        self.notice.lock().await.take()
    }
}
