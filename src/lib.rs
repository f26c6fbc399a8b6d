pub mod aggregate;
pub mod app;
pub mod backend;
pub mod colors;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod recording;
pub mod selection;
pub mod session;
pub mod state;
pub mod supabase;
pub mod ui;
pub mod view;

pub use app::router;
pub use backend::{Backend, BackendError};
pub use config::{load_config, resolve_config_path, AppConfig};
pub use state::AppState;
