mod app_config;
mod parsing_session;

pub use app_config::{APP_NAME, AppConfigExt, ConfigError};
pub use nabber_types::AppConfig;
pub use parsing_session::{ParsingSession, resolve_log_path};
