// Configuration module
// Public interface for configuration loading

mod backend;
mod loader;
mod settings;

pub use backend::{BackendConfig, DEFAULT_BACKEND_URL};
pub use loader::{config_path, load_config, load_config_from};
pub use settings::{Config, EscalationConfig, ServerConfig, DEFAULT_GREETING};
