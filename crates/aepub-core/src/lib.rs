mod app_config;
mod categories;
mod config;
mod credentials;
mod error;
mod products;

pub use app_config::AppConfig;
pub use categories::{load_categories, CategoriesFile};
pub use config::{load_app_config, load_app_config_from_env, DEFAULT_GATEWAY_URL};
pub use credentials::Credentials;
pub use error::ConfigError;
pub use products::{Category, Product};
