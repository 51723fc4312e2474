mod config;
mod load_config;

pub use config::{Config, CoreConfig, DocumentFormat, ProfileConfig, StorageType};
pub use load_config::{load, load_if_exists, parse};
