//! Configuration loading and application.
pub(crate) mod apply;
mod loader;
pub mod types;


pub use apply::apply_config;
pub use loader::load_config;

#[cfg(test)]
pub(crate) use loader::{ConfigFormat, default_config_path, load_config_file};
