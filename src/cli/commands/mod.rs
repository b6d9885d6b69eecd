//! CLI command implementations

pub mod cache;
pub mod config;
pub mod new;

pub use cache::execute as cache;
pub use config::execute as config;
pub use new::execute as new;
