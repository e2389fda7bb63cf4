pub mod bootstrap;
pub mod cli;
pub mod config;

// re-export selected public API
pub use bootstrap::run;
pub use config::{Config, XlineConfig, load_config};
