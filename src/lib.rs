// Public modules
pub mod types;
pub mod error;
pub mod config;
pub mod parsing;
pub mod collector;
pub mod analysis;
pub mod render;

// Re-export commonly used items
pub use types::*;
pub use error::{CollectionError, Error, ParseError};
pub use config::{load_config, load_config_with_env, Args, EnvironmentProvider, SystemEnvironment, MockEnvironment};
pub use parsing::{parse_quantity, parse_percent, parse_top_output};
pub use collector::{KubectlTop, MetricsCollector, MetricsSource};
pub use analysis::analyze;
pub use render::{render, render_csv, render_json, render_table, status_label, RenderOptions};
