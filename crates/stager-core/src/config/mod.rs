//! Staging configuration.
//!
//! Three optional layers, later ones overriding earlier ones field by field:
//! - Global: `<config dir>/stager/stager.toml`
//! - Project: `<project root>/stager.toml`
//! - Explicit: a file named on the command line

pub mod parser;
pub mod paths;
pub mod schema;
pub mod store;

pub use parser::{parse_stage_toml, parse_stage_toml_str};
pub use paths::{CONFIG_FILE_NAME, global_config_path, project_config_path};
pub use schema::StageConfig;
pub use store::ConfigStore;
