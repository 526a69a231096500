//! Kit configuration
//!
//! ```rust,ignore
//! use stubgraph_ir::config::KitConfig;
//!
//! let config = KitConfig::default().with_name("arrayRegionEquals");
//! let config = KitConfig::from_yaml_file("stub-kit.yaml")?;
//! ```

pub mod error;
pub mod kit_config;

pub use error::{ConfigError, ConfigResult};
pub use kit_config::KitConfig;
