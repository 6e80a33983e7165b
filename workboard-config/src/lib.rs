//! Board configuration for Workboard.
//!
//! Configuration is layered with [Figment](https://docs.rs/figment), later
//! sources overriding earlier ones:
//!
//! 1. Built-in defaults ([`BoardConfig::default`])
//! 2. An optional configuration file (`.toml`, `.yaml`/`.yml` or `.json`)
//! 3. Environment variables prefixed with `WORKBOARD_`
//!
//! ```rust,no_run
//! use workboard_config::ConfigProvider;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ConfigProvider::new()
//!     .with_file("workboard.toml")
//!     .load()?;
//! println!("unassigned column goes {:?}", config.unassigned_placement);
//! # Ok(())
//! # }
//! ```

mod error;
mod provider;
mod types;

pub use error::{ConfigError, ConfigResult};
pub use provider::{ConfigProvider, ENV_PREFIX};
pub use types::{BoardConfig, UnassignedPlacement};
