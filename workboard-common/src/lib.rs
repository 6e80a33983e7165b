//! # Workboard Common
//!
//! Shared infrastructure for the Workboard crates:
//!
//! - [`ErrorSeverity`] and the [`Severity`] trait, implemented by every error
//!   enum in the workspace so hosts can pick a notification level.
//! - [`Pretty`], a YAML-rendering wrapper for structured values in log lines.
//! - [`init_tracing`], the subscriber setup used by hosts and test harnesses.

mod error;
mod logging;

pub use error::{ErrorSeverity, Severity};
pub use logging::{init_tracing, Pretty};
