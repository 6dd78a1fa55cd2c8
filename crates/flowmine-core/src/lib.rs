#![forbid(unsafe_code)]
//! flowmine-core library.
//!
//! Shared input model and ambient plumbing for the flowmine mining engines.
//!
//! # Conventions
//!
//! - **Errors**: Library operations return [`error::MiningError`]; the CLI
//!   wraps them in `anyhow::Result`. Config loading uses `anyhow` directly.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod config;
pub mod error;
pub mod model;

pub use error::{ErrorCode, MiningError};
pub use model::{EventIndex, LogStatistics, Matrix, SuccessionMatrix};
