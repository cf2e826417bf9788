//! Vitibrasil Common Library
//!
//! Shared types and utilities for the Vitibrasil workspace.
//!
//! - **Logging**: `tracing` subscriber setup driven by `LOG_*` environment variables
//! - **Types**: the statistical domains and the pagination vocabulary used by
//!   the record store
//!
//! # Example
//!
//! ```no_run
//! use vitibrasil_common::logging::{init_logging, LogConfig};
//! use vitibrasil_common::Domain;
//!
//! fn main() -> anyhow::Result<()> {
//!     init_logging(&LogConfig::from_env()?)?;
//!     for domain in Domain::ALL {
//!         tracing::info!(domain = %domain, "known domain");
//!     }
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod logging;
pub mod types;

pub use types::{Domain, Paginated, PaginationParams};
