//! # Lyra Common Library
//!
//! Shared code for the Lyra workspace:
//! - Configuration schema and file/environment resolution
//! - Common error type
//! - Logging initialisation

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
