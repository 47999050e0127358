//! # Themeshift CLI Library
//!
//! Command-line front end of the theme engine: argument parsing, layered
//! configuration, logging, and the conversion run itself.
//!
//! ## Modules
//!
//! - [`args`] - Command-line arguments
//! - [`config`] - Configuration loading, validation and standard paths
//! - [`convert`] - Load, convert and save one theme
//! - [`error`] - Error types and exit codes
//! - [`logger`] - Logging configuration
//!
//! This library interface enables integration testing by providing access to internal modules.

pub mod args;
pub mod config;
pub mod convert;
pub mod error;
pub mod logger;

pub use error::AppError;
