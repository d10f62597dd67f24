//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the disk browser:
//! - Logging and tracing infrastructure
//! - Configuration management (builder + environment loading)
//!
//! ## Overview
//!
//! This crate contains the runtime utilities the other workspace crates and
//! the binary depend on. It establishes the logging conventions and the
//! validated settings every request handler is built from.

pub mod config;
pub mod error;
pub mod logging;

pub use error::{Error, Result};
