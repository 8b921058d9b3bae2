//! CLI utilities for the survey widget tools
//!
//! Provides shared CLI functionality:
//! - Global flags shared by every binary
//! - Terminal output formatting and status messages

#![warn(missing_docs)]

pub mod args;
pub mod output;
