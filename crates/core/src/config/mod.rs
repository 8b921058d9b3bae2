//! Configuration loading and schema definitions
//!
//! Settings shared by the picker CLI and embedders of the widgets.

mod loader;
mod schema;

pub use loader::{Config, CONFIG_CANDIDATES};
pub use schema::*;
