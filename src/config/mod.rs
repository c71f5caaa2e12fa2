//! Configuration for chrtool
//!
//! Provides types, discovery and loading for `chrtool.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
