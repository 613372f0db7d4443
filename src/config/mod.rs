//! Configuration facade for the Insteon bridge.
//!
//! [`Config`] owns the loaded configuration document and is the single entry
//! point for loading it (with `!include` resolution), saving it back (with a
//! diff-checked backup), looking up device types and handing the
//! configuration to the subsystems that consume it.

mod model;
mod operations;

#[cfg(test)]
mod tests;

// Re-export public API
pub use model::{Config, ConfigConsumer};
