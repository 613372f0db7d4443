//! Filesystem utilities.
//!
//! Saves replace the configuration file through an atomic rename so a crash
//! mid-write cannot corrupt it.

pub mod atomic;

pub use atomic::atomic_write;
pub use atomic::atomic_write_file;
