//! Exit code constants for the insteon-config CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, unknown device type)
//! - 2: Invalid configuration (YAML or `!include` problems)
//! - 3: I/O failure (missing files, failed backup or write)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or an unknown device type.
pub const USER_ERROR: i32 = 1;

/// Invalid configuration: parse errors, malformed or cyclic includes.
pub const INVALID_CONFIG: i32 = 2;

/// I/O failure: unreadable includes, missing save target, failed write.
pub const IO_FAILURE: i32 = 3;
