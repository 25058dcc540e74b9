//! Standard exit codes for CLI operations
//!
//! These exit codes follow Unix conventions and sysexits.h where applicable.

/// Success - every reachable cluster was reported
pub const SUCCESS: i32 = 0;

/// General error - the fleet could not be scanned
pub const ERROR: i32 = 1;

/// IO error - the report could not be written
pub const IO_ERROR: i32 = 5;

/// Configuration error - missing or invalid settings (sysexits.h EX_CONFIG)
pub const CONFIG_ERROR: i32 = 78;
