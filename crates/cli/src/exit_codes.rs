//! CLI Exit Code Registry
//!
//! Single source of truth for `rrecon` exit codes. Scripts rely on them.
//!
//! | Code | Meaning                                                   |
//! |------|-----------------------------------------------------------|
//! | 0    | Success                                                   |
//! | 1    | Mismatches found (`diff --fail-on-mismatch`)              |
//! | 2    | Usage error (bad arguments)                               |
//! | 60   | Invalid config (bridge, thresholds, owners, settings)     |
//! | 61   | No source file for a side and period                      |
//! | 62   | Runtime error (unreadable source, parse failure, output)  |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant here
//! 2. Update the table above
//! 3. Map the triggering error in the command that raises it

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// At least one diff line is not `match` and `--fail-on-mismatch` was given.
/// Like `diff(1)`, exit 1 means "inputs differ."
pub const EXIT_MISMATCH: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// Bridge, thresholds, owners or settings failed to load or validate.
pub const EXIT_INVALID_CONFIG: u8 = 60;

/// Neither `{period}.csv` nor `{period}.xlsx` exists for a side.
pub const EXIT_NO_SOURCE: u8 = 61;

/// Source unreadable or unparsable, or output could not be written.
pub const EXIT_RUNTIME: u8 = 62;
