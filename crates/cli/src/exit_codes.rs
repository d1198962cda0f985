//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract — scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 2       | Universal        | CLI usage error (bad args, missing file) |
//! | 60-69   | pipeline         | Config, runtime and unmatched outcomes   |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, missing required options.
/// clap exits with this code on its own parse failures.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Pipeline (60-69)
// =============================================================================

/// Config file could not be parsed or failed validation.
pub const EXIT_INVALID_CONFIG: u8 = 60;

/// Runtime failure: reference or mapping table unreadable, output not writable.
pub const EXIT_RUNTIME: u8 = 61;

/// Run completed but left unmatched records (only with `--fail-on-unmatched`).
pub const EXIT_UNMATCHED: u8 = 62;
