//! CLI Exit Code Registry
//!
//! Single source of truth for `desalink` exit codes. Scripts that chain
//! resolution into the overlay build rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain           | Description                              |
//! |---------|------------------|------------------------------------------|
//! | 0       | Universal        | Success                                  |
//! | 1       | Universal        | General error (unspecified)              |
//! | 2       | Universal        | CLI usage error (bad args, unknown query format) |
//! | 60      | resolve          | Invalid config                           |
//! | 61      | resolve          | Input or output file unreadable, unloadable or unwritable |
//! | 62      | resolve          | Unmatched queries with `fail_on_unmatched` |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the command's error handling

use desalink_resolve::ResolveError;

// =============================================================================
// Universal (0-2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
#[allow(dead_code)]
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options, a query file
/// whose format cannot be inferred. Missing input files are
/// [`EXIT_RESOLVE_RUNTIME`].
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Resolve (60-69)
// =============================================================================

/// Config could not be parsed or failed validation
/// (threshold range, alias conflict, bad boilerplate word).
pub const EXIT_RESOLVE_INVALID_CONFIG: u8 = 60;

/// Input could not be read or loaded (missing file, missing column,
/// malformed query document, unwritable output).
pub const EXIT_RESOLVE_RUNTIME: u8 = 61;

/// Run completed but some queries stayed unmatched and the config sets
/// `fail_on_unmatched = true`.
pub const EXIT_RESOLVE_UNMATCHED: u8 = 62;

/// Map an engine error to its exit code.
pub fn resolve_exit_code(err: &ResolveError) -> u8 {
    match err {
        ResolveError::ConfigParse(_)
        | ResolveError::ConfigValidation(_)
        | ResolveError::AliasConflict { .. } => EXIT_RESOLVE_INVALID_CONFIG,
        ResolveError::MissingColumn { .. }
        | ResolveError::ValueParse { .. }
        | ResolveError::QueryParse(_)
        | ResolveError::Io(_) => EXIT_RESOLVE_RUNTIME,
    }
}
