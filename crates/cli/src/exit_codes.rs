//! CLI Exit Code Registry
//!
//! Single source of truth for `matchday` exit codes. Scripts rely on them.
//!
//! # Exit Code Ranges
//!
//! | Range   | Domain     | Description                              |
//! |---------|------------|------------------------------------------|
//! | 0       | Universal  | Success                                  |
//! | 2       | Universal  | CLI usage error (bad args, missing file) |
//! | 60-69   | merge      | Fixture/prediction merge codes           |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant in the appropriate range
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into the relevant command's error handling

// =============================================================================
// Universal (0, 2)
// =============================================================================

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// Usage error - bad arguments, unreadable input file.
pub const EXIT_USAGE: u8 = 2;

// =============================================================================
// Merge (60-69)
// =============================================================================

/// Engine config failed to parse or validate.
pub const EXIT_MERGE_INVALID_CONFIG: u8 = 60;

/// Input JSON could not be read, or the merge itself failed.
pub const EXIT_MERGE_RUNTIME: u8 = 61;

/// Merge succeeded but validation found invalid fixtures or predictions,
/// or a prediction shared by several fixtures. Only with `--strict`.
pub const EXIT_MERGE_DATA_QUALITY: u8 = 62;
