//! CLI Exit Code Registry
//!
//! This is the single source of truth for all `lmatch` exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                              |
//! |------|------------------------------------------------------|
//! | 0    | Success                                              |
//! | 1    | Labels left unmatched (only with `--strict`)         |
//! | 2    | Usage error (bad args, invalid config values)        |
//! | 3    | I/O error (cannot read input, cannot write output)   |
//! | 4    | Parse error (label file or config file malformed)    |
//! | 6    | Duplicate labels in an input collection              |
//! | 7    | Normalization made labels ambiguous                  |
//! | 8    | Unsupported matching mode                            |
//! | 9    | Interactive review failed (input closed, I/O)        |
//!
//! # Adding New Exit Codes
//!
//! 1. Add the constant
//! 2. Document what triggers it
//! 3. Update the table above
//! 4. Wire it into [`recon_exit_code`] or the command's error handling

use labelmatch_recon::ReconError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// `--strict` was given and at least one source label stayed unmatched.
/// Like `diff(1)`, exit 1 means "the inputs differ".
pub const EXIT_UNMATCHED: u8 = 1;

/// Usage error - bad arguments, out-of-range thresholds.
pub const EXIT_USAGE: u8 = 2;

/// Cannot read an input file or write an output file.
pub const EXIT_IO: u8 = 3;

/// Label file or config file could not be parsed.
pub const EXIT_PARSE: u8 = 4;

/// An input collection lists the same label twice.
pub const EXIT_DUPLICATE: u8 = 6;

/// Normalization collapsed distinct labels onto one key.
pub const EXIT_COLLISION: u8 = 7;

/// The requested matching mode is not implemented.
pub const EXIT_UNSUPPORTED: u8 = 8;

/// The interactive reviewer could not answer.
pub const EXIT_CHANNEL: u8 = 9;

/// Map an engine error to its exit code.
pub fn recon_exit_code(err: &ReconError) -> u8 {
    match err {
        ReconError::InputUniqueness { .. } => EXIT_DUPLICATE,
        ReconError::Collision { .. } => EXIT_COLLISION,
        ReconError::UnsupportedMode(_) => EXIT_UNSUPPORTED,
        ReconError::EmptyNormalization | ReconError::ConfigValidation(_) => EXIT_USAGE,
        ReconError::ConfigParse(_) => EXIT_PARSE,
        ReconError::Channel(_) => EXIT_CHANNEL,
    }
}
