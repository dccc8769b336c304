//! CLI Exit Code Registry
//!
//! This is the single source of truth for all CLI exit codes.
//! Exit codes are part of the shell contract; scripts rely on them.
//!
//! | Code | Meaning                                            |
//! |------|----------------------------------------------------|
//! | 0    | Success                                            |
//! | 1    | General error (unspecified)                        |
//! | 2    | Usage error (bad args, unsupported format, unconfirmed op) |
//! | 3    | I/O error (read/write failed)                      |
//! | 4    | Parse error (malformed input file or ops script)   |
//! | 5    | Not found (no match, unknown column)               |
//! | 6    | Rejected edit (bad coordinate, name clash, invalid fill) |

use gridedit_engine::EditError;
use gridedit_io::FileError;

/// Success - command completed without errors.
pub const EXIT_SUCCESS: u8 = 0;

/// General error - unspecified failure.
/// Avoid using this; prefer a specific error code.
pub const EXIT_ERROR: u8 = 1;

/// Usage error - bad arguments, missing required options.
pub const EXIT_USAGE: u8 = 2;

/// File could not be read or written.
pub const EXIT_IO: u8 = 3;

/// Input file or ops script is malformed.
pub const EXIT_PARSE: u8 = 4;

/// Search exhausted or named column missing.
pub const EXIT_NOT_FOUND: u8 = 5;

/// The engine refused an edit; the table is unchanged.
pub const EXIT_VALIDATION: u8 = 6;

pub fn edit_exit_code(err: &EditError) -> u8 {
    match err {
        EditError::NotFound(_) | EditError::ColumnNotFound(_) => EXIT_NOT_FOUND,
        EditError::Coordinate(_) | EditError::DuplicateName(_) | EditError::Validation(_) => EXIT_VALIDATION,
    }
}

pub fn file_exit_code(err: &FileError) -> u8 {
    match err {
        FileError::Io(_) | FileError::XlsxWrite(_) => EXIT_IO,
        FileError::Csv(_) | FileError::Json(_) | FileError::Spreadsheet(_) | FileError::Malformed(_) => EXIT_PARSE,
        FileError::UnsupportedFormat(_) => EXIT_USAGE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridedit_engine::CoordinateFault;

    #[test]
    fn test_edit_codes() {
        assert_eq!(edit_exit_code(&EditError::NotFound("x".into())), EXIT_NOT_FOUND);
        assert_eq!(edit_exit_code(&CoordinateFault::StaleSelection.into()), EXIT_VALIDATION);
    }

    #[test]
    fn test_file_codes() {
        assert_eq!(file_exit_code(&FileError::UnsupportedFormat("doc".into())), EXIT_USAGE);
        assert_eq!(file_exit_code(&FileError::Malformed("bad".into())), EXIT_PARSE);
    }
}
