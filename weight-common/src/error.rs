//! Process-level error taxonomy for the weight rationale front-ends.
//!
//! Library crates keep their own error enums. At the binary boundary every
//! failure is folded into [`Error`], which decides the exit status:
//!
//! | Variant          | Exit | Meaning                                   |
//! |------------------|------|-------------------------------------------|
//! | `InvalidRequest` | 2    | caller supplied a malformed report request |
//! | `Config`         | 78   | config file missing fields or invalid      |
//! | `Io`             | 74   | report output could not be written         |
//! | `Report`         | 1    | everything else                            |

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Report failed: {0}")]
    Report(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidRequest(_))
    }

    /// Exit status following the BSD `sysexits` convention where one applies.
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::InvalidRequest(_) => 2,
            Self::Io(_) => 74,
            Self::Config(_) => 78,
            Self::Report(_) => 1,
        }
    }
}
