//! Error codes for catalogue diagnostics.
//!
//! Codes are organized by phase:
//! - `E0xx` - JSON syntax errors
//! - `E1xx` - Structure errors (wrong shapes or types)
//! - `E2xx` - Validation errors

use std::fmt;

/// Error codes for categorizing catalogue diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // =========================================================================
    // Syntax Errors (E0xx)
    // =========================================================================
    /// Invalid JSON syntax.
    E001,

    /// Unexpected end of input.
    ///
    /// The document ended before a value, array or object was closed.
    E002,

    // =========================================================================
    // Structure Errors (E1xx)
    // =========================================================================
    /// Invalid catalogue structure.
    ///
    /// A field has the wrong type, or the document is not an object.
    E100,

    /// Missing drawing.
    ///
    /// An export wrapper (`result`) was found without a `result.drawing` object.
    E101,

    // =========================================================================
    // Validation Errors (E2xx)
    // =========================================================================
    /// Duplicate segment identifier within one chain.
    E200,

    /// Non-positive segment height or width.
    E201,

    /// Negative segment length.
    E202,

    /// Unknown segment category.
    ///
    /// Reported as a warning; the segment is laid out as a plain block
    /// without stubs.
    E203,
}

impl ErrorCode {
    /// Returns the numeric code as a string (e.g., "E001").
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "E001",
            ErrorCode::E002 => "E002",
            ErrorCode::E100 => "E100",
            ErrorCode::E101 => "E101",
            ErrorCode::E200 => "E200",
            ErrorCode::E201 => "E201",
            ErrorCode::E202 => "E202",
            ErrorCode::E203 => "E203",
        }
    }

    /// Returns a short description of what this error code means.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::E001 => "invalid JSON syntax",
            ErrorCode::E002 => "unexpected end of input",
            ErrorCode::E100 => "invalid catalogue structure",
            ErrorCode::E101 => "missing drawing",
            ErrorCode::E200 => "duplicate segment identifier",
            ErrorCode::E201 => "non-positive segment size",
            ErrorCode::E202 => "negative segment length",
            ErrorCode::E203 => "unknown segment category",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
