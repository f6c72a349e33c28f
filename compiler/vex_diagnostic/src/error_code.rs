//! Error codes (diagnostic categories).
//!
//! Format: E#### where the first digit names the phase that raised it.

use std::fmt;

/// Compiler phase a diagnostic belongs to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Phase {
    Lexer,
    Parser,
    Types,
    Runtime,
    Internal,
}

/// Diagnostic category.
///
/// - E0xxx: lexer
/// - E1xxx: parser
/// - E2xxx: type model / HIR
/// - E6xxx: runtime value model
/// - E9xxx: internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    /// Invalid character in source
    E0001,
    /// Unterminated string literal
    E0002,
    /// Unexpected token
    E1001,
    /// Unclosed delimiter
    E1002,
    /// Type mismatch
    E2001,
    /// Unknown type name
    E2002,
    /// Wrong number of type arguments
    E2003,
    /// Invalid runtime memory layout
    E6001,
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    /// Code as written in output, e.g. `"E2001"`.
    pub const fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E6001 => "E6001",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub const fn phase(self) -> Phase {
        match self {
            ErrorCode::E0001 | ErrorCode::E0002 => Phase::Lexer,
            ErrorCode::E1001 | ErrorCode::E1002 => Phase::Parser,
            ErrorCode::E2001 | ErrorCode::E2002 | ErrorCode::E2003 => Phase::Types,
            ErrorCode::E6001 => Phase::Runtime,
            ErrorCode::E9001 => Phase::Internal,
        }
    }

    /// Syntax errors are deduplicated per line by the queue.
    pub const fn is_syntax_error(self) -> bool {
        matches!(self.phase(), Phase::Lexer | Phase::Parser)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
