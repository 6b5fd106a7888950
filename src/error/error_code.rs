use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable error codes surfaced to operator tooling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    // Document loading
    ParseError = -32700,
    IoError = -32701,
    UnsupportedFormat = -32702,

    // Declaration gate
    ValidationFailed = -32005,
    CapabilityDeclaration = -32006,

    // Admission
    DuplicateModule = -32100,
    TableConflict = -32101,
    PathConflict = -32102,
    NotRegistered = -32104,
    LimitExceeded = -32110,
    ConfigurationError = -32008,
}

impl ErrorCode {
    /// Returns the string representation of the error code
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "PARSE_ERROR",
            ErrorCode::IoError => "IO_ERROR",
            ErrorCode::UnsupportedFormat => "UNSUPPORTED_FORMAT",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::CapabilityDeclaration => "CAPABILITY_DECLARATION",
            ErrorCode::DuplicateModule => "DUPLICATE_MODULE",
            ErrorCode::TableConflict => "TABLE_CONFLICT",
            ErrorCode::PathConflict => "PATH_CONFLICT",
            ErrorCode::NotRegistered => "NOT_REGISTERED",
            ErrorCode::LimitExceeded => "LIMIT_EXCEEDED",
            ErrorCode::ConfigurationError => "CONFIGURATION_ERROR",
        }
    }

    /// Returns the standard human-readable message for the error code
    pub fn message(&self) -> &'static str {
        match self {
            ErrorCode::ParseError => "Parse error",
            ErrorCode::IoError => "I/O error",
            ErrorCode::UnsupportedFormat => "Unsupported document format",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::CapabilityDeclaration => "Capability declarations cannot be registered",
            ErrorCode::DuplicateModule => "Module already registered",
            ErrorCode::TableConflict => "Table already claimed",
            ErrorCode::PathConflict => "Path conflict",
            ErrorCode::NotRegistered => "Module not registered",
            ErrorCode::LimitExceeded => "Registry limit exceeded",
            ErrorCode::ConfigurationError => "Configuration error",
        }
    }

    /// Returns the numeric error code value
    pub fn code(&self) -> i32 {
        *self as i32
    }

    /// Maps a numeric value back to a known code
    pub fn from_code(code: i32) -> Option<Self> {
        match code {
            -32700 => Some(ErrorCode::ParseError),
            -32701 => Some(ErrorCode::IoError),
            -32702 => Some(ErrorCode::UnsupportedFormat),
            -32005 => Some(ErrorCode::ValidationFailed),
            -32006 => Some(ErrorCode::CapabilityDeclaration),
            -32100 => Some(ErrorCode::DuplicateModule),
            -32101 => Some(ErrorCode::TableConflict),
            -32102 => Some(ErrorCode::PathConflict),
            -32104 => Some(ErrorCode::NotRegistered),
            -32110 => Some(ErrorCode::LimitExceeded),
            -32008 => Some(ErrorCode::ConfigurationError),
            _ => None,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::ParseError.code(), -32700);
        assert_eq!(ErrorCode::PathConflict.code(), -32102);
        assert_eq!(ErrorCode::ValidationFailed.code(), -32005);
    }

    #[test]
    fn test_error_code_round_trip_through_numeric_value() {
        for code in [
            ErrorCode::ParseError,
            ErrorCode::DuplicateModule,
            ErrorCode::TableConflict,
            ErrorCode::NotRegistered,
        ] {
            assert_eq!(ErrorCode::from_code(code.code()), Some(code));
        }
        assert_eq!(ErrorCode::from_code(1), None);
    }

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::PathConflict.to_string(), "PATH_CONFLICT");
        assert_eq!(ErrorCode::DuplicateModule.message(), "Module already registered");
    }
}
