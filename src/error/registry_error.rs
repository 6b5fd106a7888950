use crate::error::ErrorCode;
use crate::paths::PathType;
use crate::schema::ConstraintKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Failure to load a declaration document into a valid `Module`
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DocumentError {
    #[error("{format} parsing error{context}: input string is empty")]
    Empty {
        format: &'static str,
        context: String,
    },

    #[error("{format} parsing error{context} - Syntax error at line {line}, column {column}: {message}")]
    Syntax {
        format: &'static str,
        context: String,
        line: usize,
        column: usize,
        message: String,
    },

    #[error("{format} parsing error{context} - Invalid data structure: {message}")]
    Data {
        format: &'static str,
        context: String,
        message: String,
    },

    #[error("Failed to read file {path}: {message}")]
    Io { path: String, message: String },

    #[error("Unsupported document format (file: {0}). Enable the 'yaml-support' feature for YAML documents.")]
    UnsupportedFormat(String),

    #[error(transparent)]
    Invalid(#[from] ValidationErrors),
}

impl DocumentError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DocumentError::Empty { .. } | DocumentError::Syntax { .. } | DocumentError::Data { .. } => {
                ErrorCode::ParseError
            }
            DocumentError::Io { .. } => ErrorCode::IoError,
            DocumentError::UnsupportedFormat(_) => ErrorCode::UnsupportedFormat,
            DocumentError::Invalid(_) => ErrorCode::ValidationFailed,
        }
    }
}

/// Every structural violation found in one declaration
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error("invalid module '{module}': {}", .errors.join("; "))]
pub struct ValidationErrors {
    pub module: String,
    pub errors: Vec<String>,
}

impl ValidationErrors {
    pub fn new(module: impl Into<String>) -> Self {
        Self {
            module: module.into(),
            errors: Vec::new(),
        }
    }

    pub fn push(&mut self, error: impl Into<String>) {
        self.errors.push(error.into());
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// `Ok(())` when nothing was collected
    pub fn into_result(self) -> Result<(), ValidationErrors> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

/// A runtime value that definitively violates one constraint
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{field}: {message}")]
pub struct ConstraintError {
    pub field: String,
    pub kind: ConstraintKind,
    pub message: String,
}

/// Module/action pair contending for a claim key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimOwner {
    pub module: String,
    pub action: String,
}

impl fmt::Display for ClaimOwner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.module, self.action)
    }
}

/// One colliding claim key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathConflict {
    pub path_type: PathType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    pub path: String,
    pub key: String,
    pub existing: ClaimOwner,
    pub incoming: ClaimOwner,
}

impl fmt::Display for PathConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(
                f,
                "{} {} {} claimed by {} and {}",
                self.path_type, method, self.path, self.existing, self.incoming
            ),
            None => write!(
                f,
                "{} {} claimed by {} and {}",
                self.path_type, self.path, self.existing, self.incoming
            ),
        }
    }
}

/// Registration rejected because derived claims collide
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[error(
    "module '{module}' has {} path conflict(s): {}",
    .conflicts.len(),
    .conflicts.iter().map(|c| c.to_string()).collect::<Vec<_>>().join("; ")
)]
pub struct PathConflictError {
    pub module: String,
    pub conflicts: Vec<PathConflict>,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error("module '{0}' is already registered")]
    DuplicateModule(String),

    #[error("table '{table}' requested by module '{module}' is already owned by module '{owner}'")]
    TableConflict {
        module: String,
        table: String,
        owner: String,
    },

    #[error(transparent)]
    PathConflict(#[from] PathConflictError),

    #[error("module '{0}' is not registered")]
    NotRegistered(String),

    #[error("capability declaration '{0}' cannot be registered as a module")]
    CapabilityDeclaration(String),

    #[error("registry limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("invalid registry configuration: {0}")]
    Configuration(String),
}

impl RegistryError {
    pub fn code(&self) -> ErrorCode {
        match self {
            RegistryError::Validation(_) => ErrorCode::ValidationFailed,
            RegistryError::DuplicateModule(_) => ErrorCode::DuplicateModule,
            RegistryError::TableConflict { .. } => ErrorCode::TableConflict,
            RegistryError::PathConflict(_) => ErrorCode::PathConflict,
            RegistryError::NotRegistered(_) => ErrorCode::NotRegistered,
            RegistryError::CapabilityDeclaration(_) => ErrorCode::CapabilityDeclaration,
            RegistryError::LimitExceeded(_) => ErrorCode::LimitExceeded,
            RegistryError::Configuration(_) => ErrorCode::ConfigurationError,
        }
    }

    /// Colliding claims, when this is a path conflict
    pub fn conflicts(&self) -> Option<&[PathConflict]> {
        match self {
            RegistryError::PathConflict(err) => Some(&err.conflicts),
            _ => None,
        }
    }
}
