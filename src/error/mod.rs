pub mod error_code;
pub mod registry_error;

pub use error_code::ErrorCode;
pub use registry_error::{
    ClaimOwner, ConstraintError, DocumentError, PathConflict, PathConflictError, RegistryError,
    ValidationErrors,
};
