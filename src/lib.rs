//! # Rust Module Registry
//!
//! Declarative module definitions compiled into conflict-checked path claims.
//!
//! An operator describes an entity once (fields, constraints, custom actions
//! and the transport channels that expose it). This crate parses and
//! validates that declaration, derives every address it would occupy across
//! HTTP, CLI, WebSocket, Webhook and gRPC, and admits it into a shared
//! registry that refuses any declaration colliding with one already there.
//!
//! ## Features
//!
//! - **Declarations**: JSON/YAML documents with positioned parse errors
//! - **Aggregated Validation**: every structural violation reported at once
//! - **Constraint Engine**: permissive runtime checks for field values
//! - **Path Derivation**: implicit CRUD, custom actions, explicit endpoints
//! - **Conflict-Checked Registry**: atomic admission, pattern-aware lookup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rust_module_registry::{ModuleParser, ModuleRegistry, PathType};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let registry = ModuleRegistry::new();
//!
//!     let module = ModuleParser::load_and_validate("modules/user.yaml").await?;
//!     registry.register(module)?;
//!
//!     if let Some(found) = registry.lookup_path(PathType::Http, "DELETE", "/users/42") {
//!         println!("{}:{} (id = {:?})", found.module, found.action, found.param("id"));
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod paths;
pub mod registry;
pub mod schema;
pub mod utils;

// Schema exports (declaration model, parsing, validation)
pub use schema::{
    validate_constraint, validate_field, Action, ActionInput, Channels, CliChannel, Constraint,
    ConstraintKind, DocumentFormat, Endpoint, Field, FieldType, GrpcChannel, HttpChannel, Module,
    ModuleMeta, ModuleParser, ModuleValidator, TtyChannel, WebSocketChannel, WebhookChannel,
    IMPLICIT_ACTIONS,
};

// Path exports (claims and derivation)
pub use paths::{extract_paths, ExplicitEndpointMode, PathClaim, PathDeriver, PathMatch, PathType};

// Registry exports
pub use registry::{ModuleRegistry, RegisteredModule};

// Configuration exports
pub use config::RegistryConfig;

// Error exports
pub use error::{
    ClaimOwner, ConstraintError, DocumentError, ErrorCode, PathConflict, PathConflictError,
    RegistryError, ValidationErrors,
};

// Result type alias
pub type Result<T> = std::result::Result<T, RegistryError>;

// Utility exports
pub use utils::{JsonUtils, NamingUtils, PathUtils};

// Re-export common dependencies for convenience
pub use serde::{Deserialize, Serialize};
pub use serde_json::{json, Value as JsonValue};

/// Prelude module for convenient importing
pub mod prelude {
    pub use crate::{
        extract_paths, json, Action, Channels, CliChannel, Constraint, ConstraintKind,
        DocumentError, Field, FieldType, HttpChannel, JsonValue, Module, ModuleParser,
        ModuleRegistry, ModuleValidator, PathClaim, PathMatch, PathType, RegistryConfig,
        RegistryError, Result,
    };
}

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_info() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "rust-module-registry");
    }
}
