use crate::paths::ExplicitEndpointMode;
use serde::{Deserialize, Serialize};

/// Configuration for ModuleRegistry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum number of registered modules (Default: 1000)
    pub max_modules: usize,

    /// Maximum number of path claims a single module may derive (Default: 500)
    pub max_claims_per_module: usize,

    /// How explicit HTTP endpoints combine with implicit ones (Default: additive)
    pub explicit_endpoints: ExplicitEndpointMode,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_modules: 1000,
            max_claims_per_module: 500,
            explicit_endpoints: ExplicitEndpointMode::Additive,
        }
    }
}

impl RegistryConfig {
    /// Create a new configuration with all default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Tight limits for small, audited deployments
    pub fn strict() -> Self {
        Self {
            max_modules: 100,
            max_claims_per_module: 64,
            explicit_endpoints: ExplicitEndpointMode::Additive,
        }
    }

    /// Generous limits, explicit endpoints replace implicit HTTP routes
    pub fn permissive() -> Self {
        Self {
            max_modules: 100_000,
            max_claims_per_module: 10_000,
            explicit_endpoints: ExplicitEndpointMode::ReplaceImplicit,
        }
    }

    pub fn with_explicit_endpoints(mut self, mode: ExplicitEndpointMode) -> Self {
        self.explicit_endpoints = mode;
        self
    }

    pub fn with_max_modules(mut self, max_modules: usize) -> Self {
        self.max_modules = max_modules;
        self
    }

    /// Validate the configuration values
    pub fn validate(&self) -> Result<(), String> {
        if self.max_modules == 0 {
            return Err("max_modules must be greater than 0".to_string());
        }

        if self.max_claims_per_module == 0 {
            return Err("max_claims_per_module must be greater than 0".to_string());
        }

        Ok(())
    }
}
