use crate::config::RegistryConfig;
use crate::error::{ClaimOwner, PathConflict, PathConflictError, RegistryError};
use crate::paths::{PathClaim, PathDeriver, PathMatch, PathType};
use crate::schema::{Module, ModuleValidator};
use crate::utils::PathUtils;
use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use uuid::Uuid;

/// A module admitted into the registry together with everything derived from it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegisteredModule {
    pub module: Module,
    pub plural: String,
    pub table: String,
    pub claims: Vec<PathClaim>,
    pub registered_at: DateTime<Utc>,
    /// Fresh on every admission, so re-registration under the same name is observable
    pub registration_id: Uuid,
}

impl RegisteredModule {
    pub fn name(&self) -> &str {
        &self.module.name
    }

    pub fn claims_of(&self, path_type: PathType) -> impl Iterator<Item = &PathClaim> {
        self.claims.iter().filter(move |c| c.path_type == path_type)
    }
}

/// Module table, table index and path index; always mutated together
#[derive(Debug, Default)]
struct RegistryState {
    modules: BTreeMap<String, Arc<RegisteredModule>>,
    tables: BTreeMap<String, String>,
    paths: BTreeMap<PathType, BTreeMap<String, PathClaim>>,
}

impl RegistryState {
    fn claim_count(&self) -> usize {
        self.paths.values().map(BTreeMap::len).sum()
    }
}

/// Conflict-checked registry of module declarations and the paths they claim.
///
/// All three indices sit behind one `RwLock`. Registration holds the write
/// lock across detection and commit, so readers see a module with all of its
/// claims or not at all.
#[derive(Debug)]
pub struct ModuleRegistry {
    state: RwLock<RegistryState>,
    config: RegistryConfig,
    deriver: PathDeriver,
}

impl Default for ModuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModuleRegistry {
    /// Create a registry with the default configuration
    pub fn new() -> Self {
        let config = RegistryConfig::default();
        Self {
            state: RwLock::new(RegistryState::default()),
            deriver: PathDeriver::new(config.explicit_endpoints),
            config,
        }
    }

    /// Create a registry with a validated configuration
    pub fn with_config(config: RegistryConfig) -> Result<Self, RegistryError> {
        config.validate().map_err(RegistryError::Configuration)?;
        debug!("Creating module registry with config: {:?}", config);
        Ok(Self {
            state: RwLock::new(RegistryState::default()),
            deriver: PathDeriver::new(config.explicit_endpoints),
            config,
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // State is only written after every check passes, so a poisoned lock
    // still guards a consistent value.
    fn read(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Validate, derive and admit a module, or reject it leaving no trace
    pub fn register(&self, module: Module) -> Result<Arc<RegisteredModule>, RegistryError> {
        if module.is_capability() {
            warn!(
                "Rejected capability declaration '{}': not registrable as a module",
                module.display_name()
            );
            return Err(RegistryError::CapabilityDeclaration(
                module.display_name().to_string(),
            ));
        }

        if self.read().modules.contains_key(&module.name) {
            warn!("Rejected module '{}': already registered", module.name);
            return Err(RegistryError::DuplicateModule(module.name));
        }

        ModuleValidator::validate(&module)?;

        let plural = module.plural();
        let table = module.table_name();
        let (claims, mut conflicts) = Self::dedupe_claims(self.deriver.extract_paths(&module, &plural));

        let mut state = self.write();

        // Re-checked: another writer may have admitted the name since the read above
        if state.modules.contains_key(&module.name) {
            warn!("Rejected module '{}': already registered", module.name);
            return Err(RegistryError::DuplicateModule(module.name));
        }

        if state.modules.len() >= self.config.max_modules {
            warn!("Rejected module '{}': registry is full", module.name);
            return Err(RegistryError::LimitExceeded(format!(
                "maximum modules ({}) exceeded",
                self.config.max_modules
            )));
        }

        if claims.len() > self.config.max_claims_per_module {
            warn!(
                "Rejected module '{}': {} path claims exceed the limit",
                module.name,
                claims.len()
            );
            return Err(RegistryError::LimitExceeded(format!(
                "module '{}' derives {} path claims, maximum is {}",
                module.name,
                claims.len(),
                self.config.max_claims_per_module
            )));
        }

        if let Some(owner) = state.tables.get(&table) {
            warn!(
                "Rejected module '{}': table '{}' owned by '{}'",
                module.name, table, owner
            );
            return Err(RegistryError::TableConflict {
                module: module.name,
                table,
                owner: owner.clone(),
            });
        }

        for claim in &claims {
            let key = claim.key();
            if let Some(existing) = state.paths.get(&claim.path_type).and_then(|index| index.get(&key)) {
                conflicts.push(PathConflict {
                    path_type: claim.path_type,
                    method: claim.method.clone(),
                    path: claim.path.clone(),
                    key,
                    existing: existing.owner(),
                    incoming: claim.owner(),
                });
            }
        }

        if !conflicts.is_empty() {
            warn!(
                "Rejected module '{}': {} path conflict(s)",
                module.name,
                conflicts.len()
            );
            return Err(PathConflictError {
                module: module.name,
                conflicts,
            }
            .into());
        }

        for claim in &claims {
            state
                .paths
                .entry(claim.path_type)
                .or_default()
                .insert(claim.key(), claim.clone());
        }
        state.tables.insert(table.clone(), module.name.clone());

        let registered = Arc::new(RegisteredModule {
            plural,
            table,
            claims,
            registered_at: Utc::now(),
            registration_id: Uuid::new_v4(),
            module,
        });
        state
            .modules
            .insert(registered.module.name.clone(), Arc::clone(&registered));

        info!(
            "✓ Registered module '{}' (table '{}', {} path claim(s), id {})",
            registered.module.name,
            registered.table,
            registered.claims.len(),
            registered.registration_id
        );
        Ok(registered)
    }

    /// Drop claims repeated with the same action; report those repeated with a different one
    fn dedupe_claims(claims: Vec<PathClaim>) -> (Vec<PathClaim>, Vec<PathConflict>) {
        let mut seen: HashMap<String, ClaimOwner> = HashMap::new();
        let mut unique = Vec::with_capacity(claims.len());
        let mut conflicts = Vec::new();

        for claim in claims {
            let key = claim.key();
            match seen.get(&key) {
                Some(first) if first.action == claim.action => {
                    debug!("Dropping repeated claim {} for {}", key, first);
                }
                Some(first) => conflicts.push(PathConflict {
                    path_type: claim.path_type,
                    method: claim.method.clone(),
                    path: claim.path.clone(),
                    key,
                    existing: first.clone(),
                    incoming: claim.owner(),
                }),
                None => {
                    seen.insert(key, claim.owner());
                    unique.push(claim);
                }
            }
        }

        (unique, conflicts)
    }

    /// Remove a module and every index entry it owns
    pub fn unregister(&self, name: &str) -> Result<Arc<RegisteredModule>, RegistryError> {
        let mut state = self.write();

        let registered = match state.modules.remove(name) {
            Some(registered) => registered,
            None => {
                warn!("Cannot unregister '{}': not registered", name);
                return Err(RegistryError::NotRegistered(name.to_string()));
            }
        };

        state.tables.remove(&registered.table);
        for claim in &registered.claims {
            if let Some(index) = state.paths.get_mut(&claim.path_type) {
                index.remove(&claim.key());
            }
        }
        state.paths.retain(|_, index| !index.is_empty());

        info!(
            "✓ Unregistered module '{}' ({} path claim(s) released)",
            name,
            registered.claims.len()
        );
        Ok(registered)
    }

    pub fn get(&self, name: &str) -> Option<Arc<RegisteredModule>> {
        self.read().modules.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read().modules.contains_key(name)
    }

    /// Registered module names, sorted
    pub fn list(&self) -> Vec<String> {
        self.read().modules.keys().cloned().collect()
    }

    /// Registered modules, sorted by name
    pub fn all(&self) -> Vec<Arc<RegisteredModule>> {
        self.read().modules.values().cloned().collect()
    }

    /// Resolve a request path to the module and action that own it.
    ///
    /// `method` is only consulted for HTTP. An exact key match wins outright;
    /// otherwise the most literal pattern match wins, then the higher
    /// priority, then the lower key.
    pub fn lookup_path(&self, path_type: PathType, method: &str, path: &str) -> Option<PathMatch> {
        let normalized = PathUtils::normalize(path);
        let method = method.trim().to_uppercase();
        let key = path_type.claim_key(Some(&method), &normalized);

        let state = self.read();
        let index = state.paths.get(&path_type)?;

        if let Some(claim) = index.get(&key) {
            debug!("Exact match for {} -> {}:{}", key, claim.module, claim.action);
            let params = claim.match_path(&normalized).unwrap_or_default();
            return Some(PathMatch::new(claim, params));
        }

        let mut best: Option<(usize, i32, &PathClaim, BTreeMap<String, String>)> = None;
        for claim in index.values() {
            if path_type.uses_method() && claim.method.as_deref() != Some(method.as_str()) {
                continue;
            }
            let params = match claim.match_path(&normalized) {
                Some(params) => params,
                None => continue,
            };

            let literal = claim.literal_segments();
            let priority = claim.priority.unwrap_or(0);
            let better = match &best {
                None => true,
                Some((best_literal, best_priority, _, _)) => {
                    (literal, priority) > (*best_literal, *best_priority)
                }
            };
            if better {
                best = Some((literal, priority, claim, params));
            }
        }

        match best {
            Some((_, _, claim, params)) => {
                debug!("Pattern match for {} -> {}:{}", key, claim.module, claim.action);
                Some(PathMatch::new(claim, params))
            }
            None => {
                debug!("No claim matches {}", key);
                None
            }
        }
    }

    /// Every claim of one transport, sorted by key
    pub fn claims(&self, path_type: PathType) -> Vec<PathClaim> {
        self.read()
            .paths
            .get(&path_type)
            .map(|index| index.values().cloned().collect())
            .unwrap_or_default()
    }

    /// HTTP claims sorted by path, then method
    pub fn http_paths(&self) -> Vec<PathClaim> {
        let mut claims = self.claims(PathType::Http);
        claims.sort_by(|a, b| a.path.cmp(&b.path).then_with(|| a.method.cmp(&b.method)));
        claims
    }

    /// CLI claims sorted by command path
    pub fn cli_paths(&self) -> Vec<PathClaim> {
        let mut claims = self.claims(PathType::Cli);
        claims.sort_by(|a, b| a.path.cmp(&b.path));
        claims
    }

    /// Module owning a storage table
    pub fn table_owner(&self, table: &str) -> Option<String> {
        self.read().tables.get(table).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().modules.is_empty()
    }

    /// Total claims across every transport
    pub fn claim_count(&self) -> usize {
        self.read().claim_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;
    use crate::paths::ExplicitEndpointMode;
    use crate::schema::{Channels, Field, FieldType, HttpChannel};

    fn http_module(name: &str) -> Module {
        Module::new(name)
            .with_field("title", Field::new(FieldType::String))
            .with_channels(Channels::new().with_http(HttpChannel::enabled()))
    }

    #[test]
    fn test_register_and_get() {
        let registry = ModuleRegistry::new();
        let registered = registry.register(http_module("post")).unwrap();
        assert_eq!(registered.plural, "posts");
        assert_eq!(registered.table, "posts");
        assert_eq!(registered.claims.len(), 5);
        assert_eq!(registry.get("post").unwrap().registration_id, registered.registration_id);
        assert_eq!(registry.table_owner("posts").as_deref(), Some("post"));
        assert_eq!(registry.claim_count(), 5);
    }

    #[test]
    fn test_same_module_repeated_claim_is_deduplicated() {
        let module = Module::new("post")
            .with_field("title", Field::new(FieldType::String))
            .with_channels(Channels::new().with_http(
                HttpChannel::enabled().with_endpoint("GET", "/posts", "list"),
            ));
        let registered = ModuleRegistry::new().register(module).unwrap();
        assert_eq!(registered.claims.len(), 5);
    }

    #[test]
    fn test_same_module_self_collision_is_a_conflict() {
        let module = Module::new("post")
            .with_field("title", Field::new(FieldType::String))
            .with_channels(Channels::new().with_http(
                HttpChannel::enabled().with_endpoint("GET", "/posts", "get"),
            ));

        let err = ModuleRegistry::new().register(module.clone()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::PathConflict);
        let conflicts = err.conflicts().unwrap();
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].existing.action, "list");
        assert_eq!(conflicts[0].incoming.action, "get");

        let config = RegistryConfig::new().with_explicit_endpoints(ExplicitEndpointMode::ReplaceImplicit);
        let registry = ModuleRegistry::with_config(config).unwrap();
        assert_eq!(registry.register(module).unwrap().claims.len(), 1);
    }

    #[test]
    fn test_limits() {
        let config = RegistryConfig::new().with_max_modules(1);
        let registry = ModuleRegistry::with_config(config).unwrap();
        registry.register(http_module("post")).unwrap();
        let err = registry.register(http_module("page")).unwrap_err();
        assert_eq!(err.code(), ErrorCode::LimitExceeded);

        let config = RegistryConfig {
            max_claims_per_module: 4,
            ..Default::default()
        };
        let registry = ModuleRegistry::with_config(config).unwrap();
        assert!(matches!(
            registry.register(http_module("post")),
            Err(RegistryError::LimitExceeded(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let err = ModuleRegistry::with_config(RegistryConfig::new().with_max_modules(0)).unwrap_err();
        assert_eq!(err.code(), ErrorCode::ConfigurationError);
    }

    #[test]
    fn test_priority_breaks_ties_between_equal_patterns() {
        let registry = ModuleRegistry::new();
        {
            let mut state = registry.write();
            let low = PathClaim::http("GET", "/files/{name}", "a", "read");
            let high = PathClaim::http("GET", "/files/{path}", "b", "read").with_priority(10);
            let index = state.paths.entry(PathType::Http).or_default();
            index.insert(low.key(), low);
            index.insert(high.key(), high);
        }

        let found = registry.lookup_path(PathType::Http, "GET", "/files/readme").unwrap();
        assert_eq!(found.module, "b");
        assert_eq!(found.param("path"), Some("readme"));
    }
}
