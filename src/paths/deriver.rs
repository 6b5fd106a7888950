//! Expansion of a module's channel configuration into path claims.
//!
//! Derivation is pure and deterministic: the same module and plural always
//! produce the same claims in the same order. Claims are emitted per channel
//! in the order HTTP, CLI, WebSocket, Webhook, gRPC.

use crate::paths::claim::{PathClaim, PathType};
use crate::schema::model::Module;
use crate::utils::{NamingUtils, PathUtils};
use log::debug;
use serde::{Deserialize, Serialize};

/// Action name recorded on a WebSocket claim
pub const WEBSOCKET_ACTION: &str = "subscribe";

/// Action name recorded on a webhook claim
pub const WEBHOOK_ACTION: &str = "receive";

/// How explicit HTTP endpoints combine with the implicit ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplicitEndpointMode {
    /// Explicit endpoints are claimed alongside implicit CRUD and action routes
    #[default]
    Additive,
    /// Configured explicit endpoints are the only HTTP claims
    ReplaceImplicit,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PathDeriver {
    mode: ExplicitEndpointMode,
}

impl PathDeriver {
    pub fn new(mode: ExplicitEndpointMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> ExplicitEndpointMode {
        self.mode
    }

    /// Every claim the module would occupy if admitted
    pub fn extract_paths(&self, module: &Module, plural: &str) -> Vec<PathClaim> {
        let mut claims = Vec::new();

        if module.channels.http.enabled {
            self.http_claims(module, plural, &mut claims);
        }
        if module.channels.cli.enabled {
            Self::cli_claims(module, plural, &mut claims);
        }
        if module.channels.websocket.enabled {
            let path = match &module.channels.websocket.path {
                Some(path) => path.clone(),
                None => format!("/ws/{}", plural),
            };
            claims.push(PathClaim::new(PathType::WebSocket, &path, &module.name, WEBSOCKET_ACTION));
        }
        if module.channels.webhook.enabled {
            let path = match &module.channels.webhook.path {
                Some(path) => path.clone(),
                None => format!("/webhooks/{}", module.name),
            };
            claims.push(PathClaim::new(PathType::Webhook, &path, &module.name, WEBHOOK_ACTION));
        }
        if module.channels.grpc.enabled {
            Self::grpc_claims(module, &mut claims);
        }

        debug!(
            "Derived {} path claim(s) for module '{}' ({:?} mode)",
            claims.len(),
            module.name,
            self.mode
        );
        claims
    }

    fn http_claims(&self, module: &Module, plural: &str, claims: &mut Vec<PathClaim>) {
        let http = &module.channels.http;
        let replace = self.mode == ExplicitEndpointMode::ReplaceImplicit && !http.endpoints.is_empty();

        if !replace {
            let base = match &http.base_path {
                Some(base) => PathUtils::normalize(base),
                None => format!("/{}", plural),
            };
            let item = PathUtils::join(&base, "{id}");

            claims.push(PathClaim::http("GET", &base, &module.name, "list"));
            claims.push(PathClaim::http("POST", &base, &module.name, "create"));
            claims.push(PathClaim::http("GET", &item, &module.name, "get"));
            claims.push(PathClaim::http("PATCH", &item, &module.name, "update"));
            claims.push(PathClaim::http("DELETE", &item, &module.name, "delete"));

            for action in module.actions.keys() {
                let path = PathUtils::join(&item, action);
                claims.push(PathClaim::http("POST", &path, &module.name, action.as_str()));
            }
        }

        for endpoint in &http.endpoints {
            claims.push(PathClaim::http(
                &endpoint.method,
                &endpoint.path,
                &module.name,
                endpoint.action.as_str(),
            ));
        }
    }

    fn cli_claims(module: &Module, plural: &str, claims: &mut Vec<PathClaim>) {
        let command = module
            .channels
            .cli
            .command
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(plural);

        for action in module.action_names() {
            let path = format!("{} {}", command, action);
            claims.push(PathClaim::new(PathType::Cli, &path, &module.name, action));
        }
    }

    fn grpc_claims(module: &Module, claims: &mut Vec<PathClaim>) {
        let grpc = &module.channels.grpc;
        let service = match &grpc.service {
            Some(service) => service.clone(),
            None => format!("{}Service", NamingUtils::to_pascal_case(&module.name)),
        };
        let qualified = match grpc.package.as_deref().map(str::trim) {
            Some(package) if !package.is_empty() => format!("{}.{}", package, service),
            _ => service,
        };

        for action in module.action_names() {
            let path = format!("/{}/{}", qualified, NamingUtils::to_pascal_case(&action));
            claims.push(PathClaim::new(PathType::Grpc, &path, &module.name, action));
        }
    }
}

/// Claims derived with the default additive endpoint mode
pub fn extract_paths(module: &Module, plural: &str) -> Vec<PathClaim> {
    PathDeriver::default().extract_paths(module, plural)
}
