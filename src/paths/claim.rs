use crate::error::ClaimOwner;
use crate::utils::PathUtils;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Transport kinds a module can claim addresses on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PathType {
    #[serde(rename = "http")]
    Http,
    #[serde(rename = "cli")]
    Cli,
    #[serde(rename = "ws", alias = "websocket")]
    WebSocket,
    #[serde(rename = "webhook")]
    Webhook,
    #[serde(rename = "grpc")]
    Grpc,
}

impl PathType {
    pub const ALL: [PathType; 5] = [
        PathType::Http,
        PathType::Cli,
        PathType::WebSocket,
        PathType::Webhook,
        PathType::Grpc,
    ];

    /// Claim key prefix
    pub fn as_str(&self) -> &'static str {
        match self {
            PathType::Http => "http",
            PathType::Cli => "cli",
            PathType::WebSocket => "ws",
            PathType::Webhook => "webhook",
            PathType::Grpc => "grpc",
        }
    }

    /// Only HTTP claims are qualified by a method
    pub fn uses_method(&self) -> bool {
        matches!(self, PathType::Http)
    }

    /// Uniqueness key for an already-normalized path
    pub fn claim_key(&self, method: Option<&str>, path: &str) -> String {
        match self {
            PathType::Http => format!(
                "http:{}:{}",
                method.map(str::to_uppercase).unwrap_or_default(),
                path
            ),
            other => format!("{}:{}", other.as_str(), path),
        }
    }

    /// Split a normalized path into matchable segments
    pub fn segments<'a>(&self, path: &'a str) -> Vec<&'a str> {
        match self {
            PathType::Cli => path.split_whitespace().collect(),
            _ => path.split('/').filter(|s| !s.is_empty()).collect(),
        }
    }
}

impl fmt::Display for PathType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PathType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "http" => Ok(PathType::Http),
            "cli" | "tty" => Ok(PathType::Cli),
            "ws" | "websocket" => Ok(PathType::WebSocket),
            "webhook" => Ok(PathType::Webhook),
            "grpc" => Ok(PathType::Grpc),
            other => Err(format!(
                "unknown path type '{}' (expected one of: http, cli, ws, webhook, grpc)",
                other
            )),
        }
    }
}

/// One address a module occupies once registered
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathClaim {
    pub path_type: PathType,

    pub path: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    pub module: String,

    pub action: String,

    /// Tie-breaker between equally specific pattern matches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<i32>,
}

impl PathClaim {
    /// Claim on a method-less transport; the path is normalized
    pub fn new(
        path_type: PathType,
        path: &str,
        module: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            path_type,
            path: PathUtils::normalize(path),
            method: None,
            module: module.into(),
            action: action.into(),
            priority: None,
        }
    }

    /// HTTP claim; the method is uppercased and the path normalized
    pub fn http(
        method: &str,
        path: &str,
        module: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        Self {
            path_type: PathType::Http,
            path: PathUtils::normalize(path),
            method: Some(method.trim().to_uppercase()),
            module: module.into(),
            action: action.into(),
            priority: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn key(&self) -> String {
        self.path_type.claim_key(self.method.as_deref(), &self.path)
    }

    pub fn owner(&self) -> ClaimOwner {
        ClaimOwner {
            module: self.module.clone(),
            action: self.action.clone(),
        }
    }

    /// Number of segments that are not `{param}` wildcards
    pub fn literal_segments(&self) -> usize {
        self.path_type
            .segments(&self.path)
            .iter()
            .filter(|segment| PathUtils::param_name(segment).is_none())
            .count()
    }

    /// Match a normalized request path segment by segment.
    ///
    /// `{name}` segments match any single request segment and are captured;
    /// literal segments must be equal and segment counts must agree.
    pub fn match_path(&self, request_path: &str) -> Option<BTreeMap<String, String>> {
        let pattern = self.path_type.segments(&self.path);
        let request = self.path_type.segments(request_path);
        if pattern.len() != request.len() {
            return None;
        }

        let mut params = BTreeMap::new();
        for (expected, actual) in pattern.iter().zip(request.iter()) {
            match PathUtils::param_name(expected) {
                Some(name) => {
                    params.insert(name.to_string(), actual.to_string());
                }
                None if expected == actual => {}
                None => return None,
            }
        }
        Some(params)
    }
}

impl fmt::Display for PathClaim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.method {
            Some(method) => write!(
                f,
                "{} {} {} -> {}:{}",
                self.path_type, method, self.path, self.module, self.action
            ),
            None => write!(
                f,
                "{} {} -> {}:{}",
                self.path_type, self.path, self.module, self.action
            ),
        }
    }
}

/// Result of resolving a request path to its owner
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathMatch {
    pub module: String,
    pub action: String,
    pub claim: PathClaim,
    /// Values captured by `{param}` segments
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

impl PathMatch {
    pub fn new(claim: &PathClaim, params: BTreeMap<String, String>) -> Self {
        Self {
            module: claim.module.clone(),
            action: claim.action.clone(),
            claim: claim.clone(),
            params,
        }
    }

    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }
}
