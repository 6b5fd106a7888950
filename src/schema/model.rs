use crate::utils::NamingUtils;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The five operations every module exposes without declaring them
pub const IMPLICIT_ACTIONS: [&str; 5] = ["list", "get", "create", "update", "delete"];

/// Module declaration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Module {
    /// Module name (`module` key)
    #[serde(rename = "module", default)]
    pub name: String,

    /// Capability name for interface-only declarations
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capability: Option<String>,

    /// Field definitions
    #[serde(default)]
    pub schema: BTreeMap<String, Field>,

    /// Custom actions beyond the implicit CRUD set
    #[serde(default)]
    pub actions: BTreeMap<String, Action>,

    /// Transport exposure
    #[serde(default)]
    pub channels: Channels,

    #[serde(default)]
    pub meta: ModuleMeta,
}

impl Module {
    /// Create a new module declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Create a capability interface declaration
    pub fn capability(name: impl Into<String>) -> Self {
        Self {
            capability: Some(name.into()),
            ..Default::default()
        }
    }

    /// Add a field to the schema
    pub fn add_field(&mut self, name: impl Into<String>, field: Field) {
        self.schema.insert(name.into(), field);
    }

    /// Add a custom action
    pub fn add_action(&mut self, name: impl Into<String>, action: Action) {
        self.actions.insert(name.into(), action);
    }

    pub fn with_field(mut self, name: impl Into<String>, field: Field) -> Self {
        self.add_field(name, field);
        self
    }

    pub fn with_action(mut self, name: impl Into<String>, action: Action) -> Self {
        self.add_action(name, action);
        self
    }

    pub fn with_channels(mut self, channels: Channels) -> Self {
        self.channels = channels;
        self
    }

    pub fn with_meta(mut self, meta: ModuleMeta) -> Self {
        self.meta = meta;
        self
    }

    /// Check if this is a schema-less capability interface declaration
    pub fn is_capability(&self) -> bool {
        self.capability.is_some()
    }

    /// Module name, falling back to the capability name
    pub fn display_name(&self) -> &str {
        if self.name.is_empty() {
            self.capability.as_deref().unwrap_or("")
        } else {
            &self.name
        }
    }

    /// Plural used for default paths and CLI commands
    pub fn plural(&self) -> String {
        match self.meta.plural.as_deref().map(str::trim) {
            Some(plural) if !plural.is_empty() => plural.to_string(),
            _ => NamingUtils::pluralize(&self.name),
        }
    }

    /// Storage table identity
    pub fn table_name(&self) -> String {
        match self.meta.table.as_deref().map(str::trim) {
            Some(table) if !table.is_empty() => table.to_string(),
            _ => NamingUtils::to_snake_case(&self.plural()),
        }
    }

    /// Get field by name
    pub fn get_field(&self, name: &str) -> Option<&Field> {
        self.schema.get(name)
    }

    /// Get custom action by name
    pub fn get_action(&self, name: &str) -> Option<&Action> {
        self.actions.get(name)
    }

    /// Implicit or custom action exists
    pub fn has_action(&self, name: &str) -> bool {
        IMPLICIT_ACTIONS.contains(&name) || self.actions.contains_key(name)
    }

    /// Implicit actions followed by custom actions, each name once
    pub fn action_names(&self) -> Vec<String> {
        IMPLICIT_ACTIONS
            .iter()
            .map(|a| a.to_string())
            .chain(
                self.actions
                    .keys()
                    .filter(|name| !IMPLICIT_ACTIONS.contains(&name.as_str()))
                    .cloned(),
            )
            .collect()
    }

    /// Fields usable to look a record up by value
    pub fn lookup_fields(&self) -> Vec<&String> {
        self.schema
            .iter()
            .filter(|(_, field)| field.lookup)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn unique_fields(&self) -> Vec<&String> {
        self.schema
            .iter()
            .filter(|(_, field)| field.unique)
            .map(|(name, _)| name)
            .collect()
    }

    /// Fields that may appear in external representations
    pub fn exposed_fields(&self) -> Vec<&String> {
        self.schema
            .iter()
            .filter(|(_, field)| !field.internal)
            .map(|(name, _)| name)
            .collect()
    }

    pub fn required_fields(&self) -> Vec<&String> {
        self.schema
            .iter()
            .filter(|(_, field)| field.is_required())
            .map(|(name, _)| name)
            .collect()
    }
}

/// Version and packaging metadata
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ModuleMeta {
    #[serde(default)]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Names of modules this one depends on
    #[serde(default)]
    pub dependencies: Vec<String>,

    /// Plural override (default: pluralized module name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plural: Option<String>,

    /// Table override (default: snake_case plural)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table: Option<String>,
}

impl ModuleMeta {
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..Default::default()
        }
    }

    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }

    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = Some(table.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Known field types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "string")]
    String,
    #[serde(rename = "int")]
    Int,
    #[serde(rename = "float")]
    Float,
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "timestamp")]
    Timestamp,
    #[serde(rename = "duration")]
    Duration,
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "bytes")]
    Bytes,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "url")]
    Url,
    #[serde(rename = "uuid")]
    Uuid,
    #[serde(rename = "enum")]
    Enum,
    #[serde(rename = "ref")]
    Ref,
    #[serde(rename = "secret")]
    Secret,
    #[serde(rename = "string[]", alias = "strings")]
    Strings,
    #[serde(rename = "int[]", alias = "ints")]
    Ints,
}

impl FieldType {
    pub const ALL: [FieldType; 16] = [
        FieldType::String,
        FieldType::Int,
        FieldType::Float,
        FieldType::Bool,
        FieldType::Timestamp,
        FieldType::Duration,
        FieldType::Json,
        FieldType::Bytes,
        FieldType::Email,
        FieldType::Url,
        FieldType::Uuid,
        FieldType::Enum,
        FieldType::Ref,
        FieldType::Secret,
        FieldType::Strings,
        FieldType::Ints,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Int => "int",
            FieldType::Float => "float",
            FieldType::Bool => "bool",
            FieldType::Timestamp => "timestamp",
            FieldType::Duration => "duration",
            FieldType::Json => "json",
            FieldType::Bytes => "bytes",
            FieldType::Email => "email",
            FieldType::Url => "url",
            FieldType::Uuid => "uuid",
            FieldType::Enum => "enum",
            FieldType::Ref => "ref",
            FieldType::Secret => "secret",
            FieldType::Strings => "string[]",
            FieldType::Ints => "int[]",
        }
    }

    /// Types whose values are carried as strings
    pub fn is_string_like(&self) -> bool {
        matches!(
            self,
            FieldType::String
                | FieldType::Email
                | FieldType::Url
                | FieldType::Uuid
                | FieldType::Secret
        )
    }
}

impl FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "strings" => Ok(FieldType::Strings),
            "ints" => Ok(FieldType::Ints),
            other => FieldType::ALL
                .iter()
                .copied()
                .find(|t| t.as_str() == other)
                .ok_or_else(|| format!("unknown field type '{}'", other)),
        }
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field definition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Field {
    /// Field type tag, checked by the validator
    pub r#type: String,

    #[serde(default)]
    pub unique: bool,

    /// Eligible as a lookup key
    #[serde(default)]
    pub lookup: bool,

    /// Explicit true/false; unset means optional
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,

    /// Never exposed externally
    #[serde(default)]
    pub internal: bool,

    #[serde(default)]
    pub indexed: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// Allowed members of an enum field
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub values: Vec<String>,

    /// Target module of a ref field
    #[serde(default, alias = "ref", alias = "target", skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
}

impl Field {
    /// Create a new field of a known type
    pub fn new(field_type: FieldType) -> Self {
        Self::with_type_tag(field_type.as_str())
    }

    /// Create a field from a raw type tag
    pub fn with_type_tag(tag: impl Into<String>) -> Self {
        Self {
            r#type: tag.into(),
            unique: false,
            lookup: false,
            required: None,
            internal: false,
            indexed: false,
            default: None,
            values: Vec::new(),
            to: None,
            description: None,
            constraints: Vec::new(),
        }
    }

    /// Parsed field type, `None` for unknown tags
    pub fn field_type(&self) -> Option<FieldType> {
        self.r#type.parse().ok()
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn lookup(mut self) -> Self {
        self.lookup = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }

    pub fn internal(mut self) -> Self {
        self.internal = true;
        self
    }

    pub fn indexed(mut self) -> Self {
        self.indexed = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_values<I, S>(mut self, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.values = values.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_target(mut self, module: impl Into<String>) -> Self {
        self.to = Some(module.into());
        self
    }

    pub fn with_constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if field is required
    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    /// Check if field has default value
    pub fn has_default(&self) -> bool {
        self.default.is_some()
    }
}

/// Known constraint types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Min,
    Max,
    MinLength,
    MaxLength,
    Pattern,
    NotEmpty,
    OneOf,
    /// Needs a data-store lookup; evaluated by the execution layer
    RefExists,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 8] = [
        ConstraintKind::Min,
        ConstraintKind::Max,
        ConstraintKind::MinLength,
        ConstraintKind::MaxLength,
        ConstraintKind::Pattern,
        ConstraintKind::NotEmpty,
        ConstraintKind::OneOf,
        ConstraintKind::RefExists,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::Min => "min",
            ConstraintKind::Max => "max",
            ConstraintKind::MinLength => "min_length",
            ConstraintKind::MaxLength => "max_length",
            ConstraintKind::Pattern => "pattern",
            ConstraintKind::NotEmpty => "not_empty",
            ConstraintKind::OneOf => "one_of",
            ConstraintKind::RefExists => "ref_exists",
        }
    }
}

impl FromStr for ConstraintKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        ConstraintKind::ALL
            .iter()
            .copied()
            .find(|k| k.as_str() == s)
            .ok_or_else(|| format!("unknown constraint type '{}'", s))
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraint attached to a field
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Constraint {
    /// Constraint type tag
    pub r#type: String,

    /// Opaque constraint argument
    #[serde(default)]
    pub value: Value,

    /// Message replacing the generated one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Constraint {
    pub fn new(kind: ConstraintKind, value: Value) -> Self {
        Self {
            r#type: kind.as_str().to_string(),
            value,
            message: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Parsed constraint type, `None` for unknown tags
    pub fn kind(&self) -> Option<ConstraintKind> {
        self.r#type.parse().ok()
    }
}

/// Custom operation
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Action {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Fields assigned on invocation
    #[serde(default)]
    pub set: BTreeMap<String, Value>,

    #[serde(default)]
    pub inputs: BTreeMap<String, ActionInput>,

    /// Result field names, may be synthesized
    #[serde(default)]
    pub output: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,

    #[serde(default)]
    pub confirm: bool,

    /// Hook run before the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,

    /// Hook run after the action
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
}

impl Action {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_set(mut self, field: impl Into<String>, value: Value) -> Self {
        self.set.insert(field.into(), value);
        self
    }

    pub fn with_input(mut self, name: impl Into<String>, input: ActionInput) -> Self {
        self.inputs.insert(name.into(), input);
        self
    }

    pub fn with_output<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.output = fields.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    pub fn requiring_confirmation(mut self) -> Self {
        self.confirm = true;
        self
    }

    pub fn with_hooks(mut self, before: Option<String>, after: Option<String>) -> Self {
        self.before = before;
        self.after = after;
        self
    }
}

/// Declared input of an action
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ActionInput {
    /// Type tag, inherited from the mapped field when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,

    /// Schema field this input writes to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,

    #[serde(default)]
    pub required: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,

    /// CLI prompt text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ActionInput {
    pub fn new(field_type: FieldType) -> Self {
        Self {
            r#type: Some(field_type.as_str().to_string()),
            ..Default::default()
        }
    }

    /// Input mapped onto a schema field
    pub fn for_field(field: impl Into<String>) -> Self {
        Self {
            field: Some(field.into()),
            ..Default::default()
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    /// Effective type: declared, else the mapped field's
    pub fn resolved_type(&self, module: &Module) -> Option<FieldType> {
        match &self.r#type {
            Some(tag) => tag.parse().ok(),
            None => self
                .field
                .as_deref()
                .and_then(|f| module.get_field(f))
                .and_then(Field::field_type),
        }
    }
}

/// Per-transport exposure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Channels {
    #[serde(default)]
    pub http: HttpChannel,

    #[serde(default)]
    pub cli: CliChannel,

    #[serde(default)]
    pub tty: TtyChannel,

    #[serde(default, alias = "ws")]
    pub websocket: WebSocketChannel,

    #[serde(default)]
    pub webhook: WebhookChannel,

    #[serde(default)]
    pub grpc: GrpcChannel,
}

impl Channels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_http(mut self, http: HttpChannel) -> Self {
        self.http = http;
        self
    }

    pub fn with_cli(mut self, cli: CliChannel) -> Self {
        self.cli = cli;
        self
    }

    pub fn with_tty(mut self, tty: TtyChannel) -> Self {
        self.tty = tty;
        self
    }

    pub fn with_websocket(mut self, websocket: WebSocketChannel) -> Self {
        self.websocket = websocket;
        self
    }

    pub fn with_webhook(mut self, webhook: WebhookChannel) -> Self {
        self.webhook = webhook;
        self
    }

    pub fn with_grpc(mut self, grpc: GrpcChannel) -> Self {
        self.grpc = grpc;
        self
    }

    /// Names of the enabled channels
    pub fn enabled_names(&self) -> Vec<&'static str> {
        [
            ("http", self.http.enabled),
            ("cli", self.cli.enabled),
            ("tty", self.tty.enabled),
            ("websocket", self.websocket.enabled),
            ("webhook", self.webhook.enabled),
            ("grpc", self.grpc.enabled),
        ]
        .into_iter()
        .filter(|(_, enabled)| *enabled)
        .map(|(name, _)| name)
        .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HttpChannel {
    #[serde(default)]
    pub enabled: bool,

    /// Base path (default: `/` + plural)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_path: Option<String>,

    /// Explicit method/path/action bindings
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub endpoints: Vec<Endpoint>,
}

impl HttpChannel {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    pub fn with_base_path(mut self, base_path: impl Into<String>) -> Self {
        self.base_path = Some(base_path.into());
        self
    }

    pub fn with_endpoint(
        mut self,
        method: impl Into<String>,
        path: impl Into<String>,
        action: impl Into<String>,
    ) -> Self {
        self.endpoints.push(Endpoint {
            method: method.into(),
            path: path.into(),
            action: action.into(),
        });
        self
    }
}

/// Explicit HTTP endpoint override
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Endpoint {
    pub method: String,
    pub path: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct CliChannel {
    #[serde(default)]
    pub enabled: bool,

    /// Command name (default: plural)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
}

impl CliChannel {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            command: None,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }
}

/// Interactive terminal UI; shares addressing with the CLI
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct TtyChannel {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebSocketChannel {
    #[serde(default)]
    pub enabled: bool,

    /// Path (default: `/ws/` + plural)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl WebSocketChannel {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct WebhookChannel {
    #[serde(default)]
    pub enabled: bool,

    /// Path (default: `/webhooks/` + module name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl WebhookChannel {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            path: None,
        }
    }

    pub fn at(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct GrpcChannel {
    #[serde(default)]
    pub enabled: bool,

    /// Service name (default: PascalCase module name + `Service`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<String>,

    /// Proto package prefix
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
}

impl GrpcChannel {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Default::default()
        }
    }

    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = Some(service.into());
        self
    }

    pub fn with_package(mut self, package: impl Into<String>) -> Self {
        self.package = Some(package.into());
        self
    }
}
