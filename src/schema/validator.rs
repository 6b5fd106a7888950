use crate::error::ValidationErrors;
use crate::schema::constraints;
use crate::schema::model::{
    Action, Channels, Constraint, ConstraintKind, Field, FieldType, Module,
};
use crate::utils::{JsonUtils, NamingUtils};
use log::{debug, info, warn};
use serde_json::Value;

/// HTTP methods accepted on explicit endpoints
pub const HTTP_METHODS: [&str; 7] = ["GET", "POST", "PUT", "PATCH", "DELETE", "HEAD", "OPTIONS"];

/// Structural gate for module declarations
pub struct ModuleValidator;

impl ModuleValidator {
    /// Validate a module, collecting every violation
    pub fn validate(module: &Module) -> Result<(), ValidationErrors> {
        Self::validate_with_context(module, None)
    }

    /// Validate a module with file context in log output
    pub fn validate_with_context(
        module: &Module,
        file_path: Option<&str>,
    ) -> Result<(), ValidationErrors> {
        let context = file_path
            .map(|p| format!(" (file: {})", p))
            .unwrap_or_default();
        debug!("Validating module '{}'{}", module.display_name(), context);

        let mut errors = ValidationErrors::new(module.display_name());

        Self::validate_identity(module, &mut errors);

        for (name, field) in &module.schema {
            Self::validate_field(name, field, &mut errors);
        }

        for (name, action) in &module.actions {
            Self::validate_action(module, name, action, &mut errors);
        }

        Self::validate_channels(module, &module.channels, &mut errors);

        if errors.is_empty() {
            info!(
                "✓ Module '{}' is valid{}: {} fields, {} actions, channels [{}]",
                module.display_name(),
                context,
                module.schema.len(),
                module.actions.len(),
                module.channels.enabled_names().join(", ")
            );
        } else {
            warn!(
                "Module '{}' failed validation{} with {} error(s)",
                module.display_name(),
                context,
                errors.len()
            );
        }

        errors.into_result()
    }

    /// Human-readable report for diagnostics
    pub fn get_validation_summary(module: &Module) -> String {
        match Self::validate(module) {
            Ok(()) => format!("Module '{}' appears to be valid", module.display_name()),
            Err(errors) => format!(
                "Module '{}' issues found:\n{}",
                errors.module,
                errors
                    .errors
                    .iter()
                    .map(|e| format!("• {}", e))
                    .collect::<Vec<_>>()
                    .join("\n")
            ),
        }
    }

    fn validate_identity(module: &Module, errors: &mut ValidationErrors) {
        if let Some(capability) = &module.capability {
            // Interface-only declarations: no schema requirement, capability name instead
            let capability = capability.trim();
            if capability.is_empty() {
                errors.push("capability name is required");
            } else if !NamingUtils::is_valid_identifier(capability) {
                errors.push(format!("invalid capability name '{}'", capability));
            }
            if !module.name.is_empty() && !NamingUtils::is_valid_identifier(&module.name) {
                errors.push(format!("invalid module name '{}'", module.name));
            }
            return;
        }

        if module.name.is_empty() {
            errors.push("module name is required");
        } else if !NamingUtils::is_valid_identifier(&module.name) {
            errors.push(format!("invalid module name '{}'", module.name));
        }

        if module.schema.is_empty() {
            errors.push("module must declare at least one field in schema");
        }
    }

    fn validate_field(name: &str, field: &Field, errors: &mut ValidationErrors) {
        if !NamingUtils::is_valid_identifier(name) {
            errors.push(format!("invalid field name '{}'", name));
        }

        let field_type = match field.field_type() {
            Some(t) => t,
            None => {
                errors.push(format!("field '{}': unknown type '{}'", name, field.r#type));
                Self::validate_constraints(name, &field.constraints, errors);
                return;
            }
        };

        match field_type {
            FieldType::Enum if field.values.is_empty() => {
                errors.push(format!("field '{}': enum type requires values", name));
            }
            FieldType::Ref if field.to.as_deref().map_or(true, |t| t.trim().is_empty()) => {
                errors.push(format!("field '{}': ref type requires a target module", name));
            }
            _ => {}
        }

        let constraints_ok = Self::validate_constraints(name, &field.constraints, errors);

        if let Some(default) = &field.default {
            match Self::check_default(field_type, field, default) {
                Err(problem) => errors.push(format!("field '{}': {}", name, problem)),
                Ok(()) if constraints_ok => {
                    for violation in constraints::validate_field(name, default, field) {
                        errors.push(format!(
                            "field '{}': default value {} violates {} constraint: {}",
                            name, default, violation.kind, violation.message
                        ));
                    }
                }
                Ok(()) => {}
            }
        }
    }

    /// Type agreement between a default and its declared type
    fn check_default(field_type: FieldType, field: &Field, default: &Value) -> Result<(), String> {
        let mismatch = |expected: &str| {
            Err(format!(
                "default value {} is not {} (got {})",
                default,
                expected,
                JsonUtils::value_type_name(default)
            ))
        };

        match field_type {
            FieldType::Int if !JsonUtils::is_integral(default) => mismatch("an integer"),
            FieldType::Float if !default.is_number() => mismatch("a number"),
            FieldType::Bool if !default.is_boolean() => mismatch("a boolean"),
            FieldType::Enum => match default.as_str() {
                Some(member) if field.values.iter().any(|v| v == member) => Ok(()),
                Some(member) => Err(format!(
                    "default value '{}' is not one of [{}]",
                    member,
                    field.values.join(", ")
                )),
                None => mismatch("an enum member string"),
            },
            t if t.is_string_like() && !default.is_string() => mismatch("a string"),
            FieldType::Uuid => match default.as_str().map(uuid::Uuid::parse_str) {
                Some(Ok(_)) => Ok(()),
                _ => Err(format!("default value {} is not a valid UUID", default)),
            },
            FieldType::Strings => match default.as_array() {
                Some(items) if items.iter().all(Value::is_string) => Ok(()),
                _ => mismatch("an array of strings"),
            },
            FieldType::Ints => match default.as_array() {
                Some(items) if items.iter().all(JsonUtils::is_integral) => Ok(()),
                _ => mismatch("an array of integers"),
            },
            _ => Ok(()),
        }
    }

    /// Returns false when the constraint set is contradictory or names an unknown type,
    /// so defaults are not checked against it
    fn validate_constraints(
        field_name: &str,
        constraints: &[Constraint],
        errors: &mut ValidationErrors,
    ) -> bool {
        let before = errors.len();
        let bound = |kind: ConstraintKind| {
            constraints
                .iter()
                .filter(|c| c.kind() == Some(kind))
                .find_map(|c| JsonUtils::as_f64(&c.value))
        };

        if let (Some(min), Some(max)) = (bound(ConstraintKind::Min), bound(ConstraintKind::Max)) {
            if min > max {
                errors.push(format!(
                    "field '{}': min constraint {} is greater than max {}",
                    field_name, min, max
                ));
            }
        }
        if let (Some(min), Some(max)) = (
            bound(ConstraintKind::MinLength),
            bound(ConstraintKind::MaxLength),
        ) {
            if min > max {
                errors.push(format!(
                    "field '{}': min_length constraint {} is greater than max_length {}",
                    field_name, min, max
                ));
            }
        }

        for constraint in constraints {
            match constraint.kind() {
                None => errors.push(format!(
                    "field '{}': unknown constraint type '{}'",
                    field_name, constraint.r#type
                )),
                // Unevaluable patterns are skipped by the constraint engine, not rejected
                Some(ConstraintKind::Pattern) => match constraint.value.as_str() {
                    Some(pattern) => {
                        if let Err(e) = regex::Regex::new(pattern) {
                            warn!(
                                "field '{}': ignoring invalid regex pattern '{}': {}",
                                field_name, pattern, e
                            );
                        }
                    }
                    None => warn!(
                        "field '{}': ignoring non-string pattern constraint {}",
                        field_name, constraint.value
                    ),
                },
                Some(_) => {}
            }
        }

        errors.len() == before
    }

    fn validate_action(module: &Module, name: &str, action: &Action, errors: &mut ValidationErrors) {
        if !NamingUtils::is_valid_identifier(name) {
            errors.push(format!("invalid action name '{}'", name));
        }

        for field in action.set.keys() {
            if !module.schema.contains_key(field) {
                errors.push(format!("action '{}': set references unknown field '{}'", name, field));
            }
        }

        for (input_name, input) in &action.inputs {
            if !NamingUtils::is_valid_identifier(input_name) {
                errors.push(format!("action '{}': invalid input name '{}'", name, input_name));
            }
            if let Some(field) = &input.field {
                if !module.schema.contains_key(field) {
                    errors.push(format!(
                        "action '{}': input '{}' maps to unknown field '{}'",
                        name, input_name, field
                    ));
                }
            }
            if let Some(tag) = &input.r#type {
                if tag.parse::<FieldType>().is_err() {
                    errors.push(format!(
                        "action '{}': input '{}' has unknown type '{}'",
                        name, input_name, tag
                    ));
                }
            }
        }
    }

    fn validate_channels(module: &Module, channels: &Channels, errors: &mut ValidationErrors) {
        let absolute = |label: &str, path: &Option<String>, errors: &mut ValidationErrors| {
            if let Some(path) = path {
                if !path.trim().starts_with('/') {
                    errors.push(format!("{} '{}' must start with '/'", label, path));
                }
            }
        };

        absolute("http base_path", &channels.http.base_path, errors);
        absolute("websocket path", &channels.websocket.path, errors);
        absolute("webhook path", &channels.webhook.path, errors);

        for endpoint in &channels.http.endpoints {
            let method = endpoint.method.trim().to_uppercase();
            if !HTTP_METHODS.contains(&method.as_str()) {
                errors.push(format!(
                    "http endpoint {} {}: unknown method '{}'",
                    endpoint.method, endpoint.path, endpoint.method
                ));
            }
            if !endpoint.path.trim().starts_with('/') {
                errors.push(format!(
                    "http endpoint {} {}: path must start with '/'",
                    endpoint.method, endpoint.path
                ));
            }
            if !module.has_action(&endpoint.action) {
                errors.push(format!(
                    "http endpoint {} {}: unknown action '{}'",
                    endpoint.method, endpoint.path, endpoint.action
                ));
            }
        }

        if let Some(command) = &channels.cli.command {
            if command.trim().is_empty() {
                errors.push("cli command must not be blank");
            }
        }

        if let Some(service) = &channels.grpc.service {
            if !NamingUtils::is_valid_identifier(service) {
                errors.push(format!("invalid grpc service name '{}'", service));
            }
        }
    }
}
