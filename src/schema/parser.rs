use crate::error::DocumentError;
use crate::schema::model::Module;
use crate::schema::validator::ModuleValidator;
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Declaration document formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Detect by extension, defaulting to JSON
    pub fn from_path(path: &str) -> Self {
        if path.ends_with(".yaml") || path.ends_with(".yml") {
            DocumentFormat::Yaml
        } else {
            DocumentFormat::Json
        }
    }

    fn is_document(path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("json") | Some("yaml") | Some("yml")
        )
    }
}

/// Module declaration parser for JSON and YAML formats
pub struct ModuleParser;

impl ModuleParser {
    /// Parse a module from JSON string
    pub fn from_json(json_str: &str) -> Result<Module, DocumentError> {
        Self::from_json_with_context(json_str, None)
    }

    /// Parse a module from JSON string with file context
    pub fn from_json_with_context(
        json_str: &str,
        file_path: Option<&str>,
    ) -> Result<Module, DocumentError> {
        let context = file_path
            .map(|p| format!(" (file: {})", p))
            .unwrap_or_default();
        debug!(
            "Attempting to parse module from JSON{} ({} bytes)",
            context,
            json_str.len()
        );

        if json_str.trim().is_empty() {
            error!("Module JSON string is empty{}", context);
            return Err(DocumentError::Empty {
                format: "JSON",
                context,
            });
        }

        match serde_json::from_str::<Module>(json_str) {
            Ok(module) => {
                info!(
                    "Successfully parsed module '{}' from JSON{}",
                    module.display_name(),
                    context
                );
                Ok(module)
            }
            Err(e) => {
                error!("Failed to parse module from JSON{}: {}", context, e);
                Err(match e.classify() {
                    serde_json::error::Category::Syntax | serde_json::error::Category::Eof => {
                        DocumentError::Syntax {
                            format: "JSON",
                            context,
                            line: e.line(),
                            column: e.column(),
                            message: e.to_string(),
                        }
                    }
                    serde_json::error::Category::Data | serde_json::error::Category::Io => {
                        DocumentError::Data {
                            format: "JSON",
                            context,
                            message: e.to_string(),
                        }
                    }
                })
            }
        }
    }

    /// Parse a module from YAML string
    #[cfg(feature = "yaml-support")]
    pub fn from_yaml(yaml_str: &str) -> Result<Module, DocumentError> {
        Self::from_yaml_with_context(yaml_str, None)
    }

    /// Parse a module from YAML string with file context
    #[cfg(feature = "yaml-support")]
    pub fn from_yaml_with_context(
        yaml_str: &str,
        file_path: Option<&str>,
    ) -> Result<Module, DocumentError> {
        let context = file_path
            .map(|p| format!(" (file: {})", p))
            .unwrap_or_default();
        debug!(
            "Attempting to parse module from YAML{} ({} bytes)",
            context,
            yaml_str.len()
        );

        if yaml_str.trim().is_empty() {
            error!("Module YAML string is empty{}", context);
            return Err(DocumentError::Empty {
                format: "YAML",
                context,
            });
        }

        match serde_yaml::from_str::<Module>(yaml_str) {
            Ok(module) => {
                info!(
                    "Successfully parsed module '{}' from YAML{}",
                    module.display_name(),
                    context
                );
                Ok(module)
            }
            Err(e) => {
                error!("Failed to parse module from YAML{}: {}", context, e);
                Err(match e.location() {
                    Some(location) => DocumentError::Syntax {
                        format: "YAML",
                        context,
                        line: location.line(),
                        column: location.column(),
                        message: e.to_string(),
                    },
                    None => DocumentError::Data {
                        format: "YAML",
                        context,
                        message: e.to_string(),
                    },
                })
            }
        }
    }

    /// Parse a document already in memory in the given format
    pub fn from_str_with_format(
        content: &str,
        format: DocumentFormat,
        file_path: Option<&str>,
    ) -> Result<Module, DocumentError> {
        match format {
            DocumentFormat::Json => Self::from_json_with_context(content, file_path),
            #[cfg(feature = "yaml-support")]
            DocumentFormat::Yaml => Self::from_yaml_with_context(content, file_path),
            #[cfg(not(feature = "yaml-support"))]
            DocumentFormat::Yaml => {
                error!("YAML support not enabled{}", file_path.unwrap_or_default());
                Err(DocumentError::UnsupportedFormat(
                    file_path.unwrap_or("<string>").to_string(),
                ))
            }
        }
    }

    /// Parse a module from file (auto-detect format based on extension)
    pub async fn from_file(path: &str) -> Result<Module, DocumentError> {
        info!("Loading module declaration from file: {}", path);

        if path.trim().is_empty() {
            error!("Module file path is empty");
            return Err(DocumentError::Io {
                path: String::new(),
                message: "File path cannot be empty".to_string(),
            });
        }

        let content = match fs::read_to_string(path).await {
            Ok(content) => {
                debug!("Successfully read {} bytes from {}", content.len(), path);
                content
            }
            Err(e) => {
                error!("Failed to read module file '{}': {}", path, e);
                return Err(DocumentError::Io {
                    path: path.to_string(),
                    message: e.to_string(),
                });
            }
        };

        Self::from_str_with_format(&content, DocumentFormat::from_path(path), Some(path))
    }

    /// Serialize a module to JSON string
    pub fn to_json(module: &Module) -> Result<String, DocumentError> {
        debug!("Serializing module '{}' to JSON", module.display_name());
        serde_json::to_string_pretty(module).map_err(|e| {
            error!("Failed to serialize module to JSON: {}", e);
            DocumentError::Data {
                format: "JSON",
                context: String::new(),
                message: e.to_string(),
            }
        })
    }

    /// Serialize a module to YAML string
    #[cfg(feature = "yaml-support")]
    pub fn to_yaml(module: &Module) -> Result<String, DocumentError> {
        debug!("Serializing module '{}' to YAML", module.display_name());
        serde_yaml::to_string(module).map_err(|e| {
            error!("Failed to serialize module to YAML: {}", e);
            DocumentError::Data {
                format: "YAML",
                context: String::new(),
                message: e.to_string(),
            }
        })
    }

    /// Write a module to file (format based on extension)
    pub async fn to_file(module: &Module, path: &str) -> Result<(), DocumentError> {
        let content = match DocumentFormat::from_path(path) {
            DocumentFormat::Json => Self::to_json(module)?,
            #[cfg(feature = "yaml-support")]
            DocumentFormat::Yaml => Self::to_yaml(module)?,
            #[cfg(not(feature = "yaml-support"))]
            DocumentFormat::Yaml => return Err(DocumentError::UnsupportedFormat(path.to_string())),
        };

        fs::write(path, content).await.map_err(|e| DocumentError::Io {
            path: path.to_string(),
            message: e.to_string(),
        })
    }

    /// Load and validate a module from file in one step
    pub async fn load_and_validate(path: &str) -> Result<Module, DocumentError> {
        let module = Self::from_file(path).await?;
        ModuleValidator::validate_with_context(&module, Some(path))?;
        info!("Successfully loaded and validated module '{}' from {}", module.display_name(), path);
        Ok(module)
    }

    /// Load and validate a module from JSON string in one step
    pub fn load_and_validate_json(json_str: &str) -> Result<Module, DocumentError> {
        let module = Self::from_json(json_str)?;
        ModuleValidator::validate(&module)?;
        Ok(module)
    }

    /// Load and validate a module from YAML string in one step
    #[cfg(feature = "yaml-support")]
    pub fn load_and_validate_yaml(yaml_str: &str) -> Result<Module, DocumentError> {
        let module = Self::from_yaml(yaml_str)?;
        ModuleValidator::validate(&module)?;
        Ok(module)
    }

    /// Parse several declaration files, stopping at the first failure
    pub async fn parse_multiple_files(file_paths: &[String]) -> Result<Vec<Module>, DocumentError> {
        info!("Parsing {} module files", file_paths.len());
        let mut modules = Vec::with_capacity(file_paths.len());
        for path in file_paths {
            modules.push(Self::from_file(path).await?);
        }
        Ok(modules)
    }

    /// Parse every `.json`/`.yaml`/`.yml` file in a directory, in file name order
    pub async fn load_directory(dir: &str) -> Result<Vec<(PathBuf, Module)>, DocumentError> {
        info!("Loading module declarations from directory: {}", dir);
        let io_error = |e: std::io::Error| DocumentError::Io {
            path: dir.to_string(),
            message: e.to_string(),
        };

        let mut entries = fs::read_dir(dir).await.map_err(io_error)?;
        let mut paths = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(io_error)? {
            let path = entry.path();
            if DocumentFormat::is_document(&path) {
                paths.push(path);
            } else {
                debug!("Skipping non-declaration file {}", path.display());
            }
        }
        paths.sort();

        if paths.is_empty() {
            warn!("No module declarations found in {}", dir);
        }

        let mut modules = Vec::with_capacity(paths.len());
        for path in paths {
            let module = Self::from_file(&path.to_string_lossy()).await?;
            modules.push((path, module));
        }
        Ok(modules)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::{Field, FieldType};

    const USER_JSON: &str = r#"{
        "module": "user",
        "meta": {"version": "1.0.0", "description": "Accounts"},
        "schema": {
            "email": {"type": "email", "unique": true, "lookup": true, "required": true},
            "name": {"type": "string"}
        },
        "channels": {"http": {"enabled": true}}
    }"#;

    #[test]
    fn test_parse_json_module() {
        let module = ModuleParser::from_json(USER_JSON).unwrap();
        assert_eq!(module.name, "user");
        assert_eq!(module.meta.version, "1.0.0");
        assert_eq!(module.schema.len(), 2);
        assert_eq!(module.get_field("email").unwrap().required, Some(true));
        assert_eq!(module.get_field("name").unwrap().required, None);
        assert!(module.channels.http.enabled);
        assert!(!module.channels.cli.enabled);
    }

    #[test]
    fn test_empty_input() {
        let err = ModuleParser::from_json("   ").unwrap_err();
        assert!(err.to_string().contains("input string is empty"));
    }

    #[test]
    fn test_malformed_json_reports_position() {
        let err = ModuleParser::from_json(r#"{"module": "user", "schema": }"#).unwrap_err();
        match err {
            DocumentError::Syntax { line, column, .. } => {
                assert_eq!(line, 1);
                assert!(column > 0);
            }
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_wrong_shape_is_data_error() {
        let err = ModuleParser::from_json(r#"{"module": 42}"#).unwrap_err();
        assert!(matches!(err, DocumentError::Data { .. }));
    }

    #[test]
    fn test_json_round_trip_preserves_module() {
        let module = Module::new("tag").with_field("label", Field::new(FieldType::String).required());
        let json = ModuleParser::to_json(&module).unwrap();
        assert!(json.contains("\"module\": \"tag\""));
        assert_eq!(ModuleParser::from_json(&json).unwrap(), module);
    }

    #[test]
    fn test_load_and_validate_rejects_invalid_module() {
        let err = ModuleParser::load_and_validate_json(r#"{"module": "", "schema": {}}"#).unwrap_err();
        match err {
            DocumentError::Invalid(errors) => assert_eq!(errors.len(), 2),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[cfg(feature = "yaml-support")]
    #[test]
    fn test_parse_yaml_module() {
        let yaml = r#"
module: order
schema:
  total:
    type: float
  tags:
    type: strings
actions:
  cancel:
    set:
      total: 0
    confirm: true
channels:
  cli:
    enabled: true
    command: orders
"#;
        let module = ModuleParser::load_and_validate_yaml(yaml).unwrap();
        assert_eq!(module.get_field("tags").unwrap().field_type(), Some(FieldType::Strings));
        assert!(module.get_action("cancel").unwrap().confirm);
        assert_eq!(module.channels.cli.command.as_deref(), Some("orders"));
    }

    #[test]
    fn test_format_detection() {
        assert_eq!(DocumentFormat::from_path("a.yaml"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path("a.yml"), DocumentFormat::Yaml);
        assert_eq!(DocumentFormat::from_path("a.json"), DocumentFormat::Json);
        assert_eq!(DocumentFormat::from_path("a.module"), DocumentFormat::Json);
    }
}
