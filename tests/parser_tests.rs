use rust_module_registry::*;
use test_utils::*;

/// Document Parser Tests
/// JSON/YAML loading, positioned errors, file and directory loading

#[test]
fn test_parse_reference_json() {
    init_logging();
    let module = ModuleParser::from_json(USER_JSON).unwrap();
    assert_eq!(module.name, "user");
    assert_eq!(module.meta.description.as_deref(), Some("Accounts"));
    assert_eq!(module.schema.len(), 3);

    let ban = module.get_action("ban").unwrap();
    assert!(ban.confirm);
    assert_eq!(ban.set.get("status"), Some(&json!("banned")));
    let reason = ban.inputs.get("reason").unwrap();
    assert!(reason.required);
    assert_eq!(reason.prompt.as_deref(), Some("Why?"));

    let name = module.get_field("name").unwrap();
    assert_eq!(name.constraints[0].kind(), Some(ConstraintKind::MaxLength));
}

#[cfg(feature = "yaml-support")]
#[test]
fn test_parse_reference_yaml() {
    init_logging();
    let module = ModuleParser::load_and_validate_yaml(ORDER_YAML).unwrap();
    assert_eq!(module.name, "order");
    assert_eq!(module.meta.dependencies, vec!["user"]);
    assert_eq!(module.get_field("owner").unwrap().to.as_deref(), Some("user"));
    assert!(module.channels.websocket.enabled);
    assert_eq!(module.channels.http.base_path.as_deref(), Some("/shop/orders"));
}

#[cfg(feature = "yaml-support")]
#[test]
fn test_yaml_round_trip() {
    let module = ModuleParser::from_json(USER_JSON).unwrap();
    let yaml = ModuleParser::to_yaml(&module).unwrap();
    assert_eq!(ModuleParser::from_yaml(&yaml).unwrap(), module);
}

#[test]
fn test_built_action_survives_json() {
    let module = Module::new("user")
        .with_field("email", Field::new(FieldType::Email))
        .with_field("status", Field::new(FieldType::String).with_default(json!("active")))
        .with_field("password_hash", Field::new(FieldType::String).internal())
        .with_action(
            "ban",
            Action::new()
                .with_auth("admin")
                .requiring_confirmation()
                .with_hooks(Some("audit_before".to_string()), None)
                .with_set("status", json!("banned"))
                .with_input(
                    "reason",
                    ActionInput::new(FieldType::String).required().with_prompt("Why?"),
                ),
        );

    let json = ModuleParser::to_json(&module).unwrap();
    assert!(!json.contains("\"after\""));
    let parsed = ModuleParser::load_and_validate_json(&json).unwrap();
    assert_eq!(parsed, module);

    let ban = parsed.get_action("ban").unwrap();
    assert_eq!(ban.auth.as_deref(), Some("admin"));
    assert!(ban.confirm);
    assert_eq!(ban.before.as_deref(), Some("audit_before"));
    assert!(ban.after.is_none());
    assert_eq!(ban.inputs["reason"].prompt.as_deref(), Some("Why?"));

    assert_eq!(parsed.exposed_fields(), vec!["email", "status"]);
    assert!(parsed.get_field("status").unwrap().has_default());
    assert!(!parsed.get_field("email").unwrap().has_default());
}

#[test]
fn test_capability_declaration_parses() {
    let module = ModuleParser::load_and_validate_json(r#"{"capability": "payment"}"#).unwrap();
    assert!(module.is_capability());
    assert!(module.name.is_empty());
    assert_eq!(module.display_name(), "payment");
}

#[test]
fn test_parse_errors_are_reported_with_context() {
    init_logging();

    let err = ModuleParser::from_json("").unwrap_err();
    assert!(err.to_string().contains("input string is empty"));
    assert_eq!(err.code(), ErrorCode::ParseError);

    let err = ModuleParser::from_json_with_context(r#"{"module": "user",,}"#, Some("user.json")).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("JSON parsing error (file: user.json)"), "{}", message);
    assert!(message.contains("line 1"), "{}", message);

    let err = ModuleParser::from_json(r#"{"module": "user", "schema": []}"#).unwrap_err();
    assert!(err.to_string().contains("Invalid data structure"));
}

#[test]
fn test_load_and_validate_surfaces_validation_errors() {
    let err = ModuleParser::load_and_validate_json(r#"{"module": "", "schema": {}}"#).unwrap_err();
    assert_eq!(err.code(), ErrorCode::ValidationFailed);
    let message = err.to_string();
    assert!(message.contains("module name is required"));
    assert!(message.contains("at least one field"));
}

#[tokio::test]
async fn test_from_file_detects_format() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    let json_path = write_document(&dir, "user.json", USER_JSON);

    let module = ModuleParser::from_file(&path_str(&json_path)).await.unwrap();
    assert_eq!(module.name, "user");

    #[cfg(feature = "yaml-support")]
    {
        let yaml_path = write_document(&dir, "order.yml", ORDER_YAML);
        let module = ModuleParser::load_and_validate(&path_str(&yaml_path)).await.unwrap();
        assert_eq!(module.name, "order");
    }
}

#[tokio::test]
async fn test_missing_file_is_io_error() {
    let err = ModuleParser::from_file("/nonexistent/dir/user.json").await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::IoError);
    assert!(err.to_string().contains("/nonexistent/dir/user.json"));

    let err = ModuleParser::from_file("  ").await.unwrap_err();
    assert!(matches!(err, DocumentError::Io { .. }));
}

#[tokio::test]
async fn test_to_file_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = path_str(&dir.path().join("user.json"));

    let module = user_module();
    ModuleParser::to_file(&module, &path).await.unwrap();
    let loaded = ModuleParser::load_and_validate(&path).await.unwrap();
    assert_eq!(loaded, module);
}

#[tokio::test]
async fn test_load_directory_in_name_order() {
    let dir = tempfile::tempdir().unwrap();
    write_document(&dir, "b_user.json", USER_JSON);
    write_document(&dir, "a_tag.json", r#"{"module": "tag", "schema": {"label": {"type": "string"}}}"#);
    write_document(&dir, "notes.txt", "not a declaration");

    let modules = ModuleParser::load_directory(&dir.path().to_string_lossy()).await.unwrap();
    let names: Vec<&str> = modules.iter().map(|(_, m)| m.name.as_str()).collect();
    assert_eq!(names, vec!["tag", "user"]);
}

#[tokio::test]
async fn test_parse_multiple_files_stops_at_first_failure() {
    let dir = tempfile::tempdir().unwrap();
    let good = path_str(&write_document(&dir, "user.json", USER_JSON));
    let bad = path_str(&write_document(&dir, "broken.json", "{"));

    let modules = ModuleParser::parse_multiple_files(&[good.clone()]).await.unwrap();
    assert_eq!(modules.len(), 1);

    let err = ModuleParser::parse_multiple_files(&[good, bad]).await.unwrap_err();
    assert_eq!(err.code(), ErrorCode::ParseError);
}

#[test]
fn test_blocking_load_from_sync_context() {
    let dir = tempfile::tempdir().unwrap();
    let path = path_str(&write_document(&dir, "user.json", USER_JSON));
    let module = tokio_test::block_on(ModuleParser::from_file(&path)).unwrap();
    assert!(module.has_action("ban"));
}
