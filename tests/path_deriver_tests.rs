use rust_module_registry::*;
use test_utils::*;

/// Path Deriver Tests
/// Claim expansion per transport, determinism and endpoint modes

fn keys(claims: &[PathClaim]) -> Vec<String> {
    claims.iter().map(PathClaim::key).collect()
}

#[test]
fn test_reference_user_module_claims() {
    let claims = extract_paths(&user_module(), "users");
    assert_eq!(
        keys(&claims),
        vec![
            "http:GET:/users",
            "http:POST:/users",
            "http:GET:/users/{id}",
            "http:PATCH:/users/{id}",
            "http:DELETE:/users/{id}",
        ]
    );
    let actions: Vec<&str> = claims.iter().map(|c| c.action.as_str()).collect();
    assert_eq!(actions, vec!["list", "create", "get", "update", "delete"]);
    assert!(claims.iter().all(|c| c.module == "user" && c.priority.is_none()));
}

#[test]
fn test_derivation_is_deterministic() {
    let module = all_channels_module("ticket");
    let first = extract_paths(&module, "tickets");
    let second = extract_paths(&module, "tickets");
    assert_eq!(first, second);
}

#[test]
fn test_every_transport() {
    let claims = extract_paths(&all_channels_module("ticket"), "tickets");

    let count = |path_type: PathType| claims.iter().filter(|c| c.path_type == path_type).count();
    assert_eq!(count(PathType::Http), 6);
    assert_eq!(count(PathType::Cli), 6);
    assert_eq!(count(PathType::WebSocket), 1);
    assert_eq!(count(PathType::Webhook), 1);
    assert_eq!(count(PathType::Grpc), 6);

    let keys = keys(&claims);
    assert!(keys.contains(&"http:POST:/tickets/{id}/close".to_string()));
    assert!(keys.contains(&"cli:tickets close".to_string()));
    assert!(keys.contains(&"ws:/ws/tickets".to_string()));
    assert!(keys.contains(&"webhook:/webhooks/ticket".to_string()));
    assert!(keys.contains(&"grpc:/TicketService/Close".to_string()));
}

#[test]
fn test_plural_argument_drives_defaults() {
    let module = Module::new("person")
        .with_field("name", Field::new(FieldType::String))
        .with_channels(
            Channels::new()
                .with_http(HttpChannel::enabled())
                .with_cli(CliChannel::enabled())
                .with_websocket(WebSocketChannel::enabled()),
        );
    let keys = keys(&extract_paths(&module, "people"));
    assert_eq!(keys[0], "http:GET:/people");
    assert!(keys.contains(&"cli:people list".to_string()));
    assert!(keys.contains(&"ws:/ws/people".to_string()));
}

#[test]
fn test_configured_addresses_override_defaults() {
    let module = Module::new("invoice")
        .with_field("amount", Field::new(FieldType::Float))
        .with_channels(
            Channels::new()
                .with_http(HttpChannel::enabled().with_base_path("/billing/invoices/"))
                .with_cli(CliChannel::enabled().with_command("inv"))
                .with_websocket(WebSocketChannel::enabled().at("/live/invoices"))
                .with_webhook(WebhookChannel::enabled().at("/hooks/stripe"))
                .with_grpc(GrpcChannel::enabled().with_service("Billing").with_package("acme")),
        );
    let keys = keys(&extract_paths(&module, "invoices"));
    assert_eq!(keys[0], "http:GET:/billing/invoices");
    assert_eq!(keys[2], "http:GET:/billing/invoices/{id}");
    assert!(keys.contains(&"cli:inv delete".to_string()));
    assert!(keys.contains(&"ws:/live/invoices".to_string()));
    assert!(keys.contains(&"webhook:/hooks/stripe".to_string()));
    assert!(keys.contains(&"grpc:/acme.Billing/Get".to_string()));
}

#[test]
fn test_explicit_endpoint_parameter_syntax_is_canonical() {
    let module = user_module().with_channels(Channels::new().with_http(
        HttpChannel::enabled().with_endpoint("post", "/users/:id/avatar/", "update"),
    ));
    let claims = extract_paths(&module, "users");
    assert_eq!(claims.last().unwrap().key(), "http:POST:/users/{id}/avatar");
}

#[test]
fn test_replace_mode_only_when_endpoints_configured() {
    let deriver = PathDeriver::new(ExplicitEndpointMode::ReplaceImplicit);
    assert_eq!(deriver.extract_paths(&user_module(), "users").len(), 5);

    let module = user_module().with_channels(Channels::new().with_http(
        HttpChannel::enabled()
            .with_endpoint("GET", "/people", "list")
            .with_endpoint("GET", "/people/{id}", "get"),
    ));
    assert_eq!(
        keys(&deriver.extract_paths(&module, "users")),
        vec!["http:GET:/people", "http:GET:/people/{id}"]
    );
}

#[test]
fn test_tty_shares_cli_addressing_and_claims_nothing() {
    let module = user_module().with_channels(Channels::new().with_tty(TtyChannel { enabled: true }));
    assert!(extract_paths(&module, "users").is_empty());
}
