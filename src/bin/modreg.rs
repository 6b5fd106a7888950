use anyhow::{bail, Context, Result};
use clap::{Arg, ArgAction, ArgMatches, Command};
use rust_module_registry::{
    ExplicitEndpointMode, ModuleParser, ModuleRegistry, PathDeriver, PathType, RegistryConfig,
};
use serde_json::json;

fn files_arg() -> Arg {
    Arg::new("files")
        .value_name("FILE")
        .help("Module declaration files (.json, .yaml, .yml)")
        .num_args(1..)
        .required(true)
}

fn cli() -> Command {
    Command::new("modreg")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate module declarations and check their path claims for conflicts")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .global(true)
                .help("Registry configuration (JSON)"),
        )
        .arg(
            Arg::new("replace-implicit")
                .long("replace-implicit")
                .global(true)
                .help("Explicit HTTP endpoints replace the implicit CRUD routes")
                .action(ArgAction::SetTrue),
        )
        .subcommand(
            Command::new("validate")
                .about("Parse and validate declarations")
                .arg(files_arg()),
        )
        .subcommand(
            Command::new("paths")
                .about("Print the path claims each declaration derives")
                .arg(
                    Arg::new("json")
                        .long("json")
                        .help("Print claims as JSON")
                        .action(ArgAction::SetTrue),
                )
                .arg(files_arg()),
        )
        .subcommand(
            Command::new("check")
                .about("Register every declaration into one registry and report conflicts as JSON")
                .arg(files_arg()),
        )
        .subcommand(
            Command::new("lookup")
                .about("Resolve a request path against the registered declarations")
                .arg(
                    Arg::new("type")
                        .short('t')
                        .long("type")
                        .value_name("TYPE")
                        .help("Transport: http, cli, ws, webhook, grpc")
                        .default_value("http"),
                )
                .arg(
                    Arg::new("method")
                        .short('m')
                        .long("method")
                        .value_name("METHOD")
                        .help("HTTP method")
                        .default_value("GET"),
                )
                .arg(
                    Arg::new("path")
                        .short('p')
                        .long("path")
                        .value_name("PATH")
                        .help("Request path or CLI command")
                        .required(true),
                )
                .arg(files_arg()),
        )
}

fn files(matches: &ArgMatches) -> Vec<String> {
    matches
        .get_many::<String>("files")
        .map(|values| values.cloned().collect())
        .unwrap_or_default()
}

async fn load_config(matches: &ArgMatches) -> Result<RegistryConfig> {
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => {
            let content = tokio::fs::read_to_string(path)
                .await
                .with_context(|| format!("reading config {}", path))?;
            serde_json::from_str::<RegistryConfig>(&content)
                .with_context(|| format!("parsing config {}", path))?
        }
        None => RegistryConfig::default(),
    };

    if matches.get_flag("replace-implicit") {
        config.explicit_endpoints = ExplicitEndpointMode::ReplaceImplicit;
    }

    if let Err(e) = config.validate() {
        bail!("invalid registry configuration: {}", e);
    }
    Ok(config)
}

async fn validate(files: &[String]) -> Result<bool> {
    let mut ok = true;
    for path in files {
        match ModuleParser::load_and_validate(path).await {
            Ok(module) => println!("✓ {}: module '{}' is valid", path, module.display_name()),
            Err(e) => {
                ok = false;
                println!("✗ {}: {}", path, e);
            }
        }
    }
    Ok(ok)
}

async fn paths(files: &[String], config: &RegistryConfig, as_json: bool) -> Result<bool> {
    let deriver = PathDeriver::new(config.explicit_endpoints);
    let mut ok = true;
    let mut report = Vec::new();

    for path in files {
        let module = match ModuleParser::load_and_validate(path).await {
            Ok(module) => module,
            Err(e) => {
                ok = false;
                eprintln!("✗ {}: {}", path, e);
                continue;
            }
        };
        let claims = deriver.extract_paths(&module, &module.plural());

        if as_json {
            report.push(json!({ "file": path, "module": module.name, "claims": claims }));
        } else {
            println!("{} ({}):", module.name, path);
            for claim in &claims {
                println!("  {}", claim.key());
            }
        }
    }

    if as_json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    }
    Ok(ok)
}

async fn register_all(registry: &ModuleRegistry, files: &[String]) -> Vec<serde_json::Value> {
    let mut failures = Vec::new();
    for path in files {
        let module = match ModuleParser::load_and_validate(path).await {
            Ok(module) => module,
            Err(e) => {
                failures.push(json!({
                    "file": path,
                    "code": e.code().as_str(),
                    "error": e.to_string(),
                }));
                continue;
            }
        };

        if let Err(e) = registry.register(module) {
            failures.push(json!({
                "file": path,
                "code": e.code().as_str(),
                "error": e.to_string(),
                "conflicts": e.conflicts().unwrap_or_default(),
            }));
        }
    }
    failures
}

async fn check(files: &[String], config: RegistryConfig) -> Result<bool> {
    let registry = ModuleRegistry::with_config(config)?;
    let failures = register_all(&registry, files).await;

    let report = json!({
        "registered": registry.list(),
        "claims": registry.claim_count(),
        "failures": failures,
    });
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(failures.is_empty())
}

async fn lookup(matches: &ArgMatches, config: RegistryConfig) -> Result<bool> {
    let path_type: PathType = matches
        .get_one::<String>("type")
        .map(String::as_str)
        .unwrap_or("http")
        .parse()
        .map_err(anyhow::Error::msg)?;
    let method = matches.get_one::<String>("method").map(String::as_str).unwrap_or("GET");
    let Some(path) = matches.get_one::<String>("path") else {
        bail!("--path is required");
    };

    let registry = ModuleRegistry::with_config(config)?;
    for failure in register_all(&registry, &files(matches)).await {
        eprintln!("warning: {}", failure["error"].as_str().unwrap_or_default());
    }

    match registry.lookup_path(path_type, method, path) {
        Some(found) => {
            println!("{}", serde_json::to_string_pretty(&found)?);
            Ok(true)
        }
        None => {
            println!("no {} claim matches {}", path_type, path);
            Ok(false)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let matches = cli().get_matches();
    let config = load_config(&matches).await?;

    let ok = match matches.subcommand() {
        Some(("validate", sub)) => validate(&files(sub)).await?,
        Some(("paths", sub)) => paths(&files(sub), &config, sub.get_flag("json")).await?,
        Some(("check", sub)) => check(&files(sub), config).await?,
        Some(("lookup", sub)) => lookup(sub, config).await?,
        _ => bail!("unknown subcommand"),
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
