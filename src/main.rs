use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use mainflux_sdk::config::Config;
use mainflux_sdk::resource::{all_operations, get_operation, get_resource, lookup};
use mainflux_sdk::{AuthScheme, Client, Error, Invocation, Outcome, BOOTSTRAP_SERVICE, THINGS_SERVICE};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use url::Url;

/// Command line client for the Mainflux management APIs
#[derive(Parser, Debug)]
#[command(name = "mfx", version, about, long_about = None)]
struct Args {
    /// Base URL for every service without an override
    #[arg(long, env = "MF_BASE_URL", global = true)]
    base_url: Option<String>,

    /// Base URL of the bootstrap service
    #[arg(long, env = "MF_BOOTSTRAP_URL", global = true)]
    bootstrap_url: Option<String>,

    /// Base URL of the things service
    #[arg(long, env = "MF_THINGS_URL", global = true)]
    things_url: Option<String>,

    /// User access token
    #[arg(long, env = "MF_TOKEN", global = true, hide_env_values = true)]
    token: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off", global = true)]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List the operations in the catalog
    Operations {
        /// Only list this resource
        resource: Option<String>,
    },

    /// Validate and send one operation
    Call {
        resource: String,
        operation: String,

        /// Path parameter, as name=value
        #[arg(short = 'p', long = "param", value_parser = parse_key_val)]
        params: Vec<(String, String)>,

        /// Query parameter, as name=value (repeat a name to send a list)
        #[arg(short = 'q', long = "query", value_parser = parse_key_val)]
        query: Vec<(String, String)>,

        /// JSON body, or @path to read it from a file
        #[arg(long)]
        body: Option<String>,

        /// Device external key, for operations using the Thing scheme
        #[arg(long)]
        secret: Option<String>,

        /// Print the request instead of sending it
        #[arg(long)]
        dry_run: bool,
    },

    /// Show the message a status code resolves to for an operation
    Diagnose {
        resource: String,
        operation: String,
        status: u16,
    },

    /// Inspect or change the stored configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Print the stored configuration
    Show,
    /// Store a base URL, for every service or for one
    SetUrl {
        url: String,
        /// `bootstrap` or `things`
        #[arg(long)]
        service: Option<String>,
    },
    /// Store an access token
    SetToken { token: String },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn as_directive(self) -> Option<&'static str> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some("error"),
            LogLevel::Warn => Some("warn"),
            LogLevel::Info => Some("info"),
            LogLevel::Debug => Some("debug"),
            LogLevel::Trace => Some("trace"),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(directive) = level.as_directive() else {
        return Ok(None);
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directive));

    let Some(log_path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(true)
            .init();
        return Ok(None);
    };

    if let Some(parent) = log_path.parent() {
        std::fs::create_dir_all(parent).ok();
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("mfx started with log level: {:?}", level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn parse_key_val(s: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected name=value, got '{}'", s))?;
    Ok((key.to_string(), value.to_string()))
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let args = Args::parse();

    let _log_guard = setup_logging(args.log_level, args.log_file.as_deref())?;

    let config_path = args.config.clone().or_else(Config::default_path);
    let config = config_path
        .as_deref()
        .map(Config::load_from)
        .unwrap_or_default();

    match &args.command {
        Command::Operations { resource } => {
            if let Some(key) = resource {
                if get_resource(key).is_none() {
                    bail!("Unknown resource: {}", key);
                }
            }

            let mut current: Option<&str> = None;
            for op in all_operations() {
                if resource.as_deref().is_some_and(|key| key != op.resource) {
                    continue;
                }
                if current != Some(op.resource) {
                    println!("{} ({})", op.resource_def.display_name, op.resource);
                    current = Some(op.resource);
                }
                println!(
                    "  {:<14} {:<6} {:<32} {}",
                    op.name,
                    op.def.method,
                    op.def.path,
                    op.auth()
                );
            }
            Ok(ExitCode::SUCCESS)
        },
        Command::Diagnose {
            resource,
            operation,
            status,
        } => {
            println!("{}", lookup(resource, operation, *status));
            Ok(ExitCode::SUCCESS)
        },
        Command::Config { action } => {
            let Some(path) = config_path else {
                bail!("No config directory available; pass --config");
            };
            run_config(action, config, &path)
        },
        Command::Call {
            resource,
            operation,
            params,
            query,
            body,
            secret,
            dry_run,
        } => {
            let client = build_client(&args, &config)?;
            let scheme = get_operation(resource, operation)
                .map(|op| op.auth())
                .unwrap_or_default();

            let credential = match scheme {
                AuthScheme::Thing => secret.clone(),
                AuthScheme::Bearer => config.effective_token(args.token.as_deref()),
            };

            let mut invocation = Invocation::new();
            for (name, value) in params {
                invocation = invocation.with_path(name, value.as_str());
            }
            if !query.is_empty() {
                invocation = invocation.with_query(query_object(query));
            }
            if let Some(body) = body {
                invocation = invocation.with_body(read_body(body)?);
            }
            if let Some(credential) = credential {
                invocation = invocation.with_credential(credential);
            }

            if *dry_run {
                let (_, request) = client.prepare(resource, operation, &invocation)?;
                println!("{} {}", request.method, request.url);
                for (name, value) in request.headers.iter() {
                    let shown = if value.is_sensitive() {
                        "<redacted>"
                    } else {
                        value.to_str().unwrap_or("<binary>")
                    };
                    println!("{}: {}", name, shown);
                }
                if let Some(body) = &request.body {
                    println!();
                    println!("{}", body);
                }
                return Ok(ExitCode::SUCCESS);
            }

            match client.invoke(resource, operation, &invocation).await {
                Ok(Outcome::Payload(value)) => {
                    println!("{}", serde_json::to_string_pretty(&value)?);
                    Ok(ExitCode::SUCCESS)
                },
                Ok(Outcome::Confirmation(msg)) => {
                    println!("{}", msg);
                    Ok(ExitCode::SUCCESS)
                },
                Err(err @ Error::Remote { .. }) => {
                    eprintln!("{}", err);
                    Ok(ExitCode::FAILURE)
                },
                Err(err) => Err(err.into()),
            }
        },
    }
}

fn build_client(args: &Args, config: &Config) -> Result<Client> {
    let base_url = config.effective_base_url(args.base_url.as_deref());
    let base_url = Url::parse(&base_url).with_context(|| format!("Invalid base URL: {}", base_url))?;

    let mut client = Client::new(base_url).context("Failed to create client")?;

    if let Some(url) = config.effective_bootstrap_url(args.bootstrap_url.as_deref()) {
        let url = Url::parse(&url).with_context(|| format!("Invalid bootstrap URL: {}", url))?;
        client = client.with_service_url(BOOTSTRAP_SERVICE, url);
    }
    if let Some(url) = config.effective_things_url(args.things_url.as_deref()) {
        let url = Url::parse(&url).with_context(|| format!("Invalid things URL: {}", url))?;
        client = client.with_service_url(THINGS_SERVICE, url);
    }

    Ok(client)
}

fn run_config(action: &ConfigAction, mut config: Config, path: &Path) -> Result<ExitCode> {
    match action {
        ConfigAction::Show => {
            let mut shown = config.clone();
            if shown.token.is_some() {
                shown.token = Some("<redacted>".to_string());
            }
            print!("{}", serde_yaml::to_string(&shown)?);
            return Ok(ExitCode::SUCCESS);
        },
        ConfigAction::SetUrl { url, service } => {
            Url::parse(url).with_context(|| format!("Invalid URL: {}", url))?;
            match service.as_deref() {
                None => config.base_url = Some(url.clone()),
                Some(BOOTSTRAP_SERVICE) => config.bootstrap_url = Some(url.clone()),
                Some(THINGS_SERVICE) => config.things_url = Some(url.clone()),
                Some(other) => bail!("Unknown service: {}", other),
            }
        },
        ConfigAction::SetToken { token } => config.token = Some(token.clone()),
    }

    config.save_to(path)?;
    println!("Saved {}", path.display());
    Ok(ExitCode::SUCCESS)
}

/// Query pairs as a JSON object; repeated names become arrays
fn query_object(pairs: &[(String, String)]) -> Value {
    let mut map = Map::new();
    for (key, value) in pairs {
        match map.get_mut(key) {
            Some(Value::Array(items)) => items.push(Value::String(value.clone())),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, Value::String(value.clone())]);
            },
            None => {
                map.insert(key.clone(), Value::String(value.clone()));
            },
        }
    }
    Value::Object(map)
}

fn read_body(arg: &str) -> Result<Value> {
    let text = match arg.strip_prefix('@') {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path))?,
        None => arg.to_string(),
    };
    serde_json::from_str(&text).context("Body is not valid JSON")
}
