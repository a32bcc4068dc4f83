use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use nri_hook_injector::config::LogFormat;
use nri_hook_injector::injector::ObjectMeta;
use nri_hook_injector::observability::create_observer;
use nri_hook_injector::plugin::stdio;
use nri_hook_injector::{
    ContainerCreationContext, ContainerPlugin, HookInjector, HookInjectorPlugin, InjectorConfig,
};
use oci_hooks::Spec;

#[derive(Parser)]
#[command(
    name = "nri-hook-injector",
    version,
    about = "Inject OCI hooks from hooks.d directories into containers at creation"
)]
struct Cli {
    /// Environment file to load before reading configuration.
    #[arg(long, global = true, env = "HOOK_INJECTOR_ENV_FILE")]
    env_file: Option<PathBuf>,

    /// Hook directory; repeat for several, lowest precedence first.
    #[arg(long = "hooks-dir", global = true)]
    hooks_dirs: Vec<PathBuf>,

    /// Plugin name to register with.
    #[arg(long, global = true)]
    name: Option<String>,

    /// Plugin index to register with (two digits).
    #[arg(long, global = true)]
    idx: Option<String>,

    /// Dump every request at debug level.
    #[arg(long, short, global = true)]
    verbose: bool,

    /// Do not rescan hook directories when they change.
    #[arg(long, global = true)]
    no_rescan: bool,

    /// Log output format (text or json).
    #[arg(long, global = true)]
    log_format: Option<LogFormat>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Answer container creation requests on stdin/stdout (default).
    Serve,

    /// List the hook definitions currently in effect.
    List,

    /// Show the hooks that would be injected for an OCI config.json.
    Check {
        /// Path to the container's config.json.
        #[arg(long)]
        spec: PathBuf,

        /// Extra annotation as key=value; may be repeated.
        #[arg(long = "annotation", value_parser = parse_annotation)]
        annotations: Vec<(String, String)>,
    },
}

fn parse_annotation(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got {raw:?}")),
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<InjectorConfig> {
    match &cli.env_file {
        Some(path) => {
            dotenvy::from_path(path)
                .with_context(|| format!("failed to load {}", path.display()))?;
        }
        None => {
            dotenvy::dotenv().ok();
        }
    }

    let mut config = InjectorConfig::resolve()?;

    // CLI flags take precedence over the environment.
    if !cli.hooks_dirs.is_empty() {
        config.hook_dirs = cli.hooks_dirs.clone();
    }
    if let Some(name) = &cli.name {
        config.plugin_name = name.clone();
    }
    if let Some(idx) = &cli.idx {
        config.plugin_index = idx.clone();
    }
    if cli.verbose {
        config.verbose = true;
    }
    if cli.no_rescan {
        config.rescan = false;
    }
    if let Some(format) = cli.log_format {
        config.log_format = format;
    }
    Ok(config)
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("nri_hook_injector=info,oci_hooks=info"));

    // stdout carries the transport, so logs go to stderr.
    let registry = tracing_subscriber::registry().with(filter);
    match format {
        LogFormat::Text => registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
        LogFormat::Json => registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_tracing(config.log_format);

    let catalog = Arc::new(config.load_catalog().context("failed to set up hook manager")?);
    tracing::info!(
        dirs = ?catalog.dirs(),
        hooks = catalog.len(),
        rescan = config.rescan,
        "Hook catalog loaded"
    );

    let observer = create_observer(&config.observer);
    let injector = HookInjector::new(catalog.clone(), observer.clone());

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let plugin = HookInjectorPlugin::new(config.plugin_id(), injector, config.verbose);
            let stdin = BufReader::new(tokio::io::stdin());
            let stdout = tokio::io::stdout();

            tokio::select! {
                result = stdio::serve(&plugin, stdin, stdout) => {
                    result.with_context(|| format!("plugin {} exited with error", plugin.name()))?;
                }
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupted, shutting down");
                }
            }
        }
        Commands::List => {
            let definitions = catalog.definitions();
            if definitions.is_empty() {
                println!("No hooks configured in {:?}", catalog.dirs());
            }
            for definition in definitions {
                let stages: Vec<&str> = definition.stages().iter().map(|s| s.as_str()).collect();
                println!(
                    "{:<30} {:<40} {:<30} when {}",
                    definition.name(),
                    definition.hook().path,
                    stages.join(","),
                    definition.trigger()
                );
            }
        }
        Commands::Check { spec, annotations } => {
            let raw = std::fs::read(&spec)
                .with_context(|| format!("failed to read {}", spec.display()))?;
            let mut oci_spec: Spec = serde_json::from_slice(&raw)
                .with_context(|| format!("failed to parse {}", spec.display()))?;
            oci_spec.annotations.extend(annotations);

            let no_annotations = BTreeMap::new();
            let ctx = ContainerCreationContext {
                pod: None,
                container: ObjectMeta {
                    name: "check",
                    annotations: &no_annotations,
                },
                spec: &oci_spec,
            };
            match injector.inject(&ctx)? {
                Some(adjustment) => {
                    println!("{}", serde_json::to_string_pretty(adjustment.hooks())?)
                }
                None => println!("No hooks apply"),
            }
        }
    }

    observer.flush();
    Ok(())
}
