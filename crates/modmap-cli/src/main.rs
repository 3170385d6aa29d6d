//! modmap - map repository modules to application registry entries
//!
//! ## Commands
//!
//! - `identify`: the single registry application that best represents a repository
//! - `map`: resolve every discovered module
//! - `discover`: list modules without contacting the registry

mod report;
mod settings;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use modmap_agent::{AgentRuntime, AnthropicClient, LlmConfig};
use modmap_core::{InvestigativeAgent, Pipeline, ResolverConfig};
use modmap_discovery::RepoDiscovery;
use modmap_registry::HttpRegistry;
use tracing::{info, Level};

use report::{IdentifyReport, MapReport, ModuleEntry};

#[derive(Parser)]
#[command(name = "modmap")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Map repository modules to application registry entries", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json: bool,

    /// TOML file overriding resolver settings
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Deterministic matching only; never invoke the agent
    #[arg(long, global = true)]
    no_agent: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identify the one application that best represents the repository
    Identify {
        /// Repository to scan (default: current directory)
        #[arg(default_value = ".")]
        repo: PathBuf,

        /// Minimum deterministic confidence (default: 0.7)
        #[arg(long)]
        threshold: Option<f64>,

        /// Write the JSON result to a file
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write CONTRAST_APP_ID=<id> to a file
        #[arg(long)]
        output_env: Option<PathBuf>,
    },

    /// Resolve every module in the repository
    Map {
        #[arg(default_value = ".")]
        repo: PathBuf,

        /// Minimum deterministic confidence (default: 0.5)
        #[arg(long)]
        threshold: Option<f64>,

        /// Maximum directory depth for discovery (default: 4)
        #[arg(long)]
        depth: Option<usize>,

        /// Write the JSON result to a file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List discovered modules
    Discover {
        #[arg(default_value = ".")]
        repo: PathBuf,

        /// Maximum directory depth (default: 4)
        #[arg(long)]
        depth: Option<usize>,
    },
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    modmap_core::init_tracing(cli.json, level);

    if let Err(err) = run(cli).await {
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config_path = cli.config.as_deref();
    match cli.command {
        Commands::Identify {
            repo,
            threshold,
            output,
            output_env,
        } => {
            let mut config = settings::load(ResolverConfig::single(), config_path)?;
            if let Some(t) = threshold {
                config.confidence_threshold = t;
            }
            cmd_identify(
                &repo,
                config,
                cli.no_agent,
                output.as_deref(),
                output_env.as_deref(),
            )
            .await
        }
        Commands::Map {
            repo,
            threshold,
            depth,
            output,
        } => {
            let mut config = settings::load(ResolverConfig::batch(), config_path)?;
            if let Some(t) = threshold {
                config.confidence_threshold = t;
            }
            if let Some(d) = depth {
                config.batch_depth = d;
            }
            cmd_map(&repo, config, cli.no_agent, output.as_deref()).await
        }
        Commands::Discover { repo, depth } => {
            let config = settings::load(ResolverConfig::batch(), config_path)?;
            cmd_discover(&repo, depth.unwrap_or(config.batch_depth))
        }
    }
}

fn canonical_repo(repo: &Path) -> Result<PathBuf> {
    repo.canonicalize()
        .with_context(|| format!("cannot read repository at {}", repo.display()))
}

/// Wire discovery, the HTTP registry and (unless disabled) the agent runtime.
fn build_pipeline(config: ResolverConfig, no_agent: bool) -> Result<Pipeline> {
    let registry = Arc::new(HttpRegistry::from_env().context("registry configuration error")?);
    let pipeline = Pipeline::new(
        Arc::new(RepoDiscovery::default()),
        registry.clone(),
        config,
    );
    if no_agent {
        info!("agent fallback disabled");
        return Ok(pipeline);
    }

    let llm = LlmConfig::from_env().context("LLM configuration error")?;
    let model = AnthropicClient::from_config(&llm, Some(registry.config()))
        .context("failed to set up model client")?;
    info!(provider = %llm.provider, model = %llm.model, "agent fallback enabled");
    let agent: Arc<dyn InvestigativeAgent> = Arc::new(AgentRuntime::new(Arc::new(model), registry));
    Ok(pipeline.with_agent(agent))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn cmd_identify(
    repo: &Path,
    config: ResolverConfig,
    no_agent: bool,
    output: Option<&Path>,
    output_env: Option<&Path>,
) -> Result<()> {
    let repo = canonical_repo(repo)?;
    let pipeline = build_pipeline(config, no_agent)?;
    let started = Instant::now();

    let hit = pipeline
        .identify(&repo)
        .await
        .context("identification failed")?;
    let summary = IdentifyReport::new(&repo, hit.as_ref(), started.elapsed().as_secs_f64() * 1000.0);
    print_json(&summary)?;

    if let Some(path) = output {
        report::write_json(path, &summary)?;
        eprintln!("Results written to {}", path.display());
    }
    if let Some(path) = output_env {
        report::write_env_file(path, summary.app_id.as_deref())?;
        eprintln!("Env written to {}", path.display());
    }
    if let (Some(app_id), Ok(github_env)) = (summary.app_id.as_deref(), std::env::var("GITHUB_ENV")) {
        if !github_env.is_empty() {
            report::append_env_file(Path::new(&github_env), app_id)?;
            eprintln!("Exported {} to $GITHUB_ENV", report::APP_ID_VAR);
        }
    }
    Ok(())
}

async fn cmd_map(
    repo: &Path,
    config: ResolverConfig,
    no_agent: bool,
    output: Option<&Path>,
) -> Result<()> {
    let repo = canonical_repo(repo)?;
    let pipeline = build_pipeline(config, no_agent)?;
    let started = Instant::now();

    let outcome = pipeline
        .map_modules(&repo)
        .await
        .context("module mapping failed")?;
    let summary = MapReport::new(&repo, &outcome, started.elapsed().as_secs_f64() * 1000.0);
    print_json(&summary)?;

    if let Some(path) = output {
        report::write_json(path, &summary)?;
        eprintln!("Results written to {}", path.display());
    }
    Ok(())
}

fn cmd_discover(repo: &Path, depth: usize) -> Result<()> {
    let repo = canonical_repo(repo)?;
    let modules = RepoDiscovery::default()
        .discover_modules(&repo, depth)
        .context("discovery failed")?;
    let entries: Vec<ModuleEntry> = modules.iter().map(ModuleEntry::from).collect();
    print_json(&entries)
}
