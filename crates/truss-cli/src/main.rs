mod logging;

use std::io::Read;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::Serialize;
use truss_core::{check_references, normalize, BackendKind, Config, StructuralMesh};
use truss_llm::{build_prompt, extract, FailureCategory, LLMError, TrussPipeline};

use logging::init_logging;

#[derive(Parser)]
#[command(name = "truss")]
#[command(about = "Turn natural-language truss descriptions into structural models")]
#[command(version)]
struct Cli {
    /// Config file (JSON or TOML). Defaults to ~/.truss/config.json, then ./truss.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Generation backend: generate | chat
    #[arg(long, global = true)]
    backend: Option<BackendKind>,

    /// Generation service base address
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// Model identifier
    #[arg(long, global = true)]
    model: Option<String>,

    /// Enable debug logging
    #[arg(long, short, global = true, default_value = "false")]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the instruction sent to the generation service
    Prompt {
        /// Truss description
        description: String,
    },
    /// Extract a canonical model through the generation service
    Parse {
        /// Truss description
        description: String,
        /// Synthesize geometry when the service is down or times out
        #[arg(long)]
        fallback: bool,
    },
    /// Build a planar truss from span/height cues without any service
    Synthesize {
        /// Truss description
        description: String,
        /// Emit the canonical id-based schema instead of positional geometry
        #[arg(long)]
        canonical: bool,
    },
    /// Extract and normalize a document from a file, or stdin with `-`
    Normalize {
        #[arg(default_value = "-")]
        input: String,
        /// Print the reference integrity report to stderr
        #[arg(long)]
        report: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match &cli.command {
        Commands::Prompt { description } => {
            println!("{}", build_prompt(description));
            Ok(())
        }
        Commands::Parse {
            description,
            fallback,
        } => {
            let config = load_config(&cli)?;
            let pipeline = TrussPipeline::from_config(&config);
            let result = if *fallback {
                pipeline.parse_or_synthesize(description).await
            } else {
                pipeline.parse(description).await.map(StructuralMesh::Canonical)
            };

            match result {
                Ok(mesh) if mesh.is_positional() => {
                    eprintln!(
                        "{}",
                        "⚠️  Generation service unavailable, geometry was synthesized".yellow()
                    );
                    print_json(&mesh)
                }
                Ok(mesh) => print_json(&mesh.into_canonical()),
                Err(e) => exit_with(e),
            }
        }
        Commands::Synthesize {
            description,
            canonical,
        } => {
            let mesh = truss_core::synthesize(description);
            log::debug!(
                "Synthesized {} nodes and {} elements",
                mesh.nodes.len(),
                mesh.elements.len()
            );
            if *canonical {
                print_json(&mesh.to_truss_model())
            } else {
                print_json(&mesh)
            }
        }
        Commands::Normalize { input, report } => {
            let raw = read_input(input)?;
            let document = match extract(&raw) {
                Ok(document) => document,
                Err(e) => exit_with(e),
            };
            let model = normalize(&document);

            if *report {
                let integrity = check_references(&model);
                let summary = serde_json::to_string_pretty(&integrity)?;
                if integrity.is_clean() {
                    eprintln!("{}", "✅ No dangling references".green());
                } else {
                    eprintln!("{}", summary.yellow());
                }
            }
            print_json(&model)
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let config = match &cli.config {
        Some(path) => {
            let mut config = Config::from_file(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => Config::load()?,
    };
    Ok(apply_flags(cli, config))
}

/// Command-line flags win over files and environment.
fn apply_flags(cli: &Cli, mut config: Config) -> Config {
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if let Some(base_url) = &cli.base_url {
        config.base_url = base_url.clone();
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }

    log::debug!(
        "Config: backend={:?} base_url={} model={} attempts={} timeout={:?}",
        config.backend,
        config.base_url,
        config.model,
        config.max_attempts(),
        config.request_timeout()
    );
    config
}

fn read_input(input: &str) -> anyhow::Result<String> {
    if input == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        Ok(buf)
    } else {
        std::fs::read_to_string(input).with_context(|| format!("Failed to read {}", input))
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn exit_code(category: FailureCategory) -> i32 {
    match category {
        FailureCategory::InvalidRequest => 2,
        FailureCategory::ServiceDegraded => 3,
        FailureCategory::UpstreamTimeout => 4,
        FailureCategory::UnparseableResponse => 5,
        FailureCategory::Configuration => 6,
    }
}

fn exit_with(error: LLMError) -> ! {
    let category = error.category();
    eprintln!(
        "{}",
        format!("❌ {:?} ({}): {}", category, error.status_code(), error).red()
    );
    if let LLMError::UpstreamParse { raw } = &error {
        eprintln!("{}", "Raw response:".dimmed());
        eprintln!("{}", raw.dimmed());
    }
    std::process::exit(exit_code(category));
}
