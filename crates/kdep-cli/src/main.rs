//! CLI binary for kdep: find which Kustomize overlays a change affects.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kdep_core::config::{KdepConfig, OutputFormat};
use kdep_core::diff::{DiffOptions, DiffResult, UnifiedDiffer, diff_trees};
use kdep_core::discover::{DiscoveryFilter, list_unit_dirs};
use kdep_core::graph::RefGraph;
use kdep_core::paths::tree_node_id;
use kdep_core::resolve::resolve_changes_in;
use std::io::BufRead;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "kdep", version, about = "Kustomize change-impact resolver")]
struct Cli {
    /// Root of the Kustomize tree (defaults to current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Output format: text, json (overrides config)
    #[arg(short, long, global = true)]
    format: Option<OutputFormat>,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the root overlays affected by changed files
    Parents {
        /// Changed files, relative to the root
        files: Vec<String>,

        /// Also read newline-separated changed files from stdin
        #[arg(long)]
        stdin: bool,
    },

    /// Dump the reference graph
    Graph {
        /// Show referrers (node -> units referencing it) instead of references
        #[arg(long)]
        reverse: bool,
    },

    /// List directories containing a kustomization
    List {
        /// Regex a directory path must match
        #[arg(long)]
        include: Option<String>,

        /// Regex a directory path must not match
        #[arg(long)]
        exclude: Option<String>,
    },

    /// Render and diff every overlay between two checkouts
    Diff {
        /// Checkout before the change
        base: PathBuf,

        /// Checkout after the change
        target: PathBuf,

        /// Regex a directory path must match
        #[arg(long)]
        include: Option<String>,

        /// Regex a directory path must not match
        #[arg(long)]
        exclude: Option<String>,

        /// Build executable to run (default: kustomize)
        #[arg(long)]
        kustomize_path: Option<String>,
    },
}

fn get_root(cli: &Cli) -> Result<PathBuf> {
    match &cli.root {
        Some(p) => Ok(p.clone()),
        None => std::env::current_dir().context("failed to get current directory"),
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let root = get_root(&cli)?;
    let mut config = KdepConfig::load(&root)?;
    if let Some(format) = cli.format {
        config.output.format = format;
    }

    match cli.command {
        Commands::Parents { files, stdin } => cmd_parents(&root, &config, files, stdin),
        Commands::Graph { reverse } => cmd_graph(&root, &config, reverse),
        Commands::List { include, exclude } => cmd_list(&root, &config, include, exclude),
        Commands::Diff {
            base,
            target,
            include,
            exclude,
            kustomize_path,
        } => cmd_diff(&config, &base, &target, include, exclude, kustomize_path),
    }
}

/// CLI patterns win over config patterns, per side.
fn discovery_filter(
    config: &KdepConfig,
    include: Option<String>,
    exclude: Option<String>,
) -> Result<DiscoveryFilter> {
    let include = include.or_else(|| config.discovery.include.clone());
    let exclude = exclude.or_else(|| config.discovery.exclude.clone());
    Ok(DiscoveryFilter::from_patterns(
        include.as_deref(),
        exclude.as_deref(),
    )?)
}

fn print_json(value: &impl serde::Serialize) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn cmd_parents(root: &Path, config: &KdepConfig, mut files: Vec<String>, stdin: bool) -> Result<()> {
    if stdin {
        for line in std::io::stdin().lock().lines() {
            let line = line.context("failed to read changed files from stdin")?;
            let line = line.trim();
            if !line.is_empty() {
                files.push(line.to_string());
            }
        }
    }
    if files.is_empty() {
        anyhow::bail!("no changed files given. Pass paths as arguments or use --stdin.");
    }

    let files = files
        .iter()
        .map(|file| tree_node_id(root, file))
        .collect::<kdep_core::Result<Vec<_>>>()?;

    let graph = RefGraph::build(root)
        .with_context(|| format!("failed to build reference graph for {}", root.display()))?;
    tracing::info!(
        units = graph.unit_count(),
        edges = graph.edge_count(),
        "reference graph built"
    );
    let report = resolve_changes_in(&graph, &files)?;

    match config.output.format {
        OutputFormat::Json => print_json(&report)?,
        OutputFormat::Text => {
            for unit in &report.roots {
                println!("{}", unit);
            }
        }
    }
    Ok(())
}

fn cmd_graph(root: &Path, config: &KdepConfig, reverse: bool) -> Result<()> {
    let graph = RefGraph::build(root)
        .with_context(|| format!("failed to build reference graph for {}", root.display()))?;
    let edges = if reverse { &graph.reverse } else { &graph.forward };

    match config.output.format {
        OutputFormat::Json => print_json(edges)?,
        OutputFormat::Text => {
            let arrow = if reverse { "<-" } else { "->" };
            for (node, neighbors) in edges {
                println!("{}", node);
                for n in neighbors {
                    println!("  {} {}", arrow, n);
                }
            }
            eprintln!(
                "\n{} units, {} references, {} roots",
                graph.unit_count(),
                graph.edge_count(),
                graph.root_units().len()
            );
        }
    }
    Ok(())
}

fn cmd_list(
    root: &Path,
    config: &KdepConfig,
    include: Option<String>,
    exclude: Option<String>,
) -> Result<()> {
    let filter = discovery_filter(config, include, exclude)?;
    let dirs = list_unit_dirs(root, &filter)?;

    match config.output.format {
        OutputFormat::Json => print_json(&dirs)?,
        OutputFormat::Text => {
            for dir in &dirs {
                println!("{}", dir);
            }
        }
    }
    Ok(())
}

fn cmd_diff(
    config: &KdepConfig,
    base: &Path,
    target: &Path,
    include: Option<String>,
    exclude: Option<String>,
    kustomize_path: Option<String>,
) -> Result<()> {
    let opts = DiffOptions {
        filter: discovery_filter(config, include, exclude)?,
    };
    let mut renderer = config.render.renderer();
    if let Some(path) = kustomize_path {
        renderer.executable = path;
    }

    let map = diff_trees(base, target, &opts, &renderer, &UnifiedDiffer::default())?;

    match config.output.format {
        OutputFormat::Json => print_json(&map)?,
        OutputFormat::Text => {
            for (dir, result) in &map.results {
                match result {
                    DiffResult::Unchanged => {}
                    DiffResult::Changed { diff } => {
                        println!("=== {} ===", dir);
                        print!("{}", diff);
                    }
                    DiffResult::Failed { message, .. } => {
                        eprintln!("error: {}: {}", dir, message);
                    }
                }
            }
            eprintln!(
                "{} directories compared, {} changed, {} failed",
                map.results.len(),
                map.changed_dirs().len(),
                map.failed_dirs().len()
            );
        }
    }

    let failed = map.failed_dirs();
    if !failed.is_empty() {
        anyhow::bail!("failed to diff {} directories: {}", failed.len(), failed.join(", "));
    }
    Ok(())
}
