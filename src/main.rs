//! stakeholder-map CLI - Stakeholder Network Mapping Tool
//!
//! Renders a stakeholder workbook as an interactive network page, either to
//! a file or served over HTTP.
//!
//! Usage:
//!   stakeholder-map [OPTIONS] [WORKBOOK]

use std::fs;
use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use stakeholder_map::{
    MapConfig, RenderContext, ThemeMode, TierFilter, available_tiers, load_config,
    load_config_file, load_network, render,
    web::{ServerConfig, start_server},
};

/// stakeholder-map - Explore stakeholder influence networks
#[derive(Parser, Debug)]
#[command(name = "stakeholder-map")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Workbook with Nodes and Links sheets (default: from config)
    workbook: Option<PathBuf>,

    /// Theme mode: light or dark (default: from config, else light)
    #[arg(long)]
    theme: Option<ThemeMode>,

    /// Only show nodes of this tier ("All" disables filtering)
    #[arg(long, default_value = "All")]
    tier: String,

    /// Output file for the rendered page
    #[arg(short, long, default_value = "stakeholder_map.html")]
    output: PathBuf,

    /// Intermediate graph fragment file (default: from config)
    #[arg(long)]
    fragment: Option<PathBuf>,

    /// Config file path (default: search for .stakeholder-map.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print the tiers found in the workbook and exit
    #[arg(long)]
    list_tiers: bool,

    // === Web options ===
    /// Start web server with live theme and tier selection
    #[arg(long)]
    web: bool,

    /// Port for web server (default: 3000)
    #[arg(long)]
    port: Option<u16>,

    /// Don't open browser automatically when starting web server
    #[arg(long)]
    no_open: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_logging(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Log to stderr; `RUST_LOG` overrides the level picked by `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose {
        "info,stakeholder_map=debug"
    } else {
        "info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_settings(args: &Args) -> Result<MapConfig, Box<dyn std::error::Error>> {
    let loaded = match &args.config {
        Some(path) => load_config_file(path),
        None => load_config(&std::env::current_dir()?),
    };

    let mut config = match loaded {
        Ok(config) => config,
        Err(e) => {
            warn!("No config file loaded: {}", e);
            MapConfig::default()
        }
    };

    // CLI args override config, which overrides defaults
    if let Some(workbook) = &args.workbook {
        config.data.workbook = workbook.clone();
    }
    if let Some(fragment) = &args.fragment {
        config.data.fragment = fragment.clone();
    }
    if let Some(theme) = args.theme {
        config.view.theme = theme;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if args.no_open {
        config.server.open_browser = false;
    }

    Ok(config)
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = load_settings(&args)?;

    if args.list_tiers {
        let network = load_network(&config.data.workbook)?;
        match available_tiers(&network.nodes) {
            Some(tiers) => {
                for tier in tiers {
                    println!("{}", tier);
                }
            }
            None => eprintln!("Sheet 'Nodes' has no Tier column"),
        }
        return Ok(());
    }

    if args.web {
        let server = ServerConfig {
            port: config.server.port,
            open_browser: config.server.open_browser,
        };

        let rt = tokio::runtime::Runtime::new()?;
        rt.block_on(start_server(config, server))
            .map_err(|e| -> Box<dyn std::error::Error> { e })?;

        return Ok(());
    }

    let ctx = RenderContext::from_config(
        &config,
        config.view.theme,
        TierFilter::from_option(&args.tier),
    );
    info!(
        "Rendering '{}' ({} theme, tier {})",
        ctx.workbook.display(),
        ctx.theme,
        ctx.tier
    );

    let page = render(&ctx)?;
    fs::write(&args.output, page.html.as_bytes())?;

    info!(
        "Map written to: {} ({} nodes, {} links)",
        args.output.display(),
        page.view.graph.nodes.len(),
        page.view.graph.edges.len()
    );

    Ok(())
}
