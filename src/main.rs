//! padstack-mcp: MCP server generating QFN/LQFP pad, mask and paste geometry.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use padstack_mcp::config;
use padstack_mcp::mcp::McpServer;

/// MCP server generating QFN/LQFP pad, solder-mask and paste geometry.
///
/// Speaks JSON-RPC over stdin/stdout. Logs go to stderr.
#[derive(Parser, Debug)]
#[command(name = "padstack-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (default: ~/.padstack-mcp/config.json if present)
    #[arg(value_name = "CONFIG_FILE")]
    config: Option<PathBuf>,

    /// More logging: -v info, -vv debug, -vvv trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Errors only
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

fn log_level(verbose: u8, quiet: bool, configured: &str) -> Level {
    if quiet {
        return Level::ERROR;
    }
    match verbose {
        0 => configured.parse().unwrap_or(Level::WARN),
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn init_tracing(level: Level) {
    let filter = EnvFilter::from_default_env().add_directive(level.into());
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();

    let cfg = match config::load_config(args.config.as_deref()) {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    init_tracing(log_level(args.verbose, args.quiet, &cfg.logging.level));
    info!(
        version = env!("CARGO_PKG_VERSION"),
        svg = cfg.render.include_svg,
        "starting padstack-mcp"
    );

    let mut server = McpServer::new(&cfg);

    let runtime = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start async runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(server.run()) {
        Ok(()) => {
            info!("server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "server error");
            ExitCode::FAILURE
        }
    }
}
