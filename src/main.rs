use funcgraph::cli::commands::{CliArgs, Commands};
use funcgraph::cli::handlers::{handle_diagram, handle_traverse, GlobalOptions};
use funcgraph::util::logging::{init_logging, parse_level, LoggingConfig};
use funcgraph::VERSION;

use clap::Parser;
use std::env;
use tracing::{debug, Level};

#[tokio::main]
async fn main() {
    let args = CliArgs::parse();
    let cli_level = cli_log_level(&args);
    init_logging_from_args(cli_level);

    debug!("funcgraph v{} starting", VERSION);
    debug!("Arguments: {:?}", args);

    let options = GlobalOptions {
        quiet: args.quiet,
        log_level: cli_level,
    };
    let exit_code = match &args.command {
        Commands::Traverse(traverse_args) => handle_traverse(traverse_args, options).await,
        Commands::Diagram(diagram_args) => handle_diagram(diagram_args, options).await,
    };

    std::process::exit(exit_code);
}

/// Level picked on the command line, if any: `--log-level`, then `-v`, then `-q`
fn cli_log_level(args: &CliArgs) -> Option<Level> {
    if let Some(level_str) = &args.log_level {
        Some(level_or_default(level_str))
    } else if args.verbose {
        Some(Level::DEBUG)
    } else if args.quiet {
        Some(Level::ERROR)
    } else {
        None
    }
}

fn init_logging_from_args(cli_level: Option<Level>) {
    let level = cli_level.unwrap_or_else(|| {
        let level_str = env::var("FUNCGRAPH_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        level_or_default(&level_str)
    });

    let use_json = env::var("FUNCGRAPH_LOG_JSON")
        .ok()
        .and_then(|v| v.parse::<bool>().ok())
        .unwrap_or(false);

    init_logging(LoggingConfig {
        use_json,
        ..LoggingConfig::with_level(level)
    });
}

fn level_or_default(level_str: &str) -> Level {
    parse_level(level_str).unwrap_or_else(|| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            level_str
        );
        Level::INFO
    })
}
