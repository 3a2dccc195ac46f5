//! The `vn` binary.
//!
//! # Usage
//!
//! ```bash
//! # Assemble a text script into a container
//! vn assemble intro.vn -o intro.vnbc
//!
//! # List a container as assembler source, or as JSON
//! vn disasm intro.vnbc --json
//!
//! # Run headlessly for at most 600 frames, letting pauses time out
//! vn run intro.vnbc --frames 600 --automode
//! ```

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::info;
use vn_cli::{
    cli::CliConfig,
    commands::{self, assemble::AssembleArgs, disasm::DisasmArgs, run::RunArgs},
    diagnostics::{render_cli_error, setup_error_reporting},
    Result,
};

#[derive(Parser)]
#[command(
    name = "vn",
    version = env!("CARGO_PKG_VERSION"),
    about = "vn: assemble, inspect and run visual-novel scripts"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (use multiple times for increased verbosity)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Set log level (overrides --verbose/--quiet)
    #[arg(long, global = true, value_enum)]
    log: Option<LogLevel>,

    /// Set log output format
    #[arg(long, global = true, value_enum, default_value = "pretty")]
    log_format: LogFormat,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Working directory
    #[arg(short = 'C', long, global = true)]
    directory: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Assemble a text script into a binary container
    Assemble(AssembleArgs),

    /// List a script as assembler source or JSON
    Disasm(DisasmArgs),

    /// Run a script headlessly
    Run(RunArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_error_reporting()?;
    setup_logging(cli.verbose, cli.quiet, cli.log, cli.log_format);

    if let Some(dir) = &cli.directory {
        std::env::set_current_dir(dir)?;
    }

    let result = CliConfig::load(cli.config.as_deref()).and_then(|config| match cli.command {
        Commands::Assemble(args) => commands::assemble_command(args, &config),
        Commands::Disasm(args) => commands::disasm_command(args, &config),
        Commands::Run(args) => commands::run_command(args, &config),
    });

    match result {
        Ok(()) => {
            if cli.verbose > 0 {
                info!("Command completed successfully");
            }
            Ok(())
        }
        Err(e) => {
            render_cli_error(e);
            std::process::exit(1);
        }
    }
}

fn setup_logging(verbose: u8, quiet: bool, log_level: Option<LogLevel>, log_format: LogFormat) {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    let filter = if let Some(level) = log_level {
        EnvFilter::new(match level {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        })
    } else if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    let formatter = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .with_level(true);

    match log_format {
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(formatter)
                .with(filter)
                .init();
        }
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(formatter.json())
                .with(filter)
                .init();
        }
    }
}
