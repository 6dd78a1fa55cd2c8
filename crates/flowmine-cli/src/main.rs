#![forbid(unsafe_code)]

mod cmd;
mod output;

use std::env;

use clap::{Parser, Subcommand};
use flowmine_core::ErrorCode;
use flowmine_core::config::{load_config, resolve_output};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use crate::output::{CliError, OutputMode, render_error};

#[derive(Parser, Debug)]
#[command(
    name = "fm",
    author,
    version,
    about = "flowmine: heuristic process discovery from event-log statistics",
    long_about = None
)]
struct Cli {
    /// Enable verbose logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON output instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Output format (overrides `--json`, `FLOWMINE_FORMAT` and config).
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    /// Derive the output mode from flags, environment and config.
    fn output_mode(&self, config_output: Option<&str>) -> OutputMode {
        self.format
            .unwrap_or_else(|| OutputMode::from_resolved(&resolve_output(self.json, config_output)))
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Mine a process graph from a statistics file")]
    Mine(cmd::mine::MineArgs),

    #[command(about = "Summarise a statistics file without mining")]
    Info(cmd::info::InfoArgs),
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_env("FLOWMINE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if verbose || env::var("DEBUG").is_ok() {
            "flowmine=debug,info"
        } else {
            "flowmine=info,warn"
        })
    });

    let format = env::var("FLOWMINE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let project_root = env::current_dir()?;
    let config = match load_config(&project_root) {
        Ok(config) => config,
        Err(err) => {
            let output = cli.output_mode(None);
            let mut error = CliError::from_anyhow(&err);
            if error.error_code.is_none() {
                error = CliError::with_code(error.message, ErrorCode::ConfigParseError);
            }
            render_error(output, &error)?;
            std::process::exit(2);
        }
    };
    let output = cli.output_mode(config.output.as_deref());
    debug!(?output, "resolved output mode");

    let command_result = match cli.command {
        Commands::Mine(ref args) => cmd::mine::run_mine(args, &config, output),
        Commands::Info(ref args) => cmd::info::run_info(args, output),
    };

    if let Err(err) = command_result {
        render_error(output, &CliError::from_anyhow(&err))?;
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mine_subcommand_parses() {
        let cli = Cli::parse_from(["fm", "mine", "stats.json"]);
        match cli.command {
            Commands::Mine(args) => {
                assert_eq!(args.path.to_str(), Some("stats.json"));
                assert!(args.min_frequency.is_none());
                assert!(args.threshold.is_none());
            }
            Commands::Info(_) => panic!("expected mine"),
        }
    }

    #[test]
    fn mine_parameters_parse() {
        let cli = Cli::parse_from([
            "fm",
            "mine",
            "stats.json",
            "--min-frequency",
            "5",
            "--threshold",
            "0.9",
            "--scale",
            "linear",
        ]);
        let Commands::Mine(args) = cli.command else {
            panic!("expected mine");
        };
        assert_eq!(args.min_frequency, Some(5.0));
        assert_eq!(args.threshold, Some(0.9));
        assert_eq!(args.scale, Some(cmd::mine::ScaleKind::Linear));
    }

    #[test]
    fn info_subcommand_parses() {
        let cli = Cli::parse_from(["fm", "info", "stats.json"]);
        assert!(matches!(cli.command, Commands::Info(_)));
    }

    #[test]
    fn json_flag_after_subcommand() {
        let cli = Cli::parse_from(["fm", "mine", "stats.json", "--json"]);
        assert!(cli.json);
        assert_eq!(cli.output_mode(None), OutputMode::Json);
    }

    #[test]
    fn format_flag_wins_over_json() {
        let cli = Cli::parse_from(["fm", "--json", "--format", "text", "info", "s.json"]);
        assert_eq!(cli.output_mode(Some("json")), OutputMode::Text);
    }

    #[test]
    fn missing_path_is_rejected() {
        assert!(Cli::try_parse_from(["fm", "mine"]).is_err());
    }
}
