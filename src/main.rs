mod app;
mod config;
mod logging;
mod model;
mod nav;
mod services;
mod theme;
mod ui;
mod widgets;

use anyhow::Result;
use clap::{Parser, Subcommand};
use config::{ExplorerConfig, TraceArgs};

/// Interactive explorer for crossplane resource traces.
#[derive(Parser, Debug)]
#[command(name = "xtrace-explorer", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Browse the trace tree of a resource.
    #[command(visible_alias = "t")]
    Trace(TraceArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Trace(args) => {
            let config = ExplorerConfig::from_args(&args)?;
            logging::init_logging(&config.log)?;
            config.report_adjustments();
            ui::run(config)
                .inspect_err(|e| tracing::error!(error = %format!("{e:#}"), "session failed"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn trace_alias_and_flags_parse() {
        let cli = Cli::try_parse_from([
            "xtrace-explorer",
            "t",
            "xapp/demo",
            "--watch",
            "--watch-interval",
            "3",
            "--cmd",
            "crossplane beta trace -o json",
        ])
        .unwrap();
        let Command::Trace(args) = cli.command;
        assert_eq!(args.name.as_deref(), Some("xapp/demo"));
        assert!(args.watch);
        assert_eq!(args.watch_interval, Some(3));
        assert!(!args.stdin);
    }
}
