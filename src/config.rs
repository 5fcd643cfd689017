use crate::logging::{LogConfig, DEFAULT_LEVEL};
use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::warn;

pub const CONFIG_ENV: &str = "XTRACE_EXPLORER_CONFIG";
pub const DEFAULT_CMD: &str = "crossplane beta trace -o json";
pub const DEFAULT_WATCH_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_PATH_SEPARATOR: &str = " > ";

/// Arguments of the `trace` subcommand.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct TraceArgs {
    /// Resource to trace, appended to the trace command (e.g. `xapp/demo`).
    pub name: Option<String>,

    /// Command that prints the trace JSON on stdout.
    #[arg(long, value_name = "CMD")]
    pub cmd: Option<String>,

    /// Read the trace JSON once from stdin.
    #[arg(long)]
    pub stdin: bool,

    /// Read the trace JSON from a file (re-read on every refresh).
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Periodically re-fetch the trace.
    #[arg(short = 'w', long)]
    pub watch: bool,

    /// Seconds between refreshes when watching.
    #[arg(long, value_name = "SECS")]
    pub watch_interval: Option<u64>,

    /// YAML config file.
    #[arg(long, value_name = "PATH", env = CONFIG_ENV)]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<String>,
}

/// On-disk config. Every key is optional; CLI flags win over it.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub cmd: Option<String>,
    pub watch: Option<bool>,
    pub watch_interval_secs: Option<u64>,
    pub path_separator: Option<String>,
    pub log_file: Option<PathBuf>,
    pub log_level: Option<String>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let s = fs::read_to_string(path).with_context(|| format!("reading config: {path:?}"))?;
        if s.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(&s).with_context(|| format!("parsing config: {path:?}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshConfig {
    pub enabled: bool,
    pub interval: Duration,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            interval: Duration::from_secs(DEFAULT_WATCH_INTERVAL_SECS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSpec {
    Command {
        cmdline: String,
        name: Option<String>,
    },
    File(PathBuf),
    Stdin,
}

impl SourceSpec {
    pub fn repeatable(&self) -> bool {
        !matches!(self, SourceSpec::Stdin)
    }
}

#[derive(Debug, Clone)]
pub struct ExplorerConfig {
    pub source: SourceSpec,
    pub refresh: RefreshConfig,
    pub path_separator: String,
    pub log: LogConfig,
    /// Watch was requested but the source is one-shot. Reported once logging
    /// is up.
    pub watch_forced_off: bool,
}

impl ExplorerConfig {
    /// Load the config file named by the args (or `XTRACE_EXPLORER_CONFIG`)
    /// and merge the flags over it.
    pub fn from_args(args: &TraceArgs) -> Result<Self> {
        let file = match &args.config {
            Some(path) => FileConfig::load(path)?,
            None => FileConfig::default(),
        };
        Self::merge(args, file)
    }

    /// Log decisions `merge` made on the user's behalf. Call after the
    /// subscriber is installed.
    pub fn report_adjustments(&self) {
        if self.watch_forced_off {
            warn!("stdin can only be read once; disabling watch");
        }
    }

    pub fn merge(args: &TraceArgs, file: FileConfig) -> Result<Self> {
        let source = if args.stdin {
            SourceSpec::Stdin
        } else if let Some(path) = &args.file {
            SourceSpec::File(path.clone())
        } else {
            let cmdline = args
                .cmd
                .clone()
                .or(file.cmd)
                .unwrap_or_else(|| DEFAULT_CMD.to_string());
            if cmdline.trim().is_empty() {
                bail!("trace command is empty");
            }
            SourceSpec::Command {
                cmdline,
                name: args.name.clone().filter(|n| !n.is_empty()),
            }
        };

        let secs = args
            .watch_interval
            .or(file.watch_interval_secs)
            .unwrap_or(DEFAULT_WATCH_INTERVAL_SECS);
        if secs < 1 {
            bail!("watch interval must be at least 1 second (got {secs})");
        }
        let requested = args.watch || file.watch.unwrap_or(false);
        let watch_forced_off = requested && !source.repeatable();
        let enabled = requested && !watch_forced_off;

        Ok(Self {
            source,
            refresh: RefreshConfig {
                enabled,
                interval: Duration::from_secs(secs),
            },
            path_separator: file
                .path_separator
                .unwrap_or_else(|| DEFAULT_PATH_SEPARATOR.to_string()),
            log: LogConfig {
                level: args
                    .log_level
                    .clone()
                    .or(file.log_level)
                    .unwrap_or_else(|| DEFAULT_LEVEL.to_string()),
                file: args.log_file.clone().or(file.log_file),
            },
            watch_forced_off,
        })
    }
}
