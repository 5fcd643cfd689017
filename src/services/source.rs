use crate::config::SourceSpec;
use crate::model::ResourceNode;
use crate::services::cli_runner::{run_cmdline_to_bytes, split_cmdline};
use crate::services::loader::{parse_trace, read_trace};
use anyhow::{anyhow, Context, Result};
use std::io::Read;
use std::path::PathBuf;

/// Where trace trees come from. Fetches are blocking and run on the refresh
/// thread, never on the UI thread.
pub trait TraceSource: Send {
    fn describe(&self) -> String;
    fn fetch(&mut self) -> Result<Vec<ResourceNode>>;
}

/// Runs a trace command and parses its stdout.
pub struct CommandSource {
    program: String,
    args: Vec<String>,
}

impl CommandSource {
    pub fn new(cmdline: &str, name: Option<&str>) -> Result<Self> {
        let extra: Vec<String> = name.map(|n| vec![n.to_string()]).unwrap_or_default();
        let (program, args) = split_cmdline(cmdline, &extra)?;
        Ok(Self { program, args })
    }
}

impl TraceSource for CommandSource {
    fn describe(&self) -> String {
        format!("{} {}", self.program, self.args.join(" "))
    }

    fn fetch(&mut self) -> Result<Vec<ResourceNode>> {
        let stdout = run_cmdline_to_bytes(&self.program, &self.args)?;
        parse_trace(&stdout).with_context(|| "Error while parsing Crossplane JSON")
    }
}

/// Re-reads a JSON file on every fetch.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TraceSource for FileSource {
    fn describe(&self) -> String {
        self.path.display().to_string()
    }

    fn fetch(&mut self) -> Result<Vec<ResourceNode>> {
        let bytes =
            std::fs::read(&self.path).with_context(|| format!("reading {:?}", self.path))?;
        parse_trace(&bytes).with_context(|| format!("parsing {:?}", self.path))
    }
}

/// Reads a byte stream once (e.g. piped stdin).
pub struct ReaderSource<R> {
    label: String,
    reader: Option<R>,
}

impl<R: Read + Send> ReaderSource<R> {
    pub fn new(label: impl Into<String>, reader: R) -> Self {
        Self {
            label: label.into(),
            reader: Some(reader),
        }
    }
}

impl<R: Read + Send> TraceSource for ReaderSource<R> {
    fn describe(&self) -> String {
        self.label.clone()
    }

    fn fetch(&mut self) -> Result<Vec<ResourceNode>> {
        let reader = self
            .reader
            .take()
            .ok_or_else(|| anyhow!("{} was already consumed", self.label))?;
        read_trace(reader).with_context(|| format!("reading trace from {}", self.label))
    }
}

/// Build the source described by the resolved config.
pub fn open_source(spec: &SourceSpec) -> Result<Box<dyn TraceSource>> {
    Ok(match spec {
        SourceSpec::Command { cmdline, name } => {
            Box::new(CommandSource::new(cmdline, name.as_deref())?)
        }
        SourceSpec::File(path) => Box::new(FileSource::new(path)),
        SourceSpec::Stdin => Box::new(ReaderSource::new("stdin", std::io::stdin())),
    })
}
