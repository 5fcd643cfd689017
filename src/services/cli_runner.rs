use anyhow::{anyhow, Context, Result};
use regex::Regex;
use std::process::Command;
use std::sync::OnceLock;
use std::{collections::HashMap, env};

static ENV_VAR_RE: OnceLock<Regex> = OnceLock::new();

fn env_var_re() -> &'static Regex {
    ENV_VAR_RE.get_or_init(|| Regex::new(r"\$\{([A-Za-z0-9_]+)\}").expect("static pattern"))
}

/// Expand `${VAR}` from the environment; unset variables expand to "".
pub fn expand_cmdline_env(cmdline: &str) -> String {
    let env_map: HashMap<String, String> = env::vars().collect();
    env_var_re()
        .replace_all(cmdline, |caps: &regex::Captures| {
            env_map.get(&caps[1]).cloned().unwrap_or_default()
        })
        .to_string()
}

/// Split a command line into program + args, appending `extra` args.
pub fn split_cmdline(cmdline: &str, extra: &[String]) -> Result<(String, Vec<String>)> {
    let expanded = expand_cmdline_env(cmdline);
    let mut parts =
        shlex::split(&expanded).ok_or_else(|| anyhow!("Failed to parse command line"))?;
    if parts.is_empty() {
        return Err(anyhow!("Empty command line"));
    }
    let program = parts.remove(0);
    parts.extend(extra.iter().filter(|s| !s.is_empty()).cloned());
    Ok((program, parts))
}

/// Run a command to completion and return its stdout.
pub fn run_cmdline_to_bytes(program: &str, args: &[String]) -> Result<Vec<u8>> {
    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("spawning {program}"))?;
    if !output.status.success() {
        let err = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(anyhow!(
            "Command failed ({}): {} {}\n{}",
            output.status,
            program,
            args.join(" "),
            err
        ));
    }
    Ok(output.stdout)
}
