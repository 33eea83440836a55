use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result, anyhow};

/// Runs the configured syntax-tree producer, feeding it the source text on
/// stdin and returning its stdout. The command string is split on
/// whitespace: first token is the program, the rest are arguments.
pub(super) fn run_parser_command(parser_cmd: &str, source: &str) -> Result<String> {
    let mut parts = parser_cmd.split_whitespace();
    let program = parts
        .next()
        .ok_or_else(|| anyhow!("parser command is empty"))?;

    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("failed to spawn parser command: {parser_cmd}"))?;

    child
        .stdin
        .take()
        .ok_or_else(|| anyhow!("parser stdin was not captured"))?
        .write_all(source.as_bytes())
        .context("failed to write source to parser stdin")?;

    let output = child
        .wait_with_output()
        .with_context(|| format!("failed to wait for parser command: {parser_cmd}"))?;

    if output.status.success() {
        String::from_utf8(output.stdout).context("parser output was not valid UTF-8")
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(anyhow!("parser command {parser_cmd} failed: {stderr}"))
    }
}
