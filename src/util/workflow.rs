//! Reporting to the CI workflow runner.
//!
//! The pipeline publishes outputs, groups its log lines and reports a fatal
//! error through a [`Reporter`]. [`GitHubActions`] speaks the GitHub Actions
//! workflow command protocol.

use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};

/// Environment variable naming the file that receives step outputs.
pub const GITHUB_OUTPUT_ENV: &str = "GITHUB_OUTPUT";

const OUTPUT_DELIMITER: &str = "PACKAGE_BINARY_EOF";

/// Sink for workflow outputs, log groups and errors.
pub trait Reporter {
    /// Publish named output values.
    ///
    /// Either every output is published or none is.
    fn set_outputs(&mut self, outputs: &[(&str, &str)]) -> Result<()>;

    /// Open a collapsible log group.
    fn start_group(&mut self, title: &str);

    /// Close the innermost log group.
    fn end_group(&mut self);

    /// Publish a titled error annotation.
    fn error(&mut self, title: &str, message: &str);
}

/// Scoped log group, closed when dropped.
///
/// The group ends on every exit path of the enclosing scope, including early
/// returns through `?`.
pub struct LogGroup<'a> {
    reporter: &'a mut dyn Reporter,
}

impl<'a> LogGroup<'a> {
    pub fn new(reporter: &'a mut dyn Reporter, title: &str) -> Self {
        reporter.start_group(title);
        LogGroup { reporter }
    }
}

impl Drop for LogGroup<'_> {
    fn drop(&mut self) {
        self.reporter.end_group();
    }
}

/// GitHub Actions workflow command writer.
#[derive(Debug)]
pub struct GitHubActions<W: Write = io::Stdout> {
    out: W,
    output_file: Option<PathBuf>,
}

impl GitHubActions {
    /// Writer on stdout, honouring `$GITHUB_OUTPUT` when set.
    pub fn from_env() -> Self {
        let output_file = std::env::var_os(GITHUB_OUTPUT_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        GitHubActions::new(io::stdout(), output_file)
    }
}

impl<W: Write> GitHubActions<W> {
    /// Writer on `out`. Outputs go to `output_file` when given, otherwise
    /// they are emitted as legacy `set-output` commands.
    pub fn new(out: W, output_file: Option<PathBuf>) -> Self {
        GitHubActions { out, output_file }
    }

    /// Consume the reporter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.out
    }

    fn command(&mut self, name: &str, properties: &[(&str, &str)], value: &str) -> io::Result<()> {
        writeln!(self.out, "{}", format_command(name, properties, value))?;
        self.out.flush()
    }

    fn command_or_warn(&mut self, name: &str, properties: &[(&str, &str)], value: &str) {
        if let Err(e) = self.command(name, properties, value) {
            tracing::warn!("failed to write `{}` workflow command: {}", name, e);
        }
    }
}

impl<W: Write> Reporter for GitHubActions<W> {
    fn set_outputs(&mut self, outputs: &[(&str, &str)]) -> Result<()> {
        match self.output_file.clone() {
            Some(path) => {
                let mut entries = String::new();
                for &(name, value) in outputs {
                    entries.push_str(&format_output_entry(name, value)?);
                }
                let mut file = OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(&path)
                    .with_context(|| format!("failed to open output file: {}", path.display()))?;
                file.write_all(entries.as_bytes())
                    .with_context(|| format!("failed to write output file: {}", path.display()))?;
            }
            None => {
                let mut commands = String::new();
                for &(name, value) in outputs {
                    commands.push_str(&format_command("set-output", &[("name", name)], value));
                    commands.push('\n');
                }
                self.out
                    .write_all(commands.as_bytes())
                    .and_then(|()| self.out.flush())
                    .context("failed to write workflow output")?;
            }
        }
        Ok(())
    }

    fn start_group(&mut self, title: &str) {
        self.command_or_warn("group", &[], title);
    }

    fn end_group(&mut self) {
        self.command_or_warn("endgroup", &[], "");
    }

    fn error(&mut self, title: &str, message: &str) {
        self.command_or_warn("error", &[("title", title)], message);
    }
}

/// Render a `::name key=value,...::data` workflow command.
pub fn format_command(name: &str, properties: &[(&str, &str)], value: &str) -> String {
    let mut command = format!("::{}", name);

    if !properties.is_empty() {
        let props: Vec<String> = properties
            .iter()
            .map(|(k, v)| format!("{}={}", k, escape_property(v)))
            .collect();
        command.push(' ');
        command.push_str(&props.join(","));
    }

    command.push_str("::");
    command.push_str(&escape_data(value));
    command
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(value: &str) -> String {
    escape_data(value).replace(':', "%3A").replace(',', "%2C")
}

/// Render one `$GITHUB_OUTPUT` entry.
fn format_output_entry(name: &str, value: &str) -> Result<String> {
    if !value.contains('\n') && !value.contains('\r') {
        return Ok(format!("{}={}\n", name, value));
    }
    if value.contains(OUTPUT_DELIMITER) {
        bail!("output `{}` contains the reserved delimiter", name);
    }
    Ok(format!(
        "{}<<{}\n{}\n{}\n",
        name, OUTPUT_DELIMITER, value, OUTPUT_DELIMITER
    ))
}
