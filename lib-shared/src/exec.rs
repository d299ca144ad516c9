/// Helper code for invoking external pipeline tools.
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use shlex;

use slog::Logger;

mod errors {
    // Create the Error, ErrorKind, ResultExt, and Result types
    error_chain! {}
}

pub use self::errors::*;

/// One external tool invocation: program, arguments, and optional
/// redirections of the child's stdout/stderr to files.
///
/// Running checks the exit status; a non-zero exit becomes an error that
/// names the pipeline stage, the rendered command line, and whatever the
/// tool wrote to stderr (unless stderr was redirected to a log file).
#[derive(Debug, Clone)]
pub struct ToolCommand {
    program: String,
    args: Vec<String>,
    stdout_to: Option<PathBuf>,
    stderr_append: Option<PathBuf>,
}

impl ToolCommand {
    pub fn new(program: &str) -> Self {
        ToolCommand {
            program: program.to_string(),
            args: Vec::new(),
            stdout_to: None,
            stderr_append: None,
        }
    }

    pub fn arg(mut self, arg: &str) -> Self {
        self.args.push(arg.to_string());
        self
    }

    pub fn args(mut self, args: &[&str]) -> Self {
        self.args.extend(args.iter().map(|a| a.to_string()));
        self
    }

    /// Redirect the child's stdout into the given file (truncating).
    pub fn stdout_to<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.stdout_to = Some(path.as_ref().to_path_buf());
        self
    }

    /// Append the child's stderr to the given log file.
    pub fn stderr_append<P: AsRef<Path>>(mut self, path: P) -> Self {
        self.stderr_append = Some(path.as_ref().to_path_buf());
        self
    }

    /// Render the invocation as a shell-quoted command line.
    pub fn rendered(&self) -> String {
        let mut parts = vec![shlex::quote(&self.program).to_string()];
        parts.extend(self.args.iter().map(|arg| shlex::quote(arg).to_string()));
        let mut line = parts.join(" ");
        if let Some(ref path) = self.stdout_to {
            line.push_str(&format!(" > {}", path.display()));
        }
        if let Some(ref path) = self.stderr_append {
            line.push_str(&format!(" 2>> {}", path.display()));
        }
        line
    }

    /// Execute the tool, blocking until it exits.
    pub fn run(&self, logger: &Logger, stage: &str) -> Result<()> {
        debug!(logger, "[{}] {}", stage, self.rendered());

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        cmd.stdin(Stdio::null());
        if let Some(ref path) = self.stdout_to {
            let file = File::create(path)
                .chain_err(|| format!("Could not create output file {}", path.display()))?;
            cmd.stdout(Stdio::from(file));
        }
        if let Some(ref path) = self.stderr_append {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .chain_err(|| format!("Could not open log file {}", path.display()))?;
            cmd.stderr(Stdio::from(file));
        }

        // Unredirected streams are captured; stderr goes into the error
        // message on failure.
        let output = cmd.output().chain_err(|| {
            format!(
                "Could not launch '{}' for stage '{}'; is it on your PATH?",
                self.program, stage
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stderr = stderr.trim();
            if stderr.is_empty() {
                bail!(
                    "Stage '{}' failed: `{}` exited with {}",
                    stage,
                    self.rendered(),
                    output.status
                );
            } else {
                bail!(
                    "Stage '{}' failed: `{}` exited with {}; stderr:\n{}",
                    stage,
                    self.rendered(),
                    output.status,
                    stderr
                );
            }
        }

        Ok(())
    }
}
