//! External command execution.
//!
//! Builder-based API for running helper programs (the ImageMagick
//! rasterizer) with optional stdin piping.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! let output = Cmd::new("magick")
//!     .args(["-background", "none", "-", "png:-"])
//!     .stdin(svg_data)
//!     .run()?;
//! ```

use anyhow::{Context, Result};
use std::{
    ffi::{OsStr, OsString},
    io::Write,
    process::{Command, Output, Stdio},
};

/// Command builder for external process execution.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    stdin_data: Option<Vec<u8>>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self = self.arg(arg);
        }
        self
    }

    /// Set stdin data to pipe to the process.
    pub fn stdin<D: AsRef<[u8]>>(mut self, data: D) -> Self {
        self.stdin_data = Some(data.as_ref().to_vec());
        self
    }

    /// Execute the command and return output.
    ///
    /// Non-zero exit status is an error carrying the process stderr.
    pub fn run(self) -> Result<Output> {
        let name = self.program.to_string_lossy().to_string();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if self.stdin_data.is_some() {
            cmd.stdin(Stdio::piped());
        }

        let mut child = cmd
            .spawn()
            .with_context(|| format!("Failed to spawn `{name}`"))?;

        if let (Some(data), Some(mut stdin)) = (self.stdin_data, child.stdin.take()) {
            stdin
                .write_all(&data)
                .with_context(|| format!("Failed to write stdin to `{name}`"))?;
            // stdin drops here so the child sees EOF
        }

        let output = child
            .wait_with_output()
            .with_context(|| format!("Failed to wait for `{name}`"))?;

        if !output.status.success() {
            anyhow::bail!(format_error(&name, &output));
        }

        Ok(output)
    }
}

/// Format error message for failed command.
fn format_error(name: &str, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    let mut msg = format!("Command `{name}` failed with {}", output.status);
    let stderr = stderr.trim();
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(stderr);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("magick").arg("-").args(["-density", "96"]);
        assert_eq!(cmd.program, OsString::from("magick"));
        assert_eq!(cmd.args.len(), 3);
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("echo").arg("").args(["a", "", "b"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_stdin_pipe() {
        let output = Cmd::new("cat").stdin(b"test data").run().unwrap();
        assert!(output.status.success());
        assert_eq!(output.stdout, b"test data");
    }

    #[cfg(unix)]
    #[test]
    fn test_failure_is_error() {
        let result = Cmd::new("false").run();
        assert!(result.is_err());
    }
}
