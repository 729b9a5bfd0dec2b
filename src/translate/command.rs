use std::process::{Output, Stdio};
use tokio::process::Command;
use tracing::debug;

use crate::config::{TranslationDirection, TranslatorConfig};
use crate::error::{Result, SubtransError};

/// A single translate-shell invocation, built before it is run
#[derive(Debug, Clone)]
pub struct TransCommand {
    pub binary_path: String,
    pub args: Vec<String>,
    pub description: String,
}

impl TransCommand {
    /// Create a new translate-shell command
    pub fn new<S1: Into<String>, S2: Into<String>>(binary_path: S1, description: S2) -> Self {
        Self {
            binary_path: binary_path.into(),
            args: Vec::new(),
            description: description.into(),
        }
    }

    /// Add an argument
    pub fn arg<S: Into<String>>(mut self, arg: S) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(|s| s.into()));
        self
    }

    /// Print only the translation
    pub fn brief(self) -> Self {
        self.arg("-brief")
    }

    /// Suppress warnings
    pub fn no_warn(self) -> Self {
        self.arg("-no-warn")
    }

    /// Set the source language
    pub fn source_language<S: Into<String>>(self, code: S) -> Self {
        self.arg("-from").arg(code)
    }

    /// Set the target language
    pub fn target_language<S: Into<String>>(self, code: S) -> Self {
        self.arg("-to").arg(code)
    }

    /// Command line for `sh -c`, every argument double-quoted
    pub fn shell_line(&self) -> String {
        let mut line = self.binary_path.clone();
        for arg in &self.args {
            line.push_str(" \"");
            line.push_str(&escape_double_quoted(arg));
            line.push('"');
        }
        line
    }

    /// Run to completion and capture stdout/stderr. Only spawn failures are errors here.
    pub async fn output(&self, use_shell: bool) -> Result<Output> {
        let mut cmd = if use_shell {
            let mut cmd = Command::new("sh");
            cmd.arg("-c").arg(self.shell_line());
            cmd
        } else {
            let mut cmd = Command::new(&self.binary_path);
            cmd.args(&self.args);
            cmd
        };
        cmd.stdin(Stdio::null()).kill_on_drop(true);

        debug!("Executing {}: {:?}", self.description, cmd);

        cmd.output().await.map_err(|e| {
            SubtransError::ExternalTool(format!("Failed to execute {}: {}", self.binary_path, e))
        })
    }
}

/// Escape the characters that keep their meaning inside a double-quoted shell word
pub fn escape_double_quoted(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '"' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Builds translate-shell commands from the translator configuration
pub struct TransCommandBuilder {
    config: TranslatorConfig,
}

impl TransCommandBuilder {
    pub fn new(config: TranslatorConfig) -> Self {
        Self { config }
    }

    pub fn translate(&self, text: &str, direction: &TranslationDirection) -> TransCommand {
        let mut cmd = TransCommand::new(&self.config.binary_path, "Line translation");
        if self.config.brief {
            cmd = cmd.brief();
        }
        if self.config.no_warn {
            cmd = cmd.no_warn();
        }

        cmd.source_language(direction.source())
            .target_language(direction.target())
            .args(self.config.extra_args.iter().cloned())
            .arg(text)
    }

    pub fn version_check(&self) -> TransCommand {
        TransCommand::new(&self.config.binary_path, "Version check").arg("-V")
    }
}
