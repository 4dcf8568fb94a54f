//! mypy integration
//!
//! The source is written to a temporary `.py` file which is removed when the
//! handle drops, whether the run succeeds, fails or is cancelled.

use super::{TypeChecker, TypeDiagnostic};
use crate::{Error, Result};
use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;
use std::io::Write;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

lazy_static! {
    // file:line[:col]: severity: message [code]
    static ref MYPY_LINE: Regex = Regex::new(
        r"^(?P<file>.+?):(?P<line>\d+):(?:(?P<col>\d+):)?\s*(?P<severity>error|warning|note):\s*(?P<rest>.*)$"
    )
    .unwrap();
    static ref ERROR_CODE: Regex = Regex::new(r"^(?P<message>.*?)\s*\[(?P<code>[a-z0-9-]+)\]$").unwrap();
}

#[derive(Debug, Clone)]
pub struct MypyChecker {
    program: String,
}

impl Default for MypyChecker {
    fn default() -> Self {
        Self::new("mypy")
    }
}

impl MypyChecker {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Parse one line of mypy output. Summary and blank lines yield `None`.
    pub fn parse_line(line: &str) -> Option<TypeDiagnostic> {
        let caps = MYPY_LINE.captures(line.trim())?;
        let line_number: usize = caps["line"].parse().ok()?;
        let column = caps.name("col").and_then(|c| c.as_str().parse().ok());
        let rest = caps["rest"].trim();

        let (message, code) = match ERROR_CODE.captures(rest) {
            Some(code_caps) => (
                code_caps["message"].to_string(),
                Some(code_caps["code"].to_string()),
            ),
            None => (rest.to_string(), None),
        };

        Some(TypeDiagnostic {
            line: line_number,
            column,
            severity: caps["severity"].to_string(),
            message,
            code,
        })
    }

    pub fn parse_output(output: &str) -> Vec<TypeDiagnostic> {
        output.lines().filter_map(Self::parse_line).collect()
    }
}

#[async_trait]
impl TypeChecker for MypyChecker {
    fn tool_name(&self) -> &str {
        &self.program
    }

    fn is_available(&self) -> bool {
        which::which(&self.program).is_ok()
    }

    async fn check_source(&self, source: &str, name: &str) -> Result<Vec<TypeDiagnostic>> {
        let mut file = tempfile::Builder::new()
            .prefix("codeshift_")
            .suffix(".py")
            .tempfile()?;
        file.write_all(source.as_bytes())?;
        file.flush()?;

        debug!("Running {} on {} via {}", self.program, name, file.path().display());

        let output = Command::new(&self.program)
            .arg("--ignore-missing-imports")
            .arg("--show-column-numbers")
            .arg("--show-error-codes")
            .arg("--no-error-summary")
            .arg("--no-color-output")
            .arg(file.path())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| Error::ExternalTool {
                tool: self.program.clone(),
                message: format!("Failed to execute: {e}"),
            })?;

        // mypy exits 1 when it finds errors, 2 on usage or crash
        if output.status.code() == Some(2) {
            return Err(Error::ExternalTool {
                tool: self.program.clone(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(Self::parse_output(&String::from_utf8_lossy(&output.stdout)))
    }
}
