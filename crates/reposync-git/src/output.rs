//! Structured result of a single backend call.

use std::process::Output;

/// Lines and exit status captured from one git invocation.
///
/// The adapter never interprets `status`; callers decide whether a non-zero
/// exit is benign (`nothing to commit`) or a failure (`rejected`).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Non-empty stdout lines, trailing whitespace removed.
    pub lines: Vec<String>,
    /// Non-empty stderr lines, trailing whitespace removed.
    pub stderr: Vec<String>,
    /// Exit code, `None` if the process was killed by a signal.
    pub status: Option<i32>,
}

impl CommandOutput {
    /// Build a successful output from stdout lines.
    #[must_use]
    pub fn ok<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: lines.into_iter().map(Into::into).collect(),
            stderr: Vec::new(),
            status: Some(0),
        }
    }

    /// Build a failed output with the given exit code and stderr lines.
    #[must_use]
    pub fn failed<I, S>(code: i32, stderr: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: Vec::new(),
            stderr: stderr.into_iter().map(Into::into).collect(),
            status: Some(code),
        }
    }

    /// Whether the command exited with status 0.
    #[must_use]
    pub fn success(&self) -> bool {
        self.status == Some(0)
    }

    /// Whether stdout carried no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// First stdout line, if any.
    #[must_use]
    pub fn first_line(&self) -> Option<&str> {
        self.lines.first().map(String::as_str)
    }

    /// Parse the first whitespace-separated numbers on the first line.
    ///
    /// Anything unparseable counts as 0.
    #[must_use]
    pub fn counts(&self) -> Vec<usize> {
        self.first_line()
            .map(|line| {
                line.split_whitespace()
                    .map(|n| n.parse().unwrap_or(0))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Case-insensitive search across stdout and stderr.
    #[must_use]
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.lines
            .iter()
            .chain(&self.stderr)
            .any(|line| line.to_lowercase().contains(&needle))
    }

    /// Best single-line description of what went wrong.
    #[must_use]
    pub fn reason(&self) -> String {
        self.stderr
            .iter()
            .chain(&self.lines)
            .find(|line| !line.trim().is_empty())
            .cloned()
            .unwrap_or_else(|| match self.status {
                Some(code) => format!("exit status {code}"),
                None => "terminated by signal".to_string(),
            })
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            lines: split_lines(&output.stdout),
            stderr: split_lines(&output.stderr),
            status: output.status.code(),
        }
    }
}

fn split_lines(bytes: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(bytes)
        .lines()
        .map(str::trim_end)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}
