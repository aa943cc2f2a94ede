//! Stage definitions
//!
//! A stage is one invocation of an external worker executable. A [`StageSpec`] is
//! assembled once with [`StageSpecBuilder`] and read-only afterwards.

use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timeout applied when a builder is not given one
pub const DEFAULT_STAGE_TIMEOUT: Duration = Duration::from_secs(120);

/// Immutable description of one worker invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageSpec {
    name: String,
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
    timeout: Duration,
}

impl StageSpec {
    /// Starts building a stage that runs `program`
    pub fn builder(name: impl Into<String>, program: impl Into<String>) -> StageSpecBuilder {
        StageSpecBuilder {
            name: name.into(),
            program: program.into(),
            args: Vec::new(),
            working_dir: PathBuf::from("."),
            timeout: DEFAULT_STAGE_TIMEOUT,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Renders the invocation as a single line for log output
    pub fn command_line(&self) -> String {
        let mut line = self.program.clone();
        for arg in &self.args {
            line.push(' ');
            if arg.is_empty() || arg.contains(char::is_whitespace) {
                line.push_str(&format!("{:?}", arg));
            } else {
                line.push_str(arg);
            }
        }
        line
    }
}

/// Builder for [`StageSpec`]
#[derive(Debug, Clone)]
pub struct StageSpecBuilder {
    name: String,
    program: String,
    args: Vec<String>,
    working_dir: PathBuf,
    timeout: Duration,
}

impl StageSpecBuilder {
    /// Appends one argument
    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Appends several arguments in order
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn working_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_dir = dir.into();
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn build(self) -> StageSpec {
        StageSpec {
            name: self.name,
            program: self.program,
            args: self.args,
            working_dir: self.working_dir,
            timeout: self.timeout,
        }
    }
}
