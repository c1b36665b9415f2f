//! Rendering collaborator: turns a unit directory into its built output.
//!
//! Rendering semantics belong to the external build tool; this module only
//! invokes it and surfaces its failures.

use crate::error::{KdepError, Result};
use std::path::Path;
use std::process::Command;

/// Produces the rendered document for the unit in a directory.
pub trait Renderer {
    fn render(&self, dir: &Path) -> Result<String>;
}

/// Runs an external executable (`kustomize build <dir>` by default) and
/// returns its stdout.
#[derive(Debug, Clone)]
pub struct CommandRenderer {
    pub executable: String,
    pub args: Vec<String>,
}

impl Default for CommandRenderer {
    fn default() -> Self {
        Self {
            executable: "kustomize".to_string(),
            args: vec!["build".to_string()],
        }
    }
}

impl CommandRenderer {
    pub fn new(executable: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            executable: executable.into(),
            args,
        }
    }
}

impl Renderer for CommandRenderer {
    fn render(&self, dir: &Path) -> Result<String> {
        tracing::debug!(executable = %self.executable, dir = %dir.display(), "rendering");
        let output = Command::new(&self.executable)
            .args(&self.args)
            .arg(dir)
            .output()
            .map_err(|e| KdepError::Render {
                dir: dir.to_path_buf(),
                message: format!("failed to run {}: {}", self.executable, e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(KdepError::Render {
                dir: dir.to_path_buf(),
                message: format!("{} exited with {}: {}", self.executable, output.status, stderr.trim()),
            });
        }

        String::from_utf8(output.stdout).map_err(|e| KdepError::Render {
            dir: dir.to_path_buf(),
            message: format!("output is not valid UTF-8: {}", e),
        })
    }
}
