//! Error types for graph construction and resolution.

use std::path::PathBuf;

/// Errors raised while reading units, building the reference graph, or
/// climbing it.
#[derive(Debug, thiserror::Error)]
pub enum KdepError {
    #[error("no kustomization file found in {}", dir.display())]
    ConfigNotFound { dir: PathBuf },

    #[error(
        "referenced directory {} has no kustomization file (referenced by {})",
        dir.display(),
        referenced_by.display()
    )]
    MissingNestedConfig { dir: PathBuf, referenced_by: PathBuf },

    #[error("failed to parse {}: {source}", path.display())]
    MalformedConfig {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("filesystem error at {}: {source}", path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cyclic reference: {}", chain.join(" -> "))]
    CyclicReference { chain: Vec<String> },

    #[error("failed to render {}: {message}", dir.display())]
    Render { dir: PathBuf, message: String },

    #[error("invalid pattern {pattern:?}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

impl KdepError {
    pub(crate) fn fs(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Short machine-friendly name of the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::ConfigNotFound { .. } => "config_not_found",
            Self::MissingNestedConfig { .. } => "missing_nested_config",
            Self::MalformedConfig { .. } => "malformed_config",
            Self::Filesystem { .. } => "filesystem_error",
            Self::CyclicReference { .. } => "cyclic_reference",
            Self::Render { .. } => "render_error",
            Self::InvalidPattern { .. } => "invalid_pattern",
        }
    }
}

impl From<walkdir::Error> for KdepError {
    fn from(err: walkdir::Error) -> Self {
        let path = err.path().map(PathBuf::from).unwrap_or_default();
        let source = err
            .into_io_error()
            .unwrap_or_else(|| std::io::Error::other("filesystem loop detected"));
        Self::Filesystem { path, source }
    }
}

pub type Result<T> = std::result::Result<T, KdepError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_message_shows_chain() {
        let err = KdepError::CyclicReference {
            chain: vec![
                "a/kustomization.yaml".to_string(),
                "b/kustomization.yaml".to_string(),
                "a/kustomization.yaml".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "cyclic reference: a/kustomization.yaml -> b/kustomization.yaml -> a/kustomization.yaml"
        );
        assert_eq!(err.kind(), "cyclic_reference");
    }

    #[test]
    fn test_config_not_found_names_dir() {
        let err = KdepError::ConfigNotFound {
            dir: PathBuf::from("overlays/prod"),
        };
        assert!(err.to_string().contains("overlays/prod"));
    }
}
