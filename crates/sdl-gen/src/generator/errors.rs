use std::path::PathBuf;

/// Failure taxonomy for a single generation pass.
///
/// No variant is retried anywhere in the pipeline; every error aborts the
/// current pass and is surfaced to the invoking context. In watch mode a
/// failed pass leaves the dispatcher subscribed, so the next change event
/// starts a fresh pass.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
  /// Required configuration is empty or missing. Raised before any schema
  /// work begins.
  #[error("configuration error: {0}")]
  Configuration(String),

  /// The merged SDL failed grammar or semantic validation, or federation
  /// composition rejected the subgraph document.
  #[error("schema build failed: {0}")]
  SchemaBuild(String),

  /// An optional capability was requested but is not compiled in.
  #[error("capability missing: {0}")]
  CapabilityMissing(String),

  /// The generated output could not be durably written.
  #[error("failed to persist generated definitions to {path}: {source}")]
  Persistence {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

impl GenerateError {
  pub(crate) fn configuration(message: impl Into<String>) -> Self {
    GenerateError::Configuration(message.into())
  }

  pub(crate) fn schema_build(message: impl Into<String>) -> Self {
    GenerateError::SchemaBuild(message.into())
  }

  pub(crate) fn persistence(path: &std::path::Path, source: std::io::Error) -> Self {
    GenerateError::Persistence {
      path: path.to_path_buf(),
      source,
    }
  }
}
