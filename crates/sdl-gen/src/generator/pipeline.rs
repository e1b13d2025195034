//! One generation pass, end to end.
//!
//! Every pass rebuilds its state from scratch: merged SDL, canonical schema
//! and declaration AST are pass-local and dropped once the output is
//! written. Only the configuration lives for the process lifetime.

use crate::generator::ast::{DeclarationKind, DefinitionsFile};
use crate::generator::errors::GenerateError;
use crate::generator::normalizer::FederationProvider;
use crate::generator::options::GenerateConfig;
use crate::generator::{emitter, explorer, loader, normalizer};

/// Progress reporting collaborator. Messages are informational only and are
/// never the channel through which errors are reported; failures travel
/// through the returned [`GenerateError`].
pub trait Progress: Send + Sync {
  fn info(&self, message: &str);
  fn error(&self, message: &str);
}

/// Reporter for library callers and tests.
pub struct SilentProgress;

impl Progress for SilentProgress {
  fn info(&self, _message: &str) {}
  fn error(&self, _message: &str) {}
}

/// What a finished pass produced, for status output.
#[derive(Debug, Default, Clone, Copy)]
pub struct PassSummary {
  pub declarations: usize,
  pub objects: usize,
  pub interfaces: usize,
  pub enums: usize,
  pub unions: usize,
  pub inputs: usize,
  pub scalars: usize,
  pub bytes_written: usize,
}

impl PassSummary {
  fn of(file: &DefinitionsFile, bytes_written: usize) -> Self {
    let mut summary = PassSummary {
      declarations: file.declarations.len(),
      bytes_written,
      ..PassSummary::default()
    };
    for declaration in &file.declarations {
      match &declaration.kind {
        DeclarationKind::Object { .. } => summary.objects += 1,
        DeclarationKind::Interface { .. } => summary.interfaces += 1,
        DeclarationKind::Enum { .. } => summary.enums += 1,
        DeclarationKind::Union { .. } => summary.unions += 1,
        DeclarationKind::Input { .. } => summary.inputs += 1,
        DeclarationKind::Scalar { .. } => summary.scalars += 1,
      }
    }
    summary
  }
}

pub struct Pipeline {
  config: GenerateConfig,
  federation_provider: Box<dyn FederationProvider>,
}

impl Pipeline {
  pub fn new(config: GenerateConfig) -> Self {
    Self::with_provider(config, normalizer::default_provider())
  }

  pub fn with_provider(config: GenerateConfig, federation_provider: Box<dyn FederationProvider>) -> Self {
    Self {
      config,
      federation_provider,
    }
  }

  pub fn config(&self) -> &GenerateConfig {
    &self.config
  }

  /// Loader -> Normalizer -> Explorer -> Emitter, strictly in that order.
  /// Any failure aborts the pass; nothing is retried.
  pub async fn run_pass(&self, progress: &dyn Progress) -> Result<PassSummary, GenerateError> {
    progress.info("Merging schema sources...");
    let merged_sdl = loader::load_merged_sdl(&self.config.type_paths, self.config.type_defs.as_deref()).await?;

    progress.info(if self.config.federation {
      "Composing federated schema..."
    } else {
      "Building executable schema..."
    });
    let canonical_sdl = normalizer::normalize(
      &merged_sdl,
      self.config.federation,
      self.federation_provider.as_ref(),
      &self.subgraph_name(),
    )?;

    progress.info("Exploring schema declarations...");
    let definitions = explorer::explore(
      &canonical_sdl,
      &self.config.options,
      self.config.output_as,
      self.config.federation,
    )?;

    let bytes_written = emitter::emit(
      &definitions,
      self.config.options.additional_header.as_deref(),
      &self.config.path,
    )
    .await?;
    progress.info(&format!(
      "Wrote {} declarations to {}",
      definitions.declarations.len(),
      self.config.path.display()
    ));

    Ok(PassSummary::of(&definitions, bytes_written))
  }

  fn subgraph_name(&self) -> String {
    self
      .config
      .path
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_else(|| "graph".to_string())
  }
}
