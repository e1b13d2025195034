//! Optional federated-composition capability.
//!
//! Composition is an injected capability behind the `federation` cargo
//! feature rather than a hard dependency. Builds without the feature still
//! run the Regular strategy; requesting the Federated strategy then fails
//! with a typed [`GenerateError::CapabilityMissing`] instead of degrading to
//! the Regular path.

use crate::generator::errors::GenerateError;

/// Discovery half of the capability: answers whether composition is
/// compiled in and hands out the composer when it is.
pub trait FederationProvider: Send + Sync {
  fn is_available(&self) -> bool;
  fn load(&self) -> Result<Box<dyn FederationCapability>, GenerateError>;
}

/// The composition capability itself.
pub trait FederationCapability: Send + Sync + std::fmt::Debug {
  /// Treats `sdl` as one subgraph document, composes it, and returns the
  /// federation-augmented SDL.
  fn compose_subgraph(&self, subgraph_name: &str, sdl: &str) -> Result<String, GenerateError>;
}

/// Provider used by builds without the `federation` feature, and by tests
/// that exercise the capability-missing path.
pub struct UnavailableProvider;

impl FederationProvider for UnavailableProvider {
  fn is_available(&self) -> bool {
    false
  }

  fn load(&self) -> Result<Box<dyn FederationCapability>, GenerateError> {
    Err(GenerateError::CapabilityMissing(
      "federated schema composition is not part of this build; reinstall sdl-gen with the \"federation\" feature"
        .to_string(),
    ))
  }
}

/// The provider matching this build's compiled-in capabilities.
pub fn default_provider() -> Box<dyn FederationProvider> {
  #[cfg(feature = "federation")]
  {
    Box::new(composition::ComposerProvider)
  }
  #[cfg(not(feature = "federation"))]
  {
    Box::new(UnavailableProvider)
  }
}

#[cfg(feature = "federation")]
mod composition {
  use itertools::Itertools;

  use super::{FederationCapability, FederationProvider};
  use crate::generator::errors::GenerateError;

  pub(super) struct ComposerProvider;

  impl FederationProvider for ComposerProvider {
    fn is_available(&self) -> bool {
      true
    }

    fn load(&self) -> Result<Box<dyn FederationCapability>, GenerateError> {
      Ok(Box::new(Composer))
    }
  }

  #[derive(Debug)]
  struct Composer;

  impl FederationCapability for Composer {
    fn compose_subgraph(&self, subgraph_name: &str, sdl: &str) -> Result<String, GenerateError> {
      let parsed = cynic_parser::parse_type_system_document(sdl)
        .map_err(|err| GenerateError::schema_build(format!("failed to parse subgraph document: {err}")))?;

      let mut subgraphs = graphql_composition::Subgraphs::default();
      subgraphs.ingest(&parsed, subgraph_name, None);

      match graphql_composition::compose(subgraphs).into_result() {
        Ok(federated_graph) => graphql_composition::render_federated_sdl(&federated_graph)
          .map_err(|err| GenerateError::schema_build(format!("failed to render the federated schema: {err}"))),
        Err(diagnostics) => Err(GenerateError::schema_build(diagnostics.iter_messages().join("\n"))),
      }
    }
  }
}
