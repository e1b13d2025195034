use std::path::PathBuf;

use clap::ValueEnum;
use indexmap::IndexMap;
use serde::Deserialize;

/// Whether object-like GraphQL types are emitted as TypeScript classes or
/// interfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputAs {
  #[default]
  Class,
  Interface,
}

/// Knobs that shape the declaration AST and its rendering. Resolved once per
/// invocation and passed unchanged through the whole pipeline.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GenerationOptions {
  /// Inject a `__typename` string-literal member into every object type.
  pub emit_typename_field: bool,
  /// Emit fields with arguments as plain properties instead of method
  /// signatures.
  pub skip_resolver_args: bool,
  /// Target type used for custom scalars without an explicit mapping.
  pub default_scalar_type: String,
  /// Custom scalar name to target type, e.g. `DateTime` -> `Date`.
  pub custom_scalar_type_mapping: IndexMap<String, String>,
  /// Overrides for the built-in scalar mapping, e.g. `ID` -> `number`.
  pub default_type_mapping: IndexMap<String, String>,
  /// Verbatim text placed right after the generated-file banner.
  pub additional_header: Option<String>,
  /// Render enums as string-literal union types instead of TS enums.
  pub enums_as_types: bool,
}

pub(crate) const DEFAULT_SCALAR_TYPE: &str = "any";

impl Default for GenerationOptions {
  fn default() -> Self {
    Self {
      emit_typename_field: false,
      skip_resolver_args: false,
      default_scalar_type: DEFAULT_SCALAR_TYPE.to_string(),
      custom_scalar_type_mapping: IndexMap::new(),
      default_type_mapping: IndexMap::new(),
      additional_header: None,
      enums_as_types: false,
    }
  }
}

fn default_debug() -> bool {
  true
}

/// The full invocation contract of one `generate` run. Deserializable from a
/// JSON configuration object with camelCase keys; the generation option block
/// sits at the same level as the rest of the keys.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateConfig {
  /// Glob patterns for the schema file groups, in significance order.
  pub type_paths: Vec<String>,
  /// Output file path for the generated definitions.
  pub path: PathBuf,
  #[serde(default)]
  pub output_as: OutputAs,
  #[serde(default)]
  pub watch: bool,
  #[serde(default = "default_debug")]
  pub debug: bool,
  #[serde(default)]
  pub federation: bool,
  /// Inline SDL fragments appended after the file-derived text.
  #[serde(default)]
  pub type_defs: Option<Vec<String>>,
  #[serde(flatten)]
  pub options: GenerationOptions,
}

impl GenerateConfig {
  pub fn new(type_paths: Vec<String>, path: impl Into<PathBuf>) -> Self {
    Self {
      type_paths,
      path: path.into(),
      output_as: OutputAs::default(),
      watch: false,
      debug: true,
      federation: false,
      type_defs: None,
      options: GenerationOptions::default(),
    }
  }
}
