use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use super::colors::{ColorMode, ThemeMode};
use crate::generator::options::OutputAs;

#[derive(Parser, Debug)]
#[command(name = "sdl-gen")]
#[command(author, version, about = "GraphQL SDL to TypeScript definitions generator")]
pub struct Cli {
  #[command(subcommand)]
  pub command: Commands,

  /// Control color output
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub color: ColorMode,

  /// Terminal theme (dark or light background)
  #[arg(long, value_enum, default_value = "auto", global = true)]
  pub theme: ThemeMode,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
  /// List information from the configured schema files
  List {
    #[command(subcommand)]
    list_command: ListCommands,
  },
  /// Generate TypeScript definitions from GraphQL schema files
  Generate(GenerateCommand),
}

#[derive(Args, Debug)]
pub struct GenerateCommand {
  /// Glob patterns for the schema files, in merge order
  #[arg(short = 't', long = "type-paths", value_name = "GLOB", num_args = 1..)]
  pub type_paths: Vec<String>,

  /// Path where the generated definitions will be written
  #[arg(short, long, value_name = "FILE")]
  pub output: Option<PathBuf>,

  /// JSON file holding the full configuration object; flags override it
  #[arg(short, long, value_name = "FILE")]
  pub config: Option<PathBuf>,

  /// Emit object types as classes or interfaces
  #[arg(long, value_enum, value_name = "KIND")]
  pub output_as: Option<OutputAs>,

  /// Keep running and regenerate whenever a schema file changes
  #[arg(short, long, default_value_t = false)]
  pub watch: bool,

  /// Suppress progress output (errors only)
  #[arg(short, long, default_value_t = false)]
  pub quiet: bool,

  /// Build the schema as a federation subgraph
  #[arg(long, default_value_t = false)]
  pub federation: bool,

  /// Inline SDL fragments appended after the file-derived schema
  #[arg(long = "type-defs", value_name = "SDL")]
  pub type_defs: Option<Vec<String>>,

  /// Add a __typename member to every object type
  #[arg(long, default_value_t = false)]
  pub emit_typename_field: bool,

  /// Emit fields with arguments as plain properties instead of methods
  #[arg(long, default_value_t = false)]
  pub skip_resolver_args: bool,

  /// Render enums as string-literal union types
  #[arg(long, default_value_t = false)]
  pub enums_as_types: bool,

  /// Target type for custom scalars without an explicit mapping
  #[arg(long, value_name = "TYPE")]
  pub default_scalar_type: Option<String>,

  /// Map a custom scalar to a target type (repeatable)
  #[arg(long = "scalar-map", value_name = "NAME=TYPE")]
  pub scalar_map: Option<Vec<String>>,

  /// Override a built-in scalar's target type (repeatable)
  #[arg(long = "type-map", value_name = "NAME=TYPE")]
  pub type_map: Option<Vec<String>>,

  /// Verbatim header text placed below the generated banner
  #[arg(long, value_name = "TEXT")]
  pub additional_header: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum ListCommands {
  /// List all named types defined by the schema files
  Types {
    /// Glob patterns for the schema files
    #[arg(short = 't', long = "type-paths", value_name = "GLOB", num_args = 1.., required = true)]
    type_paths: Vec<String>,
  },
}
