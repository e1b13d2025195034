use chrono::{Local, Timelike};
use crossterm::style::Stylize;

use crate::generator::options::GenerateConfig;
use crate::generator::pipeline::{PassSummary, Pipeline, Progress};
use crate::generator::watch::WatchDispatcher;
use crate::ui::{Colors, GenerateCommand};

fn format_timestamp() -> String {
  let now = Local::now();
  format!("[{:02}:{:02}:{:02}]", now.hour(), now.minute(), now.second())
}

/// Builds the pipeline configuration from the command line, starting from
/// the `--config` JSON object when given and letting individual flags
/// override it.
pub fn resolve_config(command: GenerateCommand) -> anyhow::Result<GenerateConfig> {
  let GenerateCommand {
    type_paths,
    output,
    config,
    output_as,
    watch,
    quiet,
    federation,
    type_defs,
    emit_typename_field,
    skip_resolver_args,
    enums_as_types,
    default_scalar_type,
    scalar_map,
    type_map,
    additional_header,
  } = command;

  let mut resolved = match config {
    Some(config_path) => {
      let text = std::fs::read_to_string(&config_path)
        .map_err(|err| anyhow::anyhow!("cannot read config file {}: {err}", config_path.display()))?;
      serde_json::from_str::<GenerateConfig>(&text)
        .map_err(|err| anyhow::anyhow!("invalid config file {}: {err}", config_path.display()))?
    }
    None => {
      let Some(output) = output.clone() else {
        anyhow::bail!("Output path (-o) is required unless --config provides \"path\"");
      };
      GenerateConfig::new(Vec::new(), output)
    }
  };

  if !type_paths.is_empty() {
    resolved.type_paths = type_paths;
  }
  if let Some(output) = output {
    resolved.path = output;
  }
  if let Some(output_as) = output_as {
    resolved.output_as = output_as;
  }
  if watch {
    resolved.watch = true;
  }
  if quiet {
    resolved.debug = false;
  }
  if federation {
    resolved.federation = true;
  }
  if let Some(type_defs) = type_defs {
    resolved.type_defs = Some(type_defs);
  }
  if emit_typename_field {
    resolved.options.emit_typename_field = true;
  }
  if skip_resolver_args {
    resolved.options.skip_resolver_args = true;
  }
  if enums_as_types {
    resolved.options.enums_as_types = true;
  }
  if let Some(default_scalar_type) = default_scalar_type {
    resolved.options.default_scalar_type = default_scalar_type;
  }
  for (name, target) in parse_mappings(scalar_map)? {
    resolved.options.custom_scalar_type_mapping.insert(name, target);
  }
  for (name, target) in parse_mappings(type_map)? {
    resolved.options.default_type_mapping.insert(name, target);
  }
  if let Some(additional_header) = additional_header {
    resolved.options.additional_header = Some(additional_header);
  }

  Ok(resolved)
}

fn parse_mappings(entries: Option<Vec<String>>) -> anyhow::Result<Vec<(String, String)>> {
  let Some(entries) = entries else {
    return Ok(Vec::new());
  };

  let mut mappings = Vec::new();
  for entry in entries {
    let (name, target) = entry.split_once('=').ok_or_else(|| {
      anyhow::anyhow!("Invalid mapping format '{entry}': expected NAME=TYPE (e.g., DateTime=Date)")
    })?;
    mappings.push((name.to_string(), target.to_string()));
  }
  Ok(mappings)
}

pub struct GenerateLogger<'a> {
  debug: bool,
  colors: &'a Colors,
}

impl<'a> GenerateLogger<'a> {
  pub fn new(debug: bool, colors: &'a Colors) -> Self {
    Self { debug, colors }
  }

  fn stat(&self, label: &str, value: String) {
    if self.debug {
      println!(
        "            {:<25} {}",
        label.with(self.colors.label()),
        value.with(self.colors.value())
      );
    }
  }

  fn print_statistics(&self, summary: &PassSummary) {
    self.stat("Declarations generated:", summary.declarations.to_string());
    self.stat("", format!("{} object types", summary.objects));
    if summary.interfaces > 0 {
      self.stat("", format!("{} interfaces", summary.interfaces));
    }
    if summary.enums > 0 {
      self.stat("", format!("{} enums", summary.enums));
    }
    if summary.unions > 0 {
      self.stat("", format!("{} unions", summary.unions));
    }
    if summary.inputs > 0 {
      self.stat("", format!("{} input types", summary.inputs));
    }
    if summary.scalars > 0 {
      self.stat("", format!("{} scalars", summary.scalars));
    }
    self.stat("Bytes written:", summary.bytes_written.to_string());
  }

  fn log_success(&self) {
    if self.debug {
      println!();
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        "Successfully generated TypeScript definitions".with(self.colors.success())
      );
    }
  }
}

impl Progress for GenerateLogger<'_> {
  fn info(&self, message: &str) {
    if self.debug {
      println!(
        "{} {}",
        format_timestamp().with(self.colors.timestamp()),
        message.with(self.colors.primary())
      );
    }
  }

  fn error(&self, message: &str) {
    eprintln!(
      "{} {}",
      "Error:".with(self.colors.error()),
      message.with(self.colors.primary())
    );
  }
}

pub async fn generate_definitions(config: GenerateConfig, colors: &Colors) -> anyhow::Result<()> {
  let logger = GenerateLogger::new(config.debug, colors);

  if config.watch {
    // lives for the process lifetime, re-running the pipeline on changes
    WatchDispatcher::new(Pipeline::new(config)).run(&logger).await?;
    return Ok(());
  }

  let pipeline = Pipeline::new(config);
  let summary = pipeline.run_pass(&logger).await?;
  logger.print_statistics(&summary);
  logger.log_success();
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn bare_command() -> GenerateCommand {
    GenerateCommand {
      type_paths: vec!["schemas/*.graphql".to_string()],
      output: Some("graphql.ts".into()),
      config: None,
      output_as: None,
      watch: false,
      quiet: false,
      federation: false,
      type_defs: None,
      emit_typename_field: false,
      skip_resolver_args: false,
      enums_as_types: false,
      default_scalar_type: None,
      scalar_map: None,
      type_map: None,
      additional_header: None,
    }
  }

  #[test]
  fn parse_mappings_none() {
    assert!(parse_mappings(None).unwrap().is_empty());
  }

  #[test]
  fn parse_mappings_single_entry() {
    let mappings = parse_mappings(Some(vec!["DateTime=Date".to_string()])).unwrap();
    assert_eq!(mappings, vec![("DateTime".to_string(), "Date".to_string())]);
  }

  #[test]
  fn parse_mappings_invalid_format() {
    let err = parse_mappings(Some(vec!["DateTime".to_string()])).unwrap_err();
    assert!(err.to_string().contains("Invalid mapping format"));
  }

  #[test]
  fn parse_mappings_keeps_equals_in_target() {
    let mappings = parse_mappings(Some(vec!["JSON=Record<string, unknown>".to_string()])).unwrap();
    assert_eq!(mappings[0].1, "Record<string, unknown>");
  }

  #[test]
  fn resolve_config_requires_an_output_path() {
    let mut command = bare_command();
    command.output = None;
    let err = resolve_config(command).unwrap_err();
    assert!(err.to_string().contains("Output path"));
  }

  #[test]
  fn resolve_config_maps_quiet_to_debug() {
    let mut command = bare_command();
    command.quiet = true;
    let config = resolve_config(command).unwrap();
    assert!(!config.debug);
  }

  #[test]
  fn resolve_config_flags_override_config_file() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = dir.path().join("codegen.json");
    std::fs::write(
      &config_path,
      r#"{ "typePaths": ["a/*.graphql"], "path": "from-file.ts", "outputAs": "interface" }"#,
    )
    .unwrap();

    let mut command = bare_command();
    command.config = Some(config_path);
    command.type_paths = Vec::new();
    command.output = Some("from-flag.ts".into());

    let config = resolve_config(command).unwrap();
    assert_eq!(config.type_paths, vec!["a/*.graphql".to_string()]);
    assert_eq!(config.path, std::path::PathBuf::from("from-flag.ts"));
    assert_eq!(config.output_as, crate::generator::options::OutputAs::Interface);
  }

  #[test]
  fn resolve_config_collects_scalar_mappings() {
    let mut command = bare_command();
    command.scalar_map = Some(vec!["DateTime=Date".to_string(), "Blob=Uint8Array".to_string()]);
    command.type_map = Some(vec!["ID=number".to_string()]);

    let config = resolve_config(command).unwrap();
    assert_eq!(
      config.options.custom_scalar_type_mapping.get("DateTime"),
      Some(&"Date".to_string())
    );
    assert_eq!(
      config.options.custom_scalar_type_mapping.get("Blob"),
      Some(&"Uint8Array".to_string())
    );
    assert_eq!(config.options.default_type_mapping.get("ID"), Some(&"number".to_string()));
  }
}
