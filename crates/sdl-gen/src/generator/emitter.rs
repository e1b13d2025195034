//! Serializes the declaration AST and persists it durably.

use std::path::Path;

use itertools::Itertools;

use crate::generator::ast::DefinitionsFile;
use crate::generator::errors::GenerateError;

const BANNER: &str = "\
/*
 * -------------------------------------------------------
 * THIS FILE WAS AUTOMATICALLY GENERATED (DO NOT MODIFY)
 * -------------------------------------------------------
 */
";

const NULLABLE_HELPER: &str = "type Nullable<T> = T | null;";

/// Renders the full output text. Serialization is pure and happens entirely
/// in memory, so a failing declaration can never leave a half-written file.
pub fn render(file: &DefinitionsFile, additional_header: Option<&str>) -> String {
  let mut out = String::from(BANNER);

  if let Some(header) = additional_header {
    out.push_str(header);
    if !header.ends_with('\n') {
      out.push('\n');
    }
  }

  if !file.declarations.is_empty() {
    out.push('\n');
    out.push_str(&file.declarations.iter().map(ToString::to_string).join("\n\n"));
    out.push('\n');
  }

  if file.uses_nullable {
    out.push('\n');
    out.push_str(NULLABLE_HELPER);
    out.push('\n');
  }

  out
}

/// Writes the rendered text to `path`, overwriting previous output. The text
/// lands in a sibling temporary file first and is renamed into place, so the
/// destination either keeps its old content or receives the new content in
/// full.
pub async fn emit(
  file: &DefinitionsFile,
  additional_header: Option<&str>,
  path: &Path,
) -> Result<usize, GenerateError> {
  let rendered = render(file, additional_header);
  persist(&rendered, path).await?;
  Ok(rendered.len())
}

async fn persist(contents: &str, path: &Path) -> Result<(), GenerateError> {
  if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
    tokio::fs::create_dir_all(parent)
      .await
      .map_err(|err| GenerateError::persistence(path, err))?;
  }

  let file_name = path
    .file_name()
    .ok_or_else(|| GenerateError::configuration(format!("output path {} has no file name", path.display())))?;
  let mut staging_name = std::ffi::OsString::from(".");
  staging_name.push(file_name);
  staging_name.push(".tmp");
  let staging = path.with_file_name(staging_name);

  if let Err(err) = tokio::fs::write(&staging, contents).await {
    return Err(GenerateError::persistence(path, err));
  }
  if let Err(err) = tokio::fs::rename(&staging, path).await {
    let _ = tokio::fs::remove_file(&staging).await;
    return Err(GenerateError::persistence(path, err));
  }

  Ok(())
}
