//! Merges schema file groups and inline fragments into one SDL string.

use crate::generator::errors::GenerateError;

/// Resolves every pattern group to its matching files, reads them, and
/// concatenates the contents in group order, followed by the inline
/// fragments. Matches within a group are sorted so the merged result is
/// stable across runs.
///
/// Pattern groups may match zero files; that group simply contributes
/// nothing. An empty group specification is a configuration error, checked
/// before any file I/O.
pub async fn load_merged_sdl(type_paths: &[String], type_defs: Option<&[String]>) -> Result<String, GenerateError> {
  if type_paths.is_empty() {
    return Err(GenerateError::configuration(
      "\"typePaths\" must contain at least one pattern",
    ));
  }

  let mut merged = String::new();

  for pattern in type_paths {
    let entries =
      glob::glob(pattern).map_err(|err| GenerateError::configuration(format!("invalid pattern {pattern:?}: {err}")))?;

    let mut paths = Vec::new();
    for entry in entries {
      let path =
        entry.map_err(|err| GenerateError::configuration(format!("cannot resolve pattern {pattern:?}: {err}")))?;
      if path.is_file() {
        paths.push(path);
      }
    }
    paths.sort();

    for path in paths {
      let contents = tokio::fs::read_to_string(&path)
        .await
        .map_err(|err| GenerateError::configuration(format!("cannot read schema file {}: {err}", path.display())))?;
      push_fragment(&mut merged, &contents);
    }
  }

  for fragment in type_defs.unwrap_or_default() {
    push_fragment(&mut merged, fragment);
  }

  if merged.trim().is_empty() {
    return Err(GenerateError::configuration(
      "no type definitions were found with the provided \"typePaths\" and \"typeDefs\"",
    ));
  }

  Ok(merged)
}

fn push_fragment(merged: &mut String, fragment: &str) {
  if !merged.is_empty() && !merged.ends_with('\n') {
    merged.push('\n');
  }
  merged.push_str(fragment);
}

#[cfg(test)]
mod tests {
  use std::path::Path;

  use super::*;

  async fn write(dir: &Path, name: &str, contents: &str) {
    tokio::fs::write(dir.join(name), contents).await.unwrap();
  }

  fn pattern(dir: &Path, tail: &str) -> String {
    format!("{}/{tail}", dir.display())
  }

  #[tokio::test]
  async fn empty_type_paths_fail_before_any_io() {
    let err = load_merged_sdl(&[], None).await.unwrap_err();
    assert!(matches!(err, GenerateError::Configuration(_)));
  }

  #[tokio::test]
  async fn merges_groups_in_order_then_fragments() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.graphql", "type A { id: ID! }").await;
    write(dir.path(), "b.graphql", "type B { id: ID! }").await;

    let patterns = vec![pattern(dir.path(), "b.graphql"), pattern(dir.path(), "a.graphql")];
    let fragments = vec!["type C { id: ID! }".to_string()];
    let merged = load_merged_sdl(&patterns, Some(&fragments)).await.unwrap();

    let b = merged.find("type B").unwrap();
    let a = merged.find("type A").unwrap();
    let c = merged.find("type C").unwrap();
    assert!(b < a && a < c, "group order then fragment order: {merged}");
  }

  #[tokio::test]
  async fn group_order_is_significant() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "a.graphql", "type A { id: ID! }").await;
    write(dir.path(), "b.graphql", "type B { id: ID! }").await;

    let forward = vec![pattern(dir.path(), "a.graphql"), pattern(dir.path(), "b.graphql")];
    let backward = vec![pattern(dir.path(), "b.graphql"), pattern(dir.path(), "a.graphql")];

    let merged_forward = load_merged_sdl(&forward, None).await.unwrap();
    let merged_backward = load_merged_sdl(&backward, None).await.unwrap();
    assert_ne!(merged_forward, merged_backward);
  }

  #[tokio::test]
  async fn matches_within_a_group_are_sorted() {
    let dir = tempfile::tempdir().unwrap();
    write(dir.path(), "z.graphql", "type Z { id: ID! }").await;
    write(dir.path(), "a.graphql", "type A { id: ID! }").await;

    let merged = load_merged_sdl(&[pattern(dir.path(), "*.graphql")], None).await.unwrap();
    assert!(merged.find("type A").unwrap() < merged.find("type Z").unwrap());
  }

  #[tokio::test]
  async fn zero_matches_is_not_an_error_when_fragments_exist() {
    let dir = tempfile::tempdir().unwrap();
    let fragments = vec!["type Lonely { id: ID! }".to_string()];
    let merged = load_merged_sdl(&[pattern(dir.path(), "*.graphql")], Some(&fragments))
      .await
      .unwrap();
    assert!(merged.contains("Lonely"));
  }

  #[tokio::test]
  async fn empty_merge_result_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = load_merged_sdl(&[pattern(dir.path(), "*.graphql")], None).await.unwrap_err();
    assert!(matches!(err, GenerateError::Configuration(_)));
  }
}
