//! Re-runs the pipeline when schema files change on disk.
//!
//! Passes are serialized per output path with a single-slot, latest-wins
//! queue: notifications arriving while a pass is running collapse into at
//! most one follow-up pass, so two passes never interleave their writes.

use std::path::{Component, Path, PathBuf};
use std::time::Duration;

use notify_debouncer_full::notify::{EventKind, RecursiveMode};
use notify_debouncer_full::{new_debouncer, DebounceEventResult};
use tokio::sync::mpsc;

use crate::generator::errors::GenerateError;
use crate::generator::pipeline::{Pipeline, Progress};

const WATCHER_DEBOUNCE_DURATION: Duration = Duration::from_millis(500);

pub struct WatchDispatcher {
  pipeline: Pipeline,
}

impl WatchDispatcher {
  pub fn new(pipeline: Pipeline) -> Self {
    Self { pipeline }
  }

  /// Runs the eager startup pass, then — in watch mode — keeps regenerating
  /// on matching change events for the rest of the process lifetime. A
  /// failed pass is reported and leaves the subscription intact; the next
  /// change event starts a fresh pass.
  pub async fn run(self, progress: &dyn Progress) -> Result<(), GenerateError> {
    if !self.pipeline.config().watch {
      self.pipeline.run_pass(progress).await?;
      return Ok(());
    }

    if let Err(err) = self.pipeline.run_pass(progress).await {
      progress.error(&err.to_string());
    }

    let filter = ChangeFilter::new(&self.pipeline.config().type_paths, &self.pipeline.config().path)?;
    let roots = watch_roots(&self.pipeline.config().type_paths);

    // Capacity 1 is the single-slot queue: a burst of events while a pass
    // runs leaves exactly one token behind.
    let (notifier, mut notifications) = mpsc::channel::<()>(1);
    let mut debouncer = new_debouncer(WATCHER_DEBOUNCE_DURATION, None, move |result: DebounceEventResult| {
      let Ok(events) = result else {
        return;
      };
      let relevant = events
        .iter()
        .any(|event| is_relevant_kind(&event.kind) && event.paths.iter().any(|path| filter.matches(path)));
      if relevant {
        let _ = notifier.try_send(());
      }
    })
    .map_err(|err| GenerateError::configuration(format!("failed to set up the file watcher: {err}")))?;

    let mut watching = 0usize;
    for root in &roots {
      if !root.is_dir() {
        continue;
      }
      debouncer
        .watch(root, RecursiveMode::Recursive)
        .map_err(|err| GenerateError::configuration(format!("failed to watch {}: {err}", root.display())))?;
      watching += 1;
    }
    if watching == 0 {
      return Err(GenerateError::configuration(
        "none of the \"typePaths\" directories exist, nothing to watch",
      ));
    }
    progress.info("Watching schema files for changes...");

    while notifications.recv().await.is_some() {
      progress.info("Schema change detected, regenerating...");
      if let Err(err) = self.pipeline.run_pass(progress).await {
        progress.error(&err.to_string());
      }
    }

    Ok(())
  }
}

fn is_relevant_kind(kind: &EventKind) -> bool {
  matches!(kind, EventKind::Create(_) | EventKind::Modify(_) | EventKind::Remove(_))
}

/// Decides which changed paths re-trigger generation: anything matching a
/// configured pattern, except the output file itself.
struct ChangeFilter {
  patterns: Vec<glob::Pattern>,
  output: PathBuf,
}

impl ChangeFilter {
  fn new(type_paths: &[String], output: &Path) -> Result<Self, GenerateError> {
    let base = std::env::current_dir()
      .map_err(|err| GenerateError::configuration(format!("cannot determine the working directory: {err}")))?;

    let patterns = type_paths
      .iter()
      .map(|pattern| {
        let absolute = absolutize_pattern(&base, pattern);
        glob::Pattern::new(&absolute)
          .map_err(|err| GenerateError::configuration(format!("invalid pattern {pattern:?}: {err}")))
      })
      .collect::<Result<Vec<_>, _>>()?;

    let output = if output.is_absolute() {
      output.to_path_buf()
    } else {
      base.join(output)
    };

    Ok(Self { patterns, output })
  }

  fn matches(&self, path: &Path) -> bool {
    if path == self.output.as_path() {
      return false;
    }
    self.patterns.iter().any(|pattern| pattern.matches_path(path))
  }
}

fn absolutize_pattern(base: &Path, pattern: &str) -> String {
  if Path::new(pattern).is_absolute() {
    pattern.to_string()
  } else {
    let trimmed = pattern.strip_prefix("./").unwrap_or(pattern);
    format!("{}/{trimmed}", base.display())
  }
}

fn has_glob_chars(component: &str) -> bool {
  component.bytes().any(|byte| matches!(byte, b'*' | b'?' | b'[' | b'{'))
}

/// The directory to subscribe for one pattern: everything up to the first
/// glob component.
fn static_prefix(pattern: &str) -> PathBuf {
  let mut prefix = PathBuf::new();
  for component in Path::new(pattern).components() {
    match component {
      Component::Normal(part) if has_glob_chars(&part.to_string_lossy()) => break,
      other => prefix.push(other.as_os_str()),
    }
  }
  // a literal file path is watched through its parent directory
  if !has_glob_chars(pattern) && (prefix.extension().is_some() || prefix.is_file()) {
    prefix.pop();
  }
  if prefix.as_os_str().is_empty() {
    PathBuf::from(".")
  } else {
    prefix
  }
}

fn watch_roots(type_paths: &[String]) -> Vec<PathBuf> {
  let mut roots: Vec<PathBuf> = Vec::new();
  for pattern in type_paths {
    let root = static_prefix(pattern);
    if !roots.contains(&root) {
      roots.push(root);
    }
  }
  roots
}

#[cfg(test)]
mod tests {
  use crate::generator::options::GenerateConfig;
  use crate::generator::pipeline::SilentProgress;

  use super::*;

  #[test]
  fn static_prefix_stops_at_the_first_glob_component() {
    assert_eq!(static_prefix("src/**/*.graphql"), PathBuf::from("src"));
    assert_eq!(static_prefix("/abs/schemas/*.graphql"), PathBuf::from("/abs/schemas"));
    assert_eq!(static_prefix("*.graphql"), PathBuf::from("."));
    assert_eq!(static_prefix("schemas/book.graphql"), PathBuf::from("schemas"));
  }

  #[test]
  fn watch_roots_deduplicates() {
    let roots = watch_roots(&[
      "src/**/*.graphql".to_string(),
      "src/*.gql".to_string(),
      "other/*.graphql".to_string(),
    ]);
    assert_eq!(roots, vec![PathBuf::from("src"), PathBuf::from("other")]);
  }

  #[test]
  fn filter_matches_pattern_paths_but_never_the_output() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    let patterns = vec![format!("{}/**/*.graphql", base.display())];
    let output = base.join("generated/graphql.ts");
    let filter = ChangeFilter::new(&patterns, &output).unwrap();

    assert!(filter.matches(&base.join("schemas/book.graphql")));
    assert!(!filter.matches(&base.join("schemas/book.ts")));
    assert!(!filter.matches(&output));
  }

  #[test]
  fn filter_treats_a_matching_output_path_as_excluded() {
    let dir = tempfile::tempdir().unwrap();
    let base = dir.path();
    let patterns = vec![format!("{}/*.graphql", base.display())];
    // output deliberately placed where the pattern would match it
    let output = base.join("generated.graphql");
    let filter = ChangeFilter::new(&patterns, &output).unwrap();

    assert!(!filter.matches(&output));
    assert!(filter.matches(&base.join("schema.graphql")));
  }

  #[tokio::test]
  async fn non_watch_mode_runs_exactly_one_pass() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("book.graphql"), "type Book { id: ID! }")
      .await
      .unwrap();

    let config = GenerateConfig::new(
      vec![format!("{}/*.graphql", dir.path().display())],
      dir.path().join("graphql.ts"),
    );
    let dispatcher = WatchDispatcher::new(Pipeline::new(config));
    dispatcher.run(&SilentProgress).await.unwrap();
    assert!(dir.path().join("graphql.ts").is_file());
  }

  #[tokio::test]
  async fn watch_mode_regenerates_after_a_schema_change() {
    let dir = tempfile::tempdir().unwrap();
    let schemas = dir.path().join("schemas");
    tokio::fs::create_dir_all(&schemas).await.unwrap();
    tokio::fs::write(schemas.join("book.graphql"), "type Book { id: ID! }")
      .await
      .unwrap();

    let output = dir.path().join("graphql.ts");
    let mut config = GenerateConfig::new(vec![format!("{}/*.graphql", schemas.display())], output.clone());
    config.watch = true;

    let dispatcher = WatchDispatcher::new(Pipeline::new(config));
    let worker = tokio::spawn(async move {
      let progress = SilentProgress;
      let _ = dispatcher.run(&progress).await;
    });

    // wait for the eager pass
    let mut waited = Duration::ZERO;
    while !output.is_file() && waited < Duration::from_secs(10) {
      tokio::time::sleep(Duration::from_millis(100)).await;
      waited += Duration::from_millis(100);
    }
    let first = tokio::fs::read_to_string(&output).await.unwrap();
    assert!(first.contains("export class Book"));

    tokio::fs::write(schemas.join("author.graphql"), "type Author { name: String! }")
      .await
      .unwrap();

    let mut waited = Duration::ZERO;
    let mut regenerated = String::new();
    while waited < Duration::from_secs(15) {
      tokio::time::sleep(Duration::from_millis(200)).await;
      waited += Duration::from_millis(200);
      regenerated = tokio::fs::read_to_string(&output).await.unwrap_or_default();
      if regenerated.contains("Author") {
        break;
      }
    }
    assert!(regenerated.contains("export class Author"), "watch pass did not run");

    worker.abort();
  }
}
