use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use cfs_core::errors::{CfsError, ErrorInfo};
use tracing::debug;

/// Lookup side of the result cache, keyed by parameter stamp.
///
/// Stores never write results themselves: artifacts are produced by the
/// runner at [`ResultStore::artifact_path`].
pub trait ResultStore {
    /// Location the runner must write the artifact for `stamp` to.
    fn artifact_path(&self, stamp: &str) -> PathBuf;

    /// Whether an artifact for `stamp` already exists.
    fn contains(&self, stamp: &str) -> Result<bool, CfsError>;

    /// Reads the accuracy recorded for `stamp`.
    fn read(&self, stamp: &str) -> Result<f64, CfsError>;
}

/// File name of the artifact holding the accuracy of a stamp.
pub fn artifact_file_name(stamp: &str) -> String {
    format!("acc-{stamp}.txt")
}

/// Parses the first line of an artifact as a float.
pub fn parse_accuracy(text: &str) -> Result<f64, CfsError> {
    let line = text.lines().next().map(str::trim).unwrap_or_default();
    if line.is_empty() {
        return Err(CfsError::Store(ErrorInfo::new(
            "artifact-empty",
            "result artifact has no value on its first line",
        )));
    }
    line.parse::<f64>().map_err(|err| {
        CfsError::Store(
            ErrorInfo::new("artifact-parse", "result artifact is not a float")
                .with_context("line", line)
                .with_hint(err.to_string()),
        )
    })
}

/// Writes an artifact in the format [`parse_accuracy`] reads.
pub fn write_artifact(path: &Path, accuracy: f64) -> Result<(), CfsError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| store_io("artifact-dir", path, err))?;
    }
    fs::write(path, format!("{accuracy}\n")).map_err(|err| store_io("artifact-write", path, err))
}

fn store_io(code: &str, path: &Path, err: std::io::Error) -> CfsError {
    CfsError::Store(
        ErrorInfo::new(code, err.to_string()).with_context("path", path.display().to_string()),
    )
}

/// Result cache backed by `<root>/acc-<stamp>.txt` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirStore {
    root: PathBuf,
}

impl DirStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Creates the results directory when missing.
    pub fn ensure_root(&self) -> Result<(), CfsError> {
        fs::create_dir_all(&self.root).map_err(|err| store_io("results-dir", &self.root, err))
    }
}

impl ResultStore for DirStore {
    fn artifact_path(&self, stamp: &str) -> PathBuf {
        self.root.join(artifact_file_name(stamp))
    }

    fn contains(&self, stamp: &str) -> Result<bool, CfsError> {
        Ok(self.artifact_path(stamp).is_file())
    }

    fn read(&self, stamp: &str) -> Result<f64, CfsError> {
        let path = self.artifact_path(stamp);
        let text = fs::read_to_string(&path).map_err(|err| store_io("artifact-read", &path, err))?;
        debug!(path = %path.display(), "read result artifact");
        parse_accuracy(&text).map_err(|err| match err {
            CfsError::Store(info) => {
                CfsError::Store(info.with_context("path", path.display().to_string()))
            }
            other => other,
        })
    }
}

/// In-memory stand-in for [`DirStore`].
///
/// Clones share the same entries, so a fake runner holding a clone can
/// publish results the evaluator then reads.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, stamp: impl Into<String>, accuracy: f64) {
        self.insert_raw(stamp, format!("{accuracy}\n"));
    }

    /// Stores arbitrary artifact text, e.g. to exercise parse failures.
    pub fn insert_raw(&self, stamp: impl Into<String>, text: impl Into<String>) {
        self.entries.borrow_mut().insert(stamp.into(), text.into());
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn stamps(&self) -> Vec<String> {
        self.entries.borrow().keys().cloned().collect()
    }
}

impl ResultStore for MemoryStore {
    fn artifact_path(&self, stamp: &str) -> PathBuf {
        PathBuf::from(artifact_file_name(stamp))
    }

    fn contains(&self, stamp: &str) -> Result<bool, CfsError> {
        Ok(self.entries.borrow().contains_key(stamp))
    }

    fn read(&self, stamp: &str) -> Result<f64, CfsError> {
        let entries = self.entries.borrow();
        let text = entries.get(stamp).ok_or_else(|| {
            CfsError::Store(
                ErrorInfo::new("artifact-missing", "no result recorded for stamp")
                    .with_context("stamp", stamp),
            )
        })?;
        parse_accuracy(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_reads_only_the_first_line() {
        assert_eq!(parse_accuracy("93.25\nignored\n").unwrap(), 93.25);
        assert_eq!(parse_accuracy("  0.5  ").unwrap(), 0.5);
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(parse_accuracy("").unwrap_err().info().code, "artifact-empty");
        assert_eq!(
            parse_accuracy("accuracy: high").unwrap_err().info().code,
            "artifact-parse"
        );
    }

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.insert("s1", 0.75);
        assert!(store.contains("s1").unwrap());
        assert_eq!(store.read("s1").unwrap(), 0.75);
        assert_eq!(store.read("s2").unwrap_err().info().code, "artifact-missing");
    }
}
