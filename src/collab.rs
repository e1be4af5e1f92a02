//! Collaborators the engine talks to but never depends on for ranking:
//! working-directory context, search history and AI suggestions.

use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Supplies additive context boosts for the current environment.
pub trait ContextAnalyzer: Send + Sync {
    fn context_boosts(&self) -> BTreeMap<String, f32>;

    /// Short label for history records, empty when nothing was detected.
    fn describe(&self) -> String;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ProjectKind {
    Git,
    Docker,
    Node,
    Python,
    Go,
    Rust,
    Make,
}

impl ProjectKind {
    fn from_marker(file_name: &str) -> Option<Self> {
        Some(match file_name {
            ".git" => Self::Git,
            "Dockerfile" | "docker-compose.yml" | "docker-compose.yaml" => Self::Docker,
            "package.json" => Self::Node,
            "requirements.txt" | "pyproject.toml" | "setup.py" => Self::Python,
            "go.mod" => Self::Go,
            "Cargo.toml" => Self::Rust,
            "Makefile" => Self::Make,
            _ => return None,
        })
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Docker => "docker",
            Self::Node => "node",
            Self::Python => "python",
            Self::Go => "go",
            Self::Rust => "rust",
            Self::Make => "make",
        }
    }

    fn boosts(self) -> &'static [(&'static str, f32)] {
        match self {
            Self::Git => &[
                ("git", 2.0),
                ("commit", 1.5),
                ("branch", 1.5),
                ("merge", 1.5),
                ("pull", 1.5),
                ("push", 1.5),
                ("clone", 1.5),
                ("checkout", 1.5),
            ],
            Self::Docker => &[
                ("docker", 2.0),
                ("container", 1.8),
                ("image", 1.5),
                ("compose", 1.5),
                ("build", 1.3),
                ("run", 1.3),
            ],
            Self::Node => &[
                ("npm", 2.0),
                ("yarn", 2.0),
                ("node", 1.8),
                ("javascript", 1.5),
                ("package", 1.3),
                ("install", 1.3),
            ],
            Self::Python => &[
                ("python", 2.0),
                ("pip", 2.0),
                ("venv", 1.5),
                ("virtual", 1.5),
                ("requirements", 1.3),
            ],
            Self::Go => &[("go", 2.0), ("mod", 1.8), ("build", 1.5), ("test", 1.5), ("run", 1.3)],
            Self::Rust => &[("cargo", 2.0), ("rust", 1.8), ("build", 1.5), ("test", 1.5)],
            Self::Make => &[("make", 1.8), ("compile", 1.5), ("build", 1.5)],
        }
    }
}

/// Looks for project marker files in one directory.
#[derive(Debug, Clone, Default)]
pub struct DirectoryContext {
    kinds: Vec<ProjectKind>,
}

impl DirectoryContext {
    /// Unreadable directories yield an empty context.
    pub fn analyze(dir: &Path) -> Self {
        let mut kinds: Vec<ProjectKind> = match fs::read_dir(dir) {
            Ok(entries) => entries
                .filter_map(|e| e.ok())
                .filter_map(|e| ProjectKind::from_marker(&e.file_name().to_string_lossy()))
                .collect(),
            Err(e) => {
                debug!(dir = %dir.display(), "context analysis skipped: {e}");
                Vec::new()
            }
        };
        kinds.sort();
        kinds.dedup();
        Self { kinds }
    }

    pub fn from_kinds(mut kinds: Vec<ProjectKind>) -> Self {
        kinds.sort();
        kinds.dedup();
        Self { kinds }
    }

    pub fn kinds(&self) -> &[ProjectKind] {
        &self.kinds
    }
}

impl ContextAnalyzer for DirectoryContext {
    fn context_boosts(&self) -> BTreeMap<String, f32> {
        let mut boosts: BTreeMap<String, f32> = BTreeMap::new();
        for kind in &self.kinds {
            for &(key, weight) in kind.boosts() {
                let slot = boosts.entry(key.to_string()).or_insert(0.0);
                *slot = slot.max(weight);
            }
        }
        boosts
    }

    fn describe(&self) -> String {
        self.kinds
            .iter()
            .map(|k| k.label())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One completed search, as stored in the history file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub query: String,
    /// Seconds since the Unix epoch.
    pub timestamp: u64,
    pub results_count: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub context: String,
    /// Milliseconds.
    #[serde(default)]
    pub duration: u64,
}

impl HistoryRecord {
    pub fn new(query: &str, results_count: usize, context: &str, duration: Duration) -> Self {
        let timestamp = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        Self {
            query: query.to_string(),
            timestamp,
            results_count,
            context: context.to_string(),
            duration: u64::try_from(duration.as_millis()).unwrap_or(u64::MAX),
        }
    }
}

/// Receives every completed search. Errors are logged by the engine and
/// never reach the caller.
pub trait HistoryRecorder: Send + Sync {
    fn record(&self, record: &HistoryRecord) -> Result<()>;
}

/// Discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHistory;

impl HistoryRecorder for NoHistory {
    fn record(&self, _: &HistoryRecord) -> Result<()> {
        Ok(())
    }
}

/// Appends one JSON object per line.
#[derive(Debug, Clone)]
pub struct JsonlHistory {
    path: PathBuf,
}

impl JsonlHistory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Every readable record in file order; malformed lines are skipped.
    pub fn read_all(&self) -> Result<Vec<HistoryRecord>> {
        let file = match fs::File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(Error::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        let records = BufReader::new(file)
            .lines()
            .map_while(|l| l.ok())
            .filter_map(|line| serde_json::from_str(&line).ok())
            .collect();
        Ok(records)
    }
}

impl HistoryRecorder for JsonlHistory {
    fn record(&self, record: &HistoryRecord) -> Result<()> {
        let io_err = |source| Error::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let mut line = serde_json::to_string(record).map_err(|e| Error::Parse {
            path: self.path.clone(),
            message: e.to_string(),
        })?;
        line.push('\n');

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(io_err)?;
        file.write_all(line.as_bytes()).map_err(io_err)
    }
}

/// External text generator consulted only when the caller asks for it.
pub trait SuggestionProvider: Send + Sync {
    fn generate(&self, query: &str, system_context: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_markers_and_merges_boosts() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join(".git")).unwrap();
        fs::write(dir.path().join("Cargo.toml"), "").unwrap();
        fs::write(dir.path().join("Makefile"), "").unwrap();
        fs::write(dir.path().join("notes.txt"), "").unwrap();

        let ctx = DirectoryContext::analyze(dir.path());
        assert_eq!(ctx.kinds(), &[ProjectKind::Git, ProjectKind::Rust, ProjectKind::Make]);
        assert_eq!(ctx.describe(), "git, rust, make");

        let boosts = ctx.context_boosts();
        assert_eq!(boosts["git"], 2.0);
        assert_eq!(boosts["cargo"], 2.0);
        assert_eq!(boosts["build"], 1.5);
    }

    #[test]
    fn missing_directory_is_empty_context() {
        let ctx = DirectoryContext::analyze(Path::new("/definitely/not/here"));
        assert!(ctx.kinds().is_empty());
        assert!(ctx.context_boosts().is_empty());
        assert_eq!(ctx.describe(), "");
    }

    #[test]
    fn jsonl_history_appends() {
        let dir = tempfile::tempdir().unwrap();
        let history = JsonlHistory::new(dir.path().join("nested").join("history.jsonl"));
        let first = HistoryRecord::new("list files", 3, "git", Duration::from_millis(12));
        let second = HistoryRecord::new("compress", 0, "", Duration::ZERO);
        history.record(&first).unwrap();
        history.record(&second).unwrap();

        let records = history.read_all().unwrap();
        assert_eq!(records, vec![first, second]);

        let raw = fs::read_to_string(history.path()).unwrap();
        assert!(raw.lines().nth(1).is_some_and(|l| !l.contains("context")));
    }
}
