//! Command entries and the merged, immutable catalog they live in.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::CROSS_PLATFORM_TAG;
use crate::error::CatalogParseWarning;
use crate::text::{make_stemmer, split_words, stem_words};

/// One curated shell command. Identity is the command text.
#[derive(Debug, Clone, Serialize)]
pub struct CommandEntry {
    command: String,
    description: String,
    keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    category: Option<String>,
    #[serde(rename = "platform", skip_serializing_if = "Vec::is_empty")]
    platforms: Vec<String>,
    pipeline: bool,
    #[serde(skip)]
    folded: Folded,
}

/// Lowercased copies of the searchable fields, computed once.
#[derive(Debug, Clone, Default)]
pub(crate) struct Folded {
    pub command: String,
    pub head: String,
    pub command_words: Vec<String>,
    pub description: String,
    pub description_words: HashSet<String>,
    pub description_stems: HashSet<String>,
    pub keywords: Vec<String>,
    pub category: Option<String>,
    pub platforms: Vec<String>,
}

impl CommandEntry {
    pub fn new(command: impl Into<String>, description: impl Into<String>) -> Self {
        let mut entry = Self {
            command: command.into(),
            description: description.into(),
            keywords: Vec::new(),
            category: None,
            platforms: Vec::new(),
            pipeline: false,
            folded: Folded::default(),
        };
        entry.refold();
        entry
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self.refold();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self.refold();
        self
    }

    pub fn with_platforms<I, S>(mut self, platforms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platforms = platforms.into_iter().map(Into::into).collect();
        self.refold();
        self
    }

    pub fn with_pipeline(mut self, pipeline: bool) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn category(&self) -> Option<&str> {
        self.category.as_deref()
    }

    pub fn platforms(&self) -> &[String] {
        &self.platforms
    }

    /// Explicitly flagged, or the command text chains several commands.
    pub fn is_pipeline(&self) -> bool {
        self.pipeline
            || self.command.contains('|')
            || self.command.contains("&&")
            || self.command.contains(">>")
    }

    /// No platform tags, or an explicit cross-platform tag.
    pub fn is_cross_platform(&self) -> bool {
        self.folded.platforms.is_empty()
            || self.folded.platforms.iter().any(|p| p == CROSS_PLATFORM_TAG)
    }

    /// Carries an explicit tag for `platform` (case-insensitive).
    pub fn targets_platform(&self, platform: &str) -> bool {
        self.folded
            .platforms
            .iter()
            .any(|p| p.eq_ignore_ascii_case(platform))
    }

    pub(crate) fn folded(&self) -> &Folded {
        &self.folded
    }

    fn refold(&mut self) {
        let stemmer = make_stemmer();
        let command = self.command.trim().to_lowercase();
        let description = self.description.to_lowercase();
        self.folded = Folded {
            head: command.split_whitespace().next().unwrap_or("").to_string(),
            command_words: split_words(&command).collect(),
            description_words: split_words(&description).collect(),
            description_stems: stem_words(&description, &stemmer).into_iter().collect(),
            keywords: self.keywords.iter().map(|k| k.trim().to_lowercase()).collect(),
            category: self
                .category
                .as_deref()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty()),
            platforms: self.platforms.iter().map(|p| p.trim().to_lowercase()).collect(),
            command,
            description,
        };
    }
}

impl PartialEq for CommandEntry {
    fn eq(&self, other: &Self) -> bool {
        self.command == other.command
            && self.description == other.description
            && self.keywords == other.keywords
            && self.category == other.category
            && self.platforms == other.platforms
            && self.pipeline == other.pipeline
    }
}

/// A catalog record as written on disk.
#[derive(Debug, Deserialize)]
pub(crate) struct RawRecord {
    command: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    keywords: Vec<String>,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default, alias = "niche")]
    category: Option<String>,
    #[serde(default)]
    platform: Vec<String>,
    #[serde(default)]
    pipeline: bool,
}

impl RawRecord {
    /// `None` when the command text is blank.
    pub(crate) fn into_entry(self) -> Option<CommandEntry> {
        if self.command.trim().is_empty() {
            return None;
        }
        let mut keywords = self.keywords;
        for tag in self.tags {
            if !keywords.contains(&tag) {
                keywords.push(tag);
            }
        }
        let mut entry = CommandEntry::new(self.command, self.description)
            .with_keywords(keywords)
            .with_platforms(self.platform)
            .with_pipeline(self.pipeline);
        if let Some(category) = self.category {
            entry = entry.with_category(category);
        }
        Some(entry)
    }
}

/// Which file an entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntrySource {
    Primary,
    Personal,
}

/// The immutable, merged collection searched during a session.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<Arc<CommandEntry>>,
    sources: Vec<EntrySource>,
    short_commands: HashSet<String>,
    primary_path: Option<PathBuf>,
    warnings: Vec<CatalogParseWarning>,
}

impl Catalog {
    /// A catalog made of primary entries only.
    pub fn new(entries: Vec<CommandEntry>) -> Self {
        Self::merge(entries, Vec::new())
    }

    /// Primary entries first, in file order; personal entries replace a
    /// primary entry with the same command text in place, otherwise append.
    pub fn merge(primary: Vec<CommandEntry>, personal: Vec<CommandEntry>) -> Self {
        let mut entries: Vec<Arc<CommandEntry>> = Vec::with_capacity(primary.len() + personal.len());
        let mut sources = Vec::with_capacity(entries.capacity());
        let mut position: HashMap<String, usize> = HashMap::new();

        let tagged = primary
            .into_iter()
            .map(|e| (e, EntrySource::Primary))
            .chain(personal.into_iter().map(|e| (e, EntrySource::Personal)));
        for (entry, source) in tagged {
            match position.get(entry.command()) {
                Some(&idx) => {
                    entries[idx] = Arc::new(entry);
                    sources[idx] = source;
                }
                None => {
                    position.insert(entry.command().to_string(), entries.len());
                    entries.push(Arc::new(entry));
                    sources.push(source);
                }
            }
        }

        let short_commands = entries
            .iter()
            .map(|e| e.folded().head.clone())
            .filter(|h| !h.is_empty() && h.chars().count() <= 3)
            .collect();

        Self {
            entries,
            sources,
            short_commands,
            primary_path: None,
            warnings: Vec::new(),
        }
    }

    pub(crate) fn with_origin(
        mut self,
        primary_path: PathBuf,
        warnings: Vec<CatalogParseWarning>,
    ) -> Self {
        self.primary_path = Some(primary_path);
        self.warnings = warnings;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Arc<CommandEntry>] {
        &self.entries
    }

    pub fn get(&self, idx: usize) -> Option<&Arc<CommandEntry>> {
        self.entries.get(idx)
    }

    pub fn source(&self, idx: usize) -> Option<EntrySource> {
        self.sources.get(idx).copied()
    }

    pub fn find(&self, command: &str) -> Option<&Arc<CommandEntry>> {
        self.entries.iter().find(|e| e.command() == command)
    }

    /// Leading command names short enough to be dropped by the normalizer.
    pub fn short_commands(&self) -> &HashSet<String> {
        &self.short_commands
    }

    /// The primary file the catalog was finally read from.
    pub fn primary_path(&self) -> Option<&Path> {
        self.primary_path.as_deref()
    }

    /// Non-fatal problems met while loading.
    pub fn warnings(&self) -> &[CatalogParseWarning] {
        &self.warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn personal_entry_replaces_primary_in_place() {
        let primary = vec![
            CommandEntry::new("ls -la", "List files"),
            CommandEntry::new("tar -czf", "Compress"),
            CommandEntry::new("pwd", "Print directory"),
        ];
        let personal = vec![
            CommandEntry::new("tar -czf", "My own tar"),
            CommandEntry::new("deploy.sh", "Ship it"),
        ];
        let catalog = Catalog::merge(primary, personal);

        let commands: Vec<&str> = catalog.entries().iter().map(|e| e.command()).collect();
        assert_eq!(commands, vec!["ls -la", "tar -czf", "pwd", "deploy.sh"]);
        assert_eq!(catalog.entries()[1].description(), "My own tar");
        assert_eq!(catalog.source(1), Some(EntrySource::Personal));
        assert_eq!(catalog.source(0), Some(EntrySource::Primary));
        assert_eq!(catalog.source(3), Some(EntrySource::Personal));
    }

    #[test]
    fn platform_tags() {
        let any = CommandEntry::new("git status", "Show status");
        assert!(any.is_cross_platform());

        let tagged = CommandEntry::new("ls", "List").with_platforms(["Linux", "macos"]);
        assert!(!tagged.is_cross_platform());
        assert!(tagged.targets_platform("linux"));
        assert!(!tagged.targets_platform("windows"));

        let explicit = CommandEntry::new("cd", "Change dir").with_platforms(["cross-platform"]);
        assert!(explicit.is_cross_platform());
        assert!(!explicit.targets_platform("linux"));
    }

    #[test]
    fn pipeline_detection() {
        assert!(CommandEntry::new("ps aux | grep x", "").is_pipeline());
        assert!(CommandEntry::new("make && make install", "").is_pipeline());
        assert!(CommandEntry::new("echo", "").with_pipeline(true).is_pipeline());
        assert!(!CommandEntry::new("ls", "").is_pipeline());
    }

    #[test]
    fn raw_record_accepts_legacy_fields() {
        let yaml = "command: tar -xzf a.tgz\nniche: compression\ntags: [untar]\nkeywords: [extract]\n";
        let raw: RawRecord = serde_yaml::from_str(yaml).unwrap();
        let entry = raw.into_entry().unwrap();
        assert_eq!(entry.category(), Some("compression"));
        assert_eq!(entry.keywords(), &["extract".to_string(), "untar".to_string()]);
    }

    #[test]
    fn blank_command_is_rejected() {
        let raw: RawRecord = serde_yaml::from_str("command: '  '\n").unwrap();
        assert!(raw.into_entry().is_none());
    }

    #[test]
    fn short_commands_collected() {
        let catalog = Catalog::new(vec![
            CommandEntry::new("w", "Who is logged in"),
            CommandEntry::new("ls -la", "List"),
            CommandEntry::new("docker ps", "Containers"),
        ]);
        assert!(catalog.short_commands().contains("w"));
        assert!(catalog.short_commands().contains("ls"));
        assert!(!catalog.short_commands().contains("docker"));
    }
}
