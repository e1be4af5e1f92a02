//! Resilient catalog loading: retry, fallback locations, and a personal
//! catalog that can never take the primary one down with it.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::config::LoaderConfig;
use crate::entry::{Catalog, CommandEntry, RawRecord};
use crate::error::{CatalogParseWarning, Error, Result};

pub struct CatalogLoader {
    config: LoaderConfig,
}

impl Default for CatalogLoader {
    fn default() -> Self {
        Self::new(LoaderConfig::default())
    }
}

impl CatalogLoader {
    pub fn new(config: LoaderConfig) -> Self {
        Self { config }
    }

    /// Load the primary catalog (with retry and fallback locations) and merge
    /// the optional personal catalog over it.
    pub fn load(&self, primary: &Path, personal: Option<&Path>) -> Result<Catalog> {
        let (path, entries, mut warnings) = self.load_primary(primary)?;
        info!(path = %path.display(), entries = entries.len(), "loaded command catalog");

        let personal_entries = match personal {
            Some(p) => load_personal(p, &mut warnings),
            None => Vec::new(),
        };

        Ok(Catalog::merge(entries, personal_entries).with_origin(path, warnings))
    }

    fn load_primary(
        &self,
        primary: &Path,
    ) -> Result<(PathBuf, Vec<CommandEntry>, Vec<CatalogParseWarning>)> {
        let mut attempted: Vec<PathBuf> = Vec::new();
        let mut primary_err: Option<Error> = None;
        // One budget covers the primary and every fallback.
        let deadline = self.config.retry.deadline();

        let fallbacks = self.config.fallback_paths.iter().map(PathBuf::as_path);
        let candidates = std::iter::once(primary).chain(fallbacks);
        for path in candidates {
            if attempted.iter().any(|p| p == path) {
                continue;
            }
            attempted.push(path.to_path_buf());

            match self.config.retry.run_until(deadline, |_| read_catalog(path)) {
                Ok((entries, warnings)) => {
                    if let Some(err) = &primary_err {
                        warn!(path = %path.display(), "primary catalog unusable ({err}), using fallback");
                    }
                    return Ok((path.to_path_buf(), entries, warnings));
                }
                Err(err) => {
                    debug!(path = %path.display(), "catalog candidate failed: {err}");
                    primary_err.get_or_insert(err);
                }
            }
        }

        let reason = primary_err.map_or_else(
            || "no catalog locations configured".to_string(),
            |e| e.to_string(),
        );
        Err(Error::CatalogLoad { attempted, reason })
    }
}

/// Load with the default fallback locations and retry policy.
pub fn load(primary: impl AsRef<Path>, personal: Option<&Path>) -> Result<Catalog> {
    CatalogLoader::default().load(primary.as_ref(), personal)
}

fn read_catalog(path: &Path) -> Result<(Vec<CommandEntry>, Vec<CatalogParseWarning>)> {
    let text = fs::read_to_string(path).map_err(|source| Error::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let (entries, warnings) = decode_records(&text, path)?;
    if entries.is_empty() {
        return Err(Error::Parse {
            path: path.to_path_buf(),
            message: "catalog contains no usable entries".into(),
        });
    }
    Ok((entries, warnings))
}

/// A missing personal file is normal; anything else wrong with it becomes a
/// warning and the personal set is treated as empty.
fn load_personal(path: &Path, warnings: &mut Vec<CatalogParseWarning>) -> Vec<CommandEntry> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "no personal catalog");
            return Vec::new();
        }
        Err(e) => {
            warn!(path = %path.display(), "personal catalog unreadable, ignoring it: {e}");
            warnings.push(CatalogParseWarning {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
            return Vec::new();
        }
    };

    match decode_records(&text, path) {
        Ok((entries, record_warnings)) => {
            warnings.extend(record_warnings);
            entries
        }
        Err(e) => {
            warn!(path = %path.display(), "personal catalog corrupt, using primary catalog only: {e}");
            warnings.push(CatalogParseWarning {
                path: path.to_path_buf(),
                message: e.to_string(),
            });
            Vec::new()
        }
    }
}

/// Decode a YAML list of records one by one so a single bad record only
/// costs that record.
pub(crate) fn decode_records(
    text: &str,
    path: &Path,
) -> Result<(Vec<CommandEntry>, Vec<CatalogParseWarning>)> {
    let parse_err = |message: String| Error::Parse {
        path: path.to_path_buf(),
        message,
    };

    let doc: serde_yaml::Value = serde_yaml::from_str(text).map_err(|e| parse_err(e.to_string()))?;
    let items = match doc {
        serde_yaml::Value::Null => Vec::new(),
        serde_yaml::Value::Sequence(items) => items,
        _ => return Err(parse_err("expected a list of command records".into())),
    };

    let mut entries = Vec::with_capacity(items.len());
    let mut warnings = Vec::new();
    for (i, item) in items.into_iter().enumerate() {
        let skipped = match serde_yaml::from_value::<RawRecord>(item) {
            Ok(raw) => match raw.into_entry() {
                Some(entry) => {
                    entries.push(entry);
                    continue;
                }
                None => "blank command".to_string(),
            },
            Err(e) => e.to_string(),
        };
        warn!(path = %path.display(), record = i, "skipping catalog record: {skipped}");
        warnings.push(CatalogParseWarning {
            path: path.to_path_buf(),
            message: format!("record {i}: {skipped}"),
        });
    }
    Ok((entries, warnings))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_records_and_skips_bad_ones() {
        let yaml = r#"
- command: ls -la
  description: List files
- command: ""
  description: broken
- description: no command at all
- command: tar -czf out.tgz dir/
  description: Compress
  keywords: [tar, compress]
  platform: [linux, macos]
"#;
        let (entries, warnings) = decode_records(yaml, Path::new("c.yml")).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[1].platforms().len(), 2);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].message.starts_with("record 1"));
        assert!(warnings[1].message.starts_with("record 2"));
    }

    #[test]
    fn non_list_document_is_a_parse_error() {
        let err = decode_records("command: ls", Path::new("c.yml")).unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
    }

    #[test]
    fn empty_document_has_no_entries() {
        let (entries, warnings) = decode_records("", Path::new("c.yml")).unwrap();
        assert!(entries.is_empty());
        assert!(warnings.is_empty());
    }
}
