//! Natural-language search over a curated catalog of shell commands.
//!
//! ```no_run
//! use std::path::Path;
//! use cmd_finder::{EngineConfig, SearchEngine, SearchOptions};
//!
//! let engine = SearchEngine::open(Path::new("commands.yml"), None, EngineConfig::default())?;
//! for r in engine.search("compress a directory", &SearchOptions::default())? {
//!     println!("{:.2} {}", r.score, r.entry.command());
//! }
//! # Ok::<(), cmd_finder::Error>(())
//! ```

pub mod cache;
pub mod collab;
pub mod config;
pub mod constants;
pub mod entry;
pub mod error;
pub mod fallback;
pub mod loader;
pub mod normalize;
pub mod options;
pub mod rank;
pub mod retry;
pub mod scorer;
pub mod search;
pub mod signals;
pub mod text;
pub mod thesaurus;

pub use config::EngineConfig;
pub use entry::{Catalog, CommandEntry, EntrySource};
pub use error::{CatalogParseWarning, Error, Result, ValidationError};
pub use loader::{load, CatalogLoader};
pub use options::SearchOptions;
pub use rank::ScoredResult;
pub use search::{CancelFlag, SearchEngine};
