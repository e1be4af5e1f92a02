// Signal base weights
pub const WEIGHT_DIRECT_COMMAND: f32 = 15.0;
pub const WEIGHT_COMMAND: f32 = 10.0;
pub const WEIGHT_DESCRIPTION: f32 = 6.0;
pub const WEIGHT_KEYWORD_EXACT: f32 = 4.0;
pub const WEIGHT_KEYWORD_PARTIAL: f32 = 1.0;
pub const WEIGHT_DOMAIN: f32 = 12.0;

// Match-type multipliers
pub const MULT_EXACT: f32 = 2.0;
pub const MULT_PREFIX: f32 = 1.5;
pub const MULT_CONTAINS: f32 = 0.7;
pub const MULT_KEYWORD_EXACT: f32 = 1.5;
pub const MULT_DESCRIPTION_PARTIAL: f32 = 0.6;

// Category boosts
pub const CATEGORY_BOOST_COMPRESSION: f32 = 1.5;
pub const CATEGORY_BOOST_DIRECTORY: f32 = 1.5;
pub const CATEGORY_BOOST_SEARCH: f32 = 1.3;
pub const CATEGORY_BOOST_NETWORKING: f32 = 1.4;
/// Replaces the ordinary boost of the special category.
pub const CATEGORY_BOOST_SPECIAL: f32 = 2.5;
pub const CATEGORY_PENALTY: f32 = 0.2;

// Intent boosts
pub const INTENT_BOOST: f32 = 2.0;
pub const ACTION_BOOST_EXACT: f32 = 1.5;
pub const ACTION_BOOST_DESCRIPTION: f32 = 1.3;
pub const TARGET_BOOST_EXACT: f32 = 1.4;
pub const TARGET_BOOST_DESCRIPTION: f32 = 1.2;

// Final adjustments
pub const CROSS_PLATFORM_DISCOUNT: f32 = 0.9;
pub const CONTEXT_BOOST_SCALE: f32 = 5.0;
pub const SYNONYM_WEIGHT: f32 = 0.5;

// Search behaviour
pub const DEFAULT_LIMIT: usize = 5;
pub const MAX_QUERY_LEN: usize = 1000;
/// Catalog size above which scoring is spread across the rayon pool.
pub const PARALLEL_THRESHOLD: usize = 2048;

// Normalizer
pub const MIN_TOKEN_LEN: usize = 2;
/// Stopwords no longer than this are kept, so short command names survive.
pub const STOPWORD_MIN_LEN: usize = 2;
pub const MAX_SYNONYMS_PER_TOKEN: usize = 1;

// Fuzzy / fallback
pub const DEFAULT_FUZZY_THRESHOLD: i32 = -30;
/// Fuzzy score lost per edit.
pub const FUZZY_EDIT_PENALTY: i32 = 10;
pub const FALLBACK_THRESHOLD_RELAXATION: i32 = 10;
pub const FALLBACK_MIN_SCORE: f32 = 0.5;
pub const FALLBACK_MAX_CANDIDATES: usize = 50;
/// Minimum token length before edit-distance matching is attempted.
pub const FUZZY_MIN_LEN: usize = 3;
/// Command names and keywords down to this length are still typo-matched.
pub const FUZZY_SHORT_MIN_LEN: usize = 2;

// Cache
pub const CACHE_CAPACITY: usize = 1000;
pub const CACHE_TTL_SECS: u64 = 300;

// Loader retry
pub const RETRY_MAX_ATTEMPTS: u32 = 3;
pub const RETRY_BASE_DELAY_MS: u64 = 100;
pub const RETRY_MAX_DELAY_MS: u64 = 5_000;
pub const RETRY_BACKOFF_FACTOR: f64 = 2.0;
pub const RETRY_TIME_BUDGET_MS: u64 = 10_000;

// Catalog locations, tried in order when the configured path fails
pub const FALLBACK_CATALOG_PATHS: &[&str] = &[
    "/usr/local/share/cmd-finder/commands.yml",
    "/usr/share/cmd-finder/commands.yml",
    "assets/commands.yml",
    "data/commands.yml",
    "commands.yml",
    "commands_fixed.yml",
];

/// Platform label meaning "runs everywhere".
pub const CROSS_PLATFORM_TAG: &str = "cross-platform";

// Front ends
pub const DEFAULT_CATALOG_PATH: &str = "assets/commands.yml";
pub const SERVER_ADDR: &str = "127.0.0.1:3000";
pub const SERVER_MAX_LIMIT: usize = 50;
