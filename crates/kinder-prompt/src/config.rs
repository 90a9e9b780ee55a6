//! Configuration for prompt composition, compression, validation and caching.
//!
//! # Examples
//!
//! Defaults match the production budget (8000-character target, five
//! history turns, medium compression):
//!
//! ```
//! use kinder_prompt::config::PromptConfig;
//!
//! let config = PromptConfig::default();
//! assert_eq!(config.target_length, 8000);
//! ```
//!
//! Override selected settings with builder methods:
//!
//! ```
//! use kinder_prompt::compress::CompressionLevel;
//! use kinder_prompt::config::PromptConfig;
//!
//! let config = PromptConfig::default()
//!     .with_target_length(6000)
//!     .with_default_level(CompressionLevel::Aggressive)
//!     .with_history_window(3);
//! ```
//!
//! The CLI also reads the same struct from JSON; omitted fields keep their
//! defaults:
//!
//! ```
//! use kinder_prompt::config::PromptConfig;
//!
//! let config: PromptConfig = serde_json::from_str(r#"{"targetLength": 4000}"#).unwrap();
//! assert_eq!(config.target_length, 4000);
//! assert_eq!(config.history_window, 5);
//! ```

use crate::DEFAULT_TARGET_LENGTH;
use crate::compress::CompressionLevel;
use serde::{Deserialize, Serialize};

/// Default number of conversation turns prefixed by `build_user_prompt`.
const DEFAULT_HISTORY_WINDOW: usize = 5;

/// Default length above which validation warns.
const DEFAULT_MAX_PROMPT_LENGTH: usize = 50_000;

/// Default token estimate above which validation warns.
const DEFAULT_MAX_TOKEN_ESTIMATE: usize = 10_000;

const DEFAULT_CACHE_TTL_SECS: i64 = 300;
const DEFAULT_CACHE_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PromptConfig {
    /// Character budget the compression pipeline aims for.
    pub target_length: usize,
    /// Conversation turns included by `build_user_prompt`.
    pub history_window: usize,
    /// Validation warns above this many characters.
    pub max_prompt_length: usize,
    /// Validation warns above this many estimated tokens.
    pub max_token_estimate: usize,
    /// Level used when a caller does not name one.
    pub default_level: CompressionLevel,
    /// Lifetime of a [`PromptCache`](crate::cache::PromptCache) entry.
    pub cache_ttl_secs: i64,
    /// Entries kept by the cache before the oldest is evicted.
    pub cache_capacity: usize,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            target_length: DEFAULT_TARGET_LENGTH,
            history_window: DEFAULT_HISTORY_WINDOW,
            max_prompt_length: DEFAULT_MAX_PROMPT_LENGTH,
            max_token_estimate: DEFAULT_MAX_TOKEN_ESTIMATE,
            default_level: CompressionLevel::Medium,
            cache_ttl_secs: DEFAULT_CACHE_TTL_SECS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

impl PromptConfig {
    pub fn with_target_length(mut self, chars: usize) -> Self {
        self.target_length = chars;
        self
    }

    pub fn with_history_window(mut self, turns: usize) -> Self {
        self.history_window = turns;
        self
    }

    pub fn with_max_prompt_length(mut self, chars: usize) -> Self {
        self.max_prompt_length = chars;
        self
    }

    pub fn with_max_token_estimate(mut self, tokens: usize) -> Self {
        self.max_token_estimate = tokens;
        self
    }

    pub fn with_default_level(mut self, level: CompressionLevel) -> Self {
        self.default_level = level;
        self
    }

    /// Set the cache entry lifetime in seconds.
    pub fn with_cache_ttl(mut self, secs: i64) -> Self {
        self.cache_ttl_secs = secs;
        self
    }

    pub fn with_cache_capacity(mut self, entries: usize) -> Self {
        self.cache_capacity = entries;
        self
    }
}
