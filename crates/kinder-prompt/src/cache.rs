//! Built-prompt caching.
//!
//! Composing an agent-mode prompt renders ten templates and several
//! sections. Callers that build prompts per request keep the result in a
//! [`PromptCache`] keyed by `(role, mode, context fingerprint)` and reuse it
//! until the entry expires.

use crate::config::PromptConfig;
use crate::prompt::{PromptContext, PromptMode};
use chrono::{DateTime, TimeDelta, Utc};
use std::collections::HashMap;
use tracing::trace;

type CacheKey = (String, PromptMode, u64);

#[derive(Debug, Clone)]
struct CacheEntry {
    prompt: String,
    created_at: DateTime<Utc>,
}

/// TTL-bounded cache of composed prompt texts.
#[derive(Debug)]
pub struct PromptCache {
    entries: HashMap<CacheKey, CacheEntry>,
    ttl: TimeDelta,
    /// Maximum number of entries before the oldest is evicted.
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl PromptCache {
    pub fn new(max_entries: usize, ttl: TimeDelta) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            max_entries,
            hits: 0,
            misses: 0,
        }
    }

    /// Capacity and TTL from `config`.
    pub fn from_config(config: &PromptConfig) -> Self {
        let ttl = TimeDelta::try_seconds(config.cache_ttl_secs).unwrap_or(TimeDelta::MAX);
        Self::new(config.cache_capacity, ttl)
    }

    /// Look up a live entry. Expired entries count as misses and are dropped.
    pub fn get(&mut self, role: &str, mode: PromptMode, context: &PromptContext) -> Option<&str> {
        self.get_at(role, mode, context, Utc::now())
    }

    /// [`get`](Self::get) against an explicit clock.
    pub fn get_at(
        &mut self,
        role: &str,
        mode: PromptMode,
        context: &PromptContext,
        now: DateTime<Utc>,
    ) -> Option<&str> {
        let key = cache_key(role, mode, context);
        let expired = self
            .entries
            .get(&key)
            .is_some_and(|e| now - e.created_at >= self.ttl);
        if expired {
            trace!(role, mode = %mode, "Prompt cache entry expired");
            self.entries.remove(&key);
        }
        match self.entries.get(&key) {
            Some(entry) => {
                self.hits += 1;
                Some(&entry.prompt)
            }
            None => {
                self.misses += 1;
                None
            }
        }
    }

    /// Store a prompt, replacing any entry under the same key.
    pub fn put(&mut self, role: &str, mode: PromptMode, context: &PromptContext, prompt: String) {
        self.put_at(role, mode, context, prompt, Utc::now());
    }

    /// [`put`](Self::put) against an explicit clock.
    pub fn put_at(
        &mut self,
        role: &str,
        mode: PromptMode,
        context: &PromptContext,
        prompt: String,
        now: DateTime<Utc>,
    ) {
        if self.max_entries == 0 {
            return;
        }
        let key = cache_key(role, mode, context);
        if !self.entries.contains_key(&key) && self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }
        self.entries.insert(
            key,
            CacheEntry {
                prompt,
                created_at: now,
            },
        );
    }

    /// Return the cached prompt, or build, store and return a fresh one.
    pub fn get_or_insert_with(
        &mut self,
        role: &str,
        mode: PromptMode,
        context: &PromptContext,
        build: impl FnOnce() -> String,
    ) -> String {
        if let Some(hit) = self.get(role, mode, context) {
            return hit.to_string();
        }
        let prompt = build();
        self.put(role, mode, context, prompt.clone());
        prompt
    }

    /// Drop every entry older than the TTL.
    pub fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        self.entries.retain(|_, e| now - e.created_at < ttl);
    }

    /// Drop all entries, e.g. after the template registry changed.
    pub fn invalidate_all(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Hit rate as a fraction (0.0 to 1.0).
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    fn evict_oldest(&mut self) {
        if let Some(oldest_key) = self
            .entries
            .iter()
            .min_by_key(|(_, e)| e.created_at)
            .map(|(k, _)| k.clone())
        {
            self.entries.remove(&oldest_key);
        }
    }
}

impl Default for PromptCache {
    fn default() -> Self {
        Self::from_config(&PromptConfig::default())
    }
}

/// Stable fingerprint of a context: FNV-1a over its JSON form.
pub fn fingerprint(context: &PromptContext) -> u64 {
    let json = serde_json::to_string(context).unwrap_or_default();
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in json.as_bytes() {
        hash ^= *byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

fn cache_key(role: &str, mode: PromptMode, context: &PromptContext) -> CacheKey {
    (role.to_string(), mode, fingerprint(context))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompt::MemorySnippet;

    fn ctx(query: &str) -> PromptContext {
        PromptContext {
            user_role: "teacher".into(),
            user_query: query.into(),
            ..Default::default()
        }
    }

    #[test]
    fn put_and_get() {
        let mut cache = PromptCache::new(4, TimeDelta::seconds(60));
        cache.put("teacher", PromptMode::Agent, &ctx("a"), "prompt".into());
        assert_eq!(
            cache.get("teacher", PromptMode::Agent, &ctx("a")),
            Some("prompt")
        );
        assert_eq!(cache.hits(), 1);
    }

    #[test]
    fn key_includes_role_mode_and_context() {
        let mut cache = PromptCache::new(4, TimeDelta::seconds(60));
        cache.put("teacher", PromptMode::Agent, &ctx("a"), "p".into());
        assert!(cache.get("principal", PromptMode::Agent, &ctx("a")).is_none());
        assert!(cache.get("teacher", PromptMode::Direct, &ctx("a")).is_none());
        assert!(cache.get("teacher", PromptMode::Agent, &ctx("b")).is_none());
        assert_eq!(cache.misses(), 3);
    }

    #[test]
    fn entries_expire() {
        let mut cache = PromptCache::new(4, TimeDelta::seconds(60));
        let t0 = Utc::now();
        cache.put_at("teacher", PromptMode::Agent, &ctx("a"), "p".into(), t0);
        let fresh = t0 + TimeDelta::seconds(59);
        let stale = t0 + TimeDelta::seconds(60);
        let context = ctx("a");
        assert!(cache.get_at("teacher", PromptMode::Agent, &context, fresh).is_some());
        assert!(cache.get_at("teacher", PromptMode::Agent, &context, stale).is_none());
        assert!(cache.is_empty());
    }

    #[test]
    fn purge_drops_only_expired() {
        let mut cache = PromptCache::new(4, TimeDelta::seconds(60));
        let t0 = Utc::now();
        let later = t0 + TimeDelta::seconds(30);
        let now = t0 + TimeDelta::seconds(70);
        cache.put_at("a", PromptMode::Agent, &ctx("x"), "1".into(), t0);
        cache.put_at("b", PromptMode::Agent, &ctx("x"), "2".into(), later);
        cache.purge_expired(now);
        assert_eq!(cache.len(), 1);
        assert!(cache.get_at("b", PromptMode::Agent, &ctx("x"), now).is_some());
    }

    #[test]
    fn capacity_evicts_oldest() {
        let mut cache = PromptCache::new(2, TimeDelta::seconds(600));
        let t0 = Utc::now();
        for (i, role) in ["a", "b", "c"].into_iter().enumerate() {
            let at = t0 + TimeDelta::seconds(i as i64);
            cache.put_at(role, PromptMode::Agent, &ctx("x"), role.into(), at);
        }
        assert_eq!(cache.len(), 2);
        let now = t0 + TimeDelta::seconds(3);
        assert!(cache.get_at("a", PromptMode::Agent, &ctx("x"), now).is_none());
        assert!(cache.get_at("c", PromptMode::Agent, &ctx("x"), now).is_some());
    }

    #[test]
    fn overwrite_does_not_evict() {
        let mut cache = PromptCache::new(1, TimeDelta::seconds(600));
        cache.put("a", PromptMode::Agent, &ctx("x"), "1".into());
        cache.put("a", PromptMode::Agent, &ctx("x"), "2".into());
        assert_eq!(cache.get("a", PromptMode::Agent, &ctx("x")), Some("2"));
    }

    #[test]
    fn zero_capacity_stores_nothing() {
        let mut cache = PromptCache::new(0, TimeDelta::seconds(600));
        cache.put("a", PromptMode::Agent, &ctx("x"), "1".into());
        assert!(cache.is_empty());
    }

    #[test]
    fn get_or_insert_builds_once() {
        let mut cache = PromptCache::default();
        let mut builds = 0;
        for _ in 0..3 {
            let prompt = cache.get_or_insert_with("teacher", PromptMode::Direct, &ctx("q"), || {
                builds += 1;
                "built".to_string()
            });
            assert_eq!(prompt, "built");
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
        assert!((cache.hit_rate() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn fingerprint_tracks_content() {
        let mut a = ctx("q");
        let b = a.clone();
        assert_eq!(fingerprint(&a), fingerprint(&b));
        a.memory_context.push(MemorySnippet::new("likes music"));
        assert_ne!(fingerprint(&a), fingerprint(&b));
    }

    #[test]
    fn from_config_uses_capacity() {
        let config = PromptConfig::default().with_cache_capacity(1);
        let mut cache = PromptCache::from_config(&config);
        cache.put("a", PromptMode::Agent, &ctx("x"), "1".into());
        cache.put("b", PromptMode::Agent, &ctx("x"), "2".into());
        assert_eq!(cache.len(), 1);
    }
}
