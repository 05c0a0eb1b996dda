//! # Result Caching Module
//!
//! Bounded-lifetime memoization of optimization results, keyed by a
//! fingerprint of the request's `(description, context, model)` triple.
//!
//! ## Key Components
//!
//! | Component | Description |
//! |-----------|-------------|
//! | [`ResultCache`] | Thread-safe map with lazy TTL expiry and threshold-triggered sweeps |
//! | [`CacheKey`] | Collision-resistant request fingerprint (SHA-256) |
//! | [`CacheStats`] | Read-only snapshot of total/active/expired entries |
//! | [`Clock`] | Time source; [`SystemClock`] in production, [`ManualClock`] in tests |
//!
//! ## Example
//!
//! ```rust
//! use prompt_tune::cache::ResultCache;
//! use std::time::Duration;
//!
//! let cache: ResultCache<String> = ResultCache::new(Duration::from_secs(30 * 60));
//! cache.set("Summarize a report", "", "claude-haiku", "optimized".to_string());
//! assert_eq!(
//!     cache.get("Summarize a report", "", "claude-haiku").as_deref(),
//!     Some("optimized")
//! );
//! ```
//!
//! ## Expiry
//!
//! An entry is served while `now - created_at <= ttl`. Once a `get` observes
//! an expired entry it removes it and reports a miss. `set` sweeps every
//! expired entry when the store grows past the cleanup threshold. Nothing
//! runs in the background.

mod clock;
mod key;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::CacheKey;
pub use store::{CacheStats, ResultCache, DEFAULT_CLEANUP_THRESHOLD};
