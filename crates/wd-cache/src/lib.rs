//! In-memory TTL cache.
//!
//! - [`TtlCache`]: string-keyed map whose entries expire after a fixed TTL
//! - [`Clock`]: time source, swappable for [`ManualClock`] in tests
//!
//! Expired entries are evicted lazily by the [`TtlCache::get`] that finds them.
//! [`TtlCache::purge_expired`] sweeps all of them at once.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use std::time::Duration;
//! use wd_cache::{ManualClock, TtlCache};
//!
//! let clock = Arc::new(ManualClock::new());
//! let handle: Arc<ManualClock> = Arc::clone(&clock);
//! let cache = TtlCache::with_clock(Duration::from_secs(60), handle);
//!
//! cache.set("page", "<p>hi</p>".to_owned());
//! assert_eq!(cache.get("page").as_deref(), Some("<p>hi</p>"));
//!
//! clock.advance(Duration::from_secs(61));
//! assert_eq!(cache.get("page"), None);
//! ```

mod clock;
mod ttl;

pub use clock::{Clock, ManualClock, SystemClock};
pub use ttl::{CacheEntry, DEFAULT_TTL, TtlCache};
