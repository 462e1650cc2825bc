//! Commodity interning.
//!
//! A [`Commodity`] is a unit-of-account symbol (a currency or security
//! ticker). Every [`crate::Amount`] referencing the same symbol shares one
//! [`Commodity`] instance, owned by a [`CommodityPool`] keyed by symbol and
//! created on first use. The pool is an explicit object rather than a
//! process-wide singleton; [`CommodityPool::reset`] drops non-builtin
//! entries between independent runs in the same process.
//!
//! # Example
//!
//! ```
//! use tally_core::CommodityPool;
//!
//! let pool = CommodityPool::new();
//!
//! let usd1 = pool.find_or_create("USD");
//! let usd2 = pool.find_or_create("USD");
//! let eur = pool.find_or_create("EUR");
//!
//! // usd1 and usd2 are the same interned commodity
//! assert!(std::sync::Arc::ptr_eq(&usd1, &usd2));
//! assert!(!std::sync::Arc::ptr_eq(&usd1, &eur));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Display precision sentinel for "no precision recorded yet".
const PRECISION_UNSET: u32 = u32::MAX;

/// Flags carried by a commodity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommodityFlags {
    /// Seeded by the host rather than discovered in input; survives
    /// [`CommodityPool::reset`].
    pub builtin: bool,
    /// Carries a lot annotation.
    pub annotated: bool,
}

/// An interned unit-of-account symbol with optional display metadata.
///
/// Identity is the symbol string. The display precision is mutable behind
/// an atomic because parsed amount literals may widen it while the
/// commodity is shared.
#[derive(Debug)]
pub struct Commodity {
    symbol: String,
    flags: CommodityFlags,
    precision: AtomicU32,
}

impl Commodity {
    fn new(symbol: impl Into<String>, flags: CommodityFlags) -> Self {
        Self {
            symbol: symbol.into(),
            flags,
            precision: AtomicU32::new(PRECISION_UNSET),
        }
    }

    /// Create a commodity outside any pool.
    ///
    /// Prefer [`CommodityPool::find_or_create`]; detached commodities are
    /// used when deserializing values that outlived their pool.
    #[must_use]
    pub fn detached(symbol: impl Into<String>) -> Arc<Self> {
        Arc::new(Self::new(symbol, CommodityFlags::default()))
    }

    /// The commodity's symbol.
    #[must_use]
    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// The commodity's flags.
    #[must_use]
    pub const fn flags(&self) -> CommodityFlags {
        self.flags
    }

    /// The recorded display precision, if any literal has established one.
    #[must_use]
    pub fn precision(&self) -> Option<u32> {
        match self.precision.load(Ordering::Relaxed) {
            PRECISION_UNSET => None,
            p => Some(p),
        }
    }

    /// Widen the recorded display precision to at least `scale`.
    pub fn upgrade_precision(&self, scale: u32) {
        let scale = scale.min(PRECISION_UNSET - 1);
        let mut current = self.precision.load(Ordering::Relaxed);
        loop {
            let target = if current == PRECISION_UNSET {
                scale
            } else {
                current.max(scale)
            };
            if target == current {
                return;
            }
            match self.precision.compare_exchange_weak(
                current,
                target,
                Ordering::Relaxed,
                Ordering::Relaxed,
            ) {
                Ok(_) => return,
                Err(observed) => current = observed,
            }
        }
    }
}

impl PartialEq for Commodity {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Commodity {}

impl PartialOrd for Commodity {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Commodity {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.symbol.cmp(&other.symbol)
    }
}

impl std::hash::Hash for Commodity {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.symbol.hash(state);
    }
}

impl fmt::Display for Commodity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol)
    }
}

impl Serialize for Commodity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.symbol)
    }
}

impl<'de> Deserialize<'de> for Commodity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let symbol = String::deserialize(deserializer)?;
        Ok(Self::new(symbol, CommodityFlags::default()))
    }
}

/// The interning pool of commodities.
///
/// Guards its map with an internal mutex so one pool can be shared behind
/// an `Arc` by the tokenizer and evaluation context of a run. Concurrent
/// runs should each use their own pool.
#[derive(Debug, Default)]
pub struct CommodityPool {
    commodities: Mutex<HashMap<String, Arc<Commodity>>>,
}

impl CommodityPool {
    /// Create a new empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commodities: Mutex::new(HashMap::new()),
        }
    }

    /// Look up a commodity by symbol, creating it on first use.
    ///
    /// The same `Arc` is returned for every call with the same symbol.
    pub fn find_or_create(&self, symbol: &str) -> Arc<Commodity> {
        let mut map = self.commodities.lock().unwrap();
        if let Some(existing) = map.get(symbol) {
            return existing.clone();
        }
        let commodity = Arc::new(Commodity::new(symbol, CommodityFlags::default()));
        map.insert(symbol.to_string(), commodity.clone());
        commodity
    }

    /// Seed a builtin commodity that survives [`Self::reset`].
    pub fn create_builtin(&self, symbol: &str) -> Arc<Commodity> {
        let mut map = self.commodities.lock().unwrap();
        if let Some(existing) = map.get(symbol) {
            return existing.clone();
        }
        let commodity = Arc::new(Commodity::new(
            symbol,
            CommodityFlags {
                builtin: true,
                annotated: false,
            },
        ));
        map.insert(symbol.to_string(), commodity.clone());
        commodity
    }

    /// Look up a commodity without creating it.
    #[must_use]
    pub fn find(&self, symbol: &str) -> Option<Arc<Commodity>> {
        self.commodities.lock().unwrap().get(symbol).cloned()
    }

    /// The number of interned commodities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commodities.lock().unwrap().len()
    }

    /// Check if the pool is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commodities.lock().unwrap().is_empty()
    }

    /// Drop every non-builtin commodity, for reuse across independent runs.
    ///
    /// Amounts created before the reset keep their `Arc` references; the
    /// pool simply stops handing those instances out.
    pub fn reset(&self) {
        self.commodities
            .lock()
            .unwrap()
            .retain(|_, c| c.flags().builtin);
    }

    /// A snapshot of all interned commodities.
    #[must_use]
    pub fn commodities(&self) -> Vec<Arc<Commodity>> {
        self.commodities.lock().unwrap().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interning_dedupes() {
        let pool = CommodityPool::new();

        let usd1 = pool.find_or_create("USD");
        let usd2 = pool.find_or_create("USD");
        let eur = pool.find_or_create("EUR");

        assert!(Arc::ptr_eq(&usd1, &usd2));
        assert!(!Arc::ptr_eq(&usd1, &eur));
        assert_eq!(pool.len(), 2);
    }

    #[test]
    fn test_find_does_not_create() {
        let pool = CommodityPool::new();
        assert!(pool.find("USD").is_none());
        pool.find_or_create("USD");
        assert!(pool.find("USD").is_some());
    }

    #[test]
    fn test_reset_keeps_builtins() {
        let pool = CommodityPool::new();
        pool.create_builtin("h");
        pool.find_or_create("USD");
        pool.find_or_create("EUR");
        assert_eq!(pool.len(), 3);

        pool.reset();

        assert_eq!(pool.len(), 1);
        assert!(pool.find("h").is_some());
        assert!(pool.find("USD").is_none());
    }

    #[test]
    fn test_precision_upgrade() {
        let pool = CommodityPool::new();
        let usd = pool.find_or_create("USD");
        assert_eq!(usd.precision(), None);

        usd.upgrade_precision(2);
        assert_eq!(usd.precision(), Some(2));

        // Widening sticks, narrowing does not
        usd.upgrade_precision(4);
        assert_eq!(usd.precision(), Some(4));
        usd.upgrade_precision(1);
        assert_eq!(usd.precision(), Some(4));
    }

    #[test]
    fn test_shared_across_threads() {
        use std::thread;

        let pool = Arc::new(CommodityPool::new());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let pool = pool.clone();
                thread::spawn(move || {
                    for _ in 0..100 {
                        pool.find_or_create("USD");
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(pool.len(), 1);
    }
}
