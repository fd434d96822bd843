use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct CacheStat {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
    pub size: usize,
}

impl std::fmt::Display for CacheStat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "hits: {:>8}, misses: {:>8}, hit_rate: {:>6.2}%, size: {:>8}",
            self.hits,
            self.misses,
            self.hit_rate * 100.0,
            self.size
        )
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq)]
pub struct DispatchStats {
    pub ranking_cache: CacheStat,
    pub short_circuit_dispatches: u64,
    pub dynamic_dispatches: u64,
    pub validity_evaluations: u64,
    pub priority_evaluations: u64,
    pub unresolved_dispatches: u64,
}

impl std::fmt::Display for DispatchStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dispatch Statistics:")?;
        writeln!(f, "  Ranking Cache:          {}", self.ranking_cache)?;
        writeln!(f, "  Short-circuit:          {:>8}", self.short_circuit_dispatches)?;
        writeln!(f, "  Dynamic:                {:>8}", self.dynamic_dispatches)?;
        writeln!(f, "  Validity Evaluations:   {:>8}", self.validity_evaluations)?;
        writeln!(f, "  Priority Evaluations:   {:>8}", self.priority_evaluations)?;
        writeln!(f, "  Unresolved:             {:>8}", self.unresolved_dispatches)?;
        Ok(())
    }
}

/// Dispatch counters.
///
/// All counters use `Ordering::Relaxed`: they are independent and only need to be
/// updated atomically.
#[derive(Debug, Default)]
pub struct DispatchMetrics {
    pub ranking_cache_hits: AtomicU64,
    pub ranking_cache_misses: AtomicU64,
    /// Cached dispatches answered without evaluating any validity or priority method
    pub short_circuit_dispatches: AtomicU64,
    /// Dispatches that evaluated (candidate, instance) pairs
    pub dynamic_dispatches: AtomicU64,
    pub validity_evaluations: AtomicU64,
    pub priority_evaluations: AtomicU64,
    pub unresolved_dispatches: AtomicU64,
}

impl DispatchMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn record_ranking_cache_hit(&self) {
        self.ranking_cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_ranking_cache_miss(&self) {
        self.ranking_cache_misses.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_short_circuit(&self) {
        self.short_circuit_dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dynamic(&self) {
        self.dynamic_dispatches.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_validity_evaluation(&self) {
        self.validity_evaluations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn record_priority_evaluation(&self) {
        self.priority_evaluations.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_unresolved(&self) {
        self.unresolved_dispatches.fetch_add(1, Ordering::Relaxed);
    }

    pub fn statistics(&self, ranking_cache_size: usize) -> DispatchStats {
        DispatchStats {
            ranking_cache: self.stat(
                self.ranking_cache_hits.load(Ordering::Relaxed),
                self.ranking_cache_misses.load(Ordering::Relaxed),
                ranking_cache_size,
            ),
            short_circuit_dispatches: self.short_circuit_dispatches.load(Ordering::Relaxed),
            dynamic_dispatches: self.dynamic_dispatches.load(Ordering::Relaxed),
            validity_evaluations: self.validity_evaluations.load(Ordering::Relaxed),
            priority_evaluations: self.priority_evaluations.load(Ordering::Relaxed),
            unresolved_dispatches: self.unresolved_dispatches.load(Ordering::Relaxed),
        }
    }

    fn stat(&self, hits: u64, misses: u64, size: usize) -> CacheStat {
        let total = hits + misses;
        let hit_rate = if total == 0 {
            0.0
        } else {
            hits as f64 / total as f64
        };
        CacheStat {
            hits,
            misses,
            hit_rate,
            size,
        }
    }
}
