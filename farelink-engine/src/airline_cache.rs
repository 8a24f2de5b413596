use chrono::{Duration, Utc};
use farelink_core::MarketplaceApi;
use farelink_shared::airline::{AirlineSource, CachedAirline};
use farelink_shared::wire::{CarrierRef, RawOffer, WireAirline};
use futures_util::future::join_all;
use serde::Serialize;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Airlines known to be good, seeded at construction so the hot path has
/// display names before the first upstream round trip completes.
const BOOTSTRAP_AIRLINES: &[(&str, &str)] = &[
    ("AA", "American Airlines"),
    ("AF", "Air France"),
    ("BA", "British Airways"),
    ("DL", "Delta Air Lines"),
    ("EK", "Emirates"),
    ("IB", "Iberia"),
    ("KL", "KLM Royal Dutch Airlines"),
    ("LH", "Lufthansa"),
    ("QF", "Qantas"),
    ("QR", "Qatar Airways"),
    ("SQ", "Singapore Airlines"),
    ("TK", "Turkish Airlines"),
    ("UA", "United Airlines"),
];

#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries older than this are treated as absent on read, even before
    /// the sweep physically removes them.
    pub ttl: Duration,
    /// Upstream batch lookups are chunked to this size.
    pub chunk_size: usize,
    pub sweep_interval: std::time::Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::hours(24),
            chunk_size: 10,
            sweep_interval: std::time::Duration::from_secs(6 * 60 * 60),
        }
    }
}

/// Read-only cache statistics: counts by provenance and age bucket.
#[derive(Debug, Default, Clone, Serialize)]
pub struct CacheStats {
    pub total: usize,
    pub fresh: usize,
    pub stale: usize,
    pub bootstrap: usize,
    pub upstream: usize,
    pub search: usize,
    pub fallback: usize,
}

/// In-memory TTL cache mapping airline code to display metadata.
///
/// One entry per code, replace-on-write. Reads never fail: a miss that the
/// upstream cannot resolve is stored and returned as a fallback entry keyed
/// by the code itself, so a sustained outage does not cause repeated failed
/// lookups within the TTL window.
pub struct AirlineCache {
    api: Arc<dyn MarketplaceApi>,
    entries: RwLock<HashMap<String, CachedAirline>>,
    config: CacheConfig,
}

impl AirlineCache {
    pub fn new(api: Arc<dyn MarketplaceApi>, config: CacheConfig) -> Self {
        let mut entries = HashMap::new();
        for (code, name) in BOOTSTRAP_AIRLINES {
            entries.insert(
                code.to_string(),
                CachedAirline::new(code, name, None, AirlineSource::Bootstrap),
            );
        }
        Self {
            api,
            entries: RwLock::new(entries),
            config,
        }
    }

    fn is_fresh(&self, entry: &CachedAirline) -> bool {
        Utc::now() - entry.cached_at < self.config.ttl
    }

    async fn fresh_entry(&self, code: &str) -> Option<CachedAirline> {
        let entries = self.entries.read().await;
        entries.get(code).filter(|e| self.is_fresh(e)).cloned()
    }

    async fn store(&self, entry: CachedAirline) -> CachedAirline {
        let mut entries = self.entries.write().await;
        entries.insert(entry.code.clone(), entry.clone());
        entry
    }

    /// Single lookup. Fresh hit is returned as-is; otherwise one upstream
    /// round trip, with a cached fallback on failure. Never errors.
    pub async fn get_airline(&self, code: &str) -> CachedAirline {
        let code = code.trim().to_ascii_uppercase();
        if let Some(entry) = self.fresh_entry(&code).await {
            return entry;
        }

        match self.api.get_airline(&code).await {
            Ok(wire) => self.store(entry_from_wire(&code, &wire)).await,
            Err(e) => {
                debug!(%code, error = %e, "Airline lookup failed, caching fallback");
                self.store(CachedAirline::fallback(&code)).await
            }
        }
    }

    /// Batch lookup. Fresh codes are answered from the cache; the rest go
    /// upstream in fixed-size chunks fanned out concurrently. A failed chunk
    /// degrades only its own codes to fallbacks.
    pub async fn get_airlines(&self, codes: &[String]) -> Vec<CachedAirline> {
        let mut requested: Vec<String> = Vec::new();
        for code in codes {
            let code = code.trim().to_ascii_uppercase();
            if !code.is_empty() && !requested.contains(&code) {
                requested.push(code);
            }
        }

        let mut resolved: HashMap<String, CachedAirline> = HashMap::new();
        {
            let entries = self.entries.read().await;
            for code in &requested {
                if let Some(entry) = entries.get(code).filter(|e| self.is_fresh(e)) {
                    resolved.insert(code.clone(), entry.clone());
                }
            }
        }

        let stale: Vec<String> = requested
            .iter()
            .filter(|c| !resolved.contains_key(*c))
            .cloned()
            .collect();

        if !stale.is_empty() {
            debug!(stale = stale.len(), "Refreshing stale airline codes upstream");
            let refreshes = stale
                .chunks(self.config.chunk_size.max(1))
                .map(|chunk| self.refresh_chunk(chunk.to_vec()));
            let refreshed: Vec<Vec<CachedAirline>> = join_all(refreshes).await;

            let mut entries = self.entries.write().await;
            for entry in refreshed.into_iter().flatten() {
                entries.insert(entry.code.clone(), entry.clone());
                resolved.insert(entry.code.clone(), entry);
            }
        }

        requested
            .iter()
            .map(|code| {
                resolved
                    .get(code)
                    .cloned()
                    .unwrap_or_else(|| CachedAirline::fallback(code))
            })
            .collect()
    }

    async fn refresh_chunk(&self, chunk: Vec<String>) -> Vec<CachedAirline> {
        match self.api.airlines_by_codes(&chunk).await {
            Ok(wires) => {
                let mut by_code: HashMap<String, WireAirline> = wires
                    .into_iter()
                    .filter_map(|w| w.iata_code.clone().map(|c| (c.to_ascii_uppercase(), w)))
                    .collect();
                chunk
                    .iter()
                    .map(|code| match by_code.remove(code) {
                        Some(wire) => entry_from_wire(code, &wire),
                        None => CachedAirline::fallback(code),
                    })
                    .collect()
            }
            Err(e) => {
                warn!(chunk = chunk.len(), error = %e, "Airline chunk refresh failed, degrading to fallbacks");
                chunk.iter().map(|c| CachedAirline::fallback(c)).collect()
            }
        }
    }

    /// Every marketing and operating carrier code across all segments of all
    /// slices, plus the owning carrier, de-duplicated.
    pub fn extract_airline_codes(offers: &[RawOffer]) -> BTreeSet<String> {
        let mut codes = BTreeSet::new();
        let push = |carrier: &Option<CarrierRef>, codes: &mut BTreeSet<String>| {
            if let Some(code) = carrier.as_ref().and_then(|c| c.iata_code.as_deref()) {
                let code = code.trim().to_ascii_uppercase();
                if !code.is_empty() {
                    codes.insert(code);
                }
            }
        };
        for offer in offers {
            push(&offer.owner, &mut codes);
            for slice in &offer.slices {
                for segment in &slice.segments {
                    push(&segment.marketing_carrier, &mut codes);
                    push(&segment.operating_carrier, &mut codes);
                }
            }
        }
        codes
    }

    /// Harvest carrier display data embedded in search results. Cheaper than
    /// an upstream lookup and good enough to replace anything that is stale
    /// or a fallback; fresh bootstrap/upstream entries are left alone.
    pub async fn warm_from_offers(&self, offers: &[RawOffer]) {
        let mut entries = self.entries.write().await;
        let consider = |carrier: &Option<CarrierRef>,
                        entries: &mut HashMap<String, CachedAirline>| {
            let Some(carrier) = carrier else { return };
            let (Some(code), Some(name)) = (carrier.iata_code.as_deref(), carrier.name.as_deref())
            else {
                return;
            };
            let code = code.trim().to_ascii_uppercase();
            if code.is_empty() || name.is_empty() {
                return;
            }
            let keep = entries
                .get(&code)
                .map(|e| self.is_fresh(e) && e.source != AirlineSource::Fallback)
                .unwrap_or(false);
            if !keep {
                entries.insert(
                    code.clone(),
                    CachedAirline::new(
                        &code,
                        name,
                        carrier.logo_symbol_url.clone(),
                        AirlineSource::Search,
                    ),
                );
            }
        };

        for offer in offers {
            consider(&offer.owner, &mut entries);
            for slice in &offer.slices {
                for segment in &slice.segments {
                    consider(&segment.marketing_carrier, &mut entries);
                    consider(&segment.operating_carrier, &mut entries);
                }
            }
        }
    }

    /// Sweep entries older than the TTL. Returns the number removed.
    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, e| now - e.cached_at < self.config.ttl);
        let removed = before - entries.len();
        if removed > 0 {
            info!(removed, "Evicted expired airline cache entries");
        }
        removed
    }

    /// Periodic sweep so one-off codes seen once do not accumulate forever.
    pub fn spawn_cleanup_task(self: &Arc<Self>) -> JoinHandle<()> {
        let cache = Arc::clone(self);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(cache.config.sweep_interval);
            interval.tick().await; // first tick fires immediately
            loop {
                interval.tick().await;
                cache.cleanup_expired().await;
            }
        })
    }

    pub async fn stats(&self) -> CacheStats {
        let entries = self.entries.read().await;
        let mut stats = CacheStats {
            total: entries.len(),
            ..CacheStats::default()
        };
        for entry in entries.values() {
            if self.is_fresh(entry) {
                stats.fresh += 1;
            } else {
                stats.stale += 1;
            }
            match entry.source {
                AirlineSource::Bootstrap => stats.bootstrap += 1,
                AirlineSource::Upstream => stats.upstream += 1,
                AirlineSource::Search => stats.search += 1,
                AirlineSource::Fallback => stats.fallback += 1,
            }
        }
        stats
    }

    pub async fn all_cached(&self) -> Vec<CachedAirline> {
        let entries = self.entries.read().await;
        let mut all: Vec<CachedAirline> = entries.values().cloned().collect();
        all.sort_by(|a, b| a.code.cmp(&b.code));
        all
    }
}

fn entry_from_wire(code: &str, wire: &WireAirline) -> CachedAirline {
    CachedAirline::new(
        code,
        &wire.name,
        wire.logo_symbol_url.clone(),
        AirlineSource::Upstream,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use farelink_core::search::SearchRequest;
    use farelink_core::{ProviderError, ProviderResult};
    use farelink_shared::wire::{PassengerInput, PaymentInput, WireOrder};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockApi {
        single_calls: AtomicUsize,
        batch_calls: AtomicUsize,
        fail_lookups: AtomicBool,
    }

    #[async_trait]
    impl MarketplaceApi for MockApi {
        async fn search_offers(&self, _request: &SearchRequest) -> ProviderResult<Vec<RawOffer>> {
            Ok(vec![])
        }

        async fn list_airlines(&self) -> ProviderResult<Vec<WireAirline>> {
            Ok(vec![])
        }

        async fn get_airline(&self, code: &str) -> ProviderResult<WireAirline> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_lookups.load(Ordering::SeqCst) {
                return Err(ProviderError::Upstream("airline lookup failed".into()));
            }
            Ok(WireAirline {
                id: format!("arl_{}", code),
                name: format!("{} Air", code),
                iata_code: Some(code.to_string()),
                logo_symbol_url: None,
            })
        }

        async fn airlines_by_codes(&self, codes: &[String]) -> ProviderResult<Vec<WireAirline>> {
            self.batch_calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_lookups.load(Ordering::SeqCst) {
                return Err(ProviderError::Upstream("batch lookup failed".into()));
            }
            Ok(codes
                .iter()
                .map(|code| WireAirline {
                    id: format!("arl_{}", code),
                    name: format!("{} Air", code),
                    iata_code: Some(code.clone()),
                    logo_symbol_url: None,
                })
                .collect())
        }

        async fn create_order(
            &self,
            _offer_id: &str,
            _passengers: &[PassengerInput],
            _payment: &PaymentInput,
        ) -> ProviderResult<WireOrder> {
            Err(ProviderError::Upstream("not used in cache tests".into()))
        }

        async fn get_order(&self, _order_id: &str) -> ProviderResult<WireOrder> {
            Err(ProviderError::Upstream("not used in cache tests".into()))
        }

        async fn cancel_order(&self, _order_id: &str) -> bool {
            false
        }
    }

    fn cache_with(api: Arc<MockApi>) -> AirlineCache {
        AirlineCache::new(api, CacheConfig::default())
    }

    #[tokio::test]
    async fn test_bootstrap_entries_answer_without_upstream_calls() {
        let api = Arc::new(MockApi::default());
        let cache = cache_with(api.clone());

        let entry = cache.get_airline("BA").await;
        assert_eq!(entry.name, "British Airways");
        assert_eq!(entry.source, AirlineSource::Bootstrap);
        assert_eq!(api.single_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_fresh_entry_is_not_refetched_within_ttl() {
        let api = Arc::new(MockApi::default());
        let cache = cache_with(api.clone());

        let first = cache.get_airline("ZZ").await;
        let second = cache.get_airline("zz").await;

        assert_eq!(first.name, "ZZ Air");
        assert_eq!(second.source, AirlineSource::Upstream);
        assert_eq!(second.cached_at, first.cached_at, "same cached entry");
        assert_eq!(api.single_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_triggers_exactly_one_new_lookup() {
        let api = Arc::new(MockApi::default());
        let cache = AirlineCache::new(
            api.clone(),
            CacheConfig {
                ttl: Duration::milliseconds(0),
                ..CacheConfig::default()
            },
        );

        cache.get_airline("ZZ").await;
        cache.get_airline("ZZ").await;
        assert_eq!(api.single_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_lookup_returns_and_caches_fallback() {
        let api = Arc::new(MockApi::default());
        api.fail_lookups.store(true, Ordering::SeqCst);
        let cache = cache_with(api.clone());

        let entry = cache.get_airline("XQ").await;
        assert_eq!(entry.source, AirlineSource::Fallback);
        assert_eq!(entry.name, "XQ", "fallback uses the code as display name");

        // Fallback is cached too: a sustained outage must not hammer upstream.
        let again = cache.get_airline("XQ").await;
        assert_eq!(again.source, AirlineSource::Fallback);
        assert_eq!(api.single_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_batch_lookup_chunks_stale_codes() {
        let api = Arc::new(MockApi::default());
        let cache = cache_with(api.clone());

        // 12 unknown codes with chunk size 10 -> two upstream chunk calls
        let codes: Vec<String> = (0..12).map(|i| format!("Z{}", i)).collect();
        let airlines = cache.get_airlines(&codes).await;

        assert_eq!(airlines.len(), 12);
        assert!(airlines.iter().all(|a| a.source == AirlineSource::Upstream));
        assert_eq!(api.batch_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_batch_mixes_cache_hits_and_upstream_misses() {
        let api = Arc::new(MockApi::default());
        let cache = cache_with(api.clone());

        let codes = vec!["BA".to_string(), "Z1".to_string(), "LH".to_string()];
        let airlines = cache.get_airlines(&codes).await;

        assert_eq!(airlines[0].source, AirlineSource::Bootstrap);
        assert_eq!(airlines[1].source, AirlineSource::Upstream);
        assert_eq!(airlines[2].source, AirlineSource::Bootstrap);
        assert_eq!(api.batch_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_chunk_degrades_only_its_codes_to_fallbacks() {
        let api = Arc::new(MockApi::default());
        api.fail_lookups.store(true, Ordering::SeqCst);
        let cache = cache_with(api.clone());

        let codes = vec!["BA".to_string(), "Z1".to_string(), "Z2".to_string()];
        let airlines = cache.get_airlines(&codes).await;

        // Cached code still answered; the failed chunk falls back per code.
        assert_eq!(airlines[0].source, AirlineSource::Bootstrap);
        assert_eq!(airlines[1].source, AirlineSource::Fallback);
        assert_eq!(airlines[2].source, AirlineSource::Fallback);
    }

    #[tokio::test]
    async fn test_cleanup_removes_only_expired_entries() {
        let api = Arc::new(MockApi::default());
        let cache = cache_with(api.clone());

        let mut old = CachedAirline::new("OLD", "Old Air", None, AirlineSource::Upstream);
        old.cached_at = Utc::now() - Duration::hours(25);
        cache
            .entries
            .write()
            .await
            .insert(old.code.clone(), old);

        let removed = cache.cleanup_expired().await;
        assert_eq!(removed, 1);
        assert!(cache.entries.read().await.get("OLD").is_none());
        // Bootstrap seed is fresh and survives the sweep
        assert!(cache.entries.read().await.get("BA").is_some());
    }

    #[tokio::test]
    async fn test_stale_entry_is_treated_as_absent_before_sweep() {
        let api = Arc::new(MockApi::default());
        let cache = cache_with(api.clone());

        let mut old = CachedAirline::new("OLD", "Old Air", None, AirlineSource::Upstream);
        old.cached_at = Utc::now() - Duration::hours(25);
        cache
            .entries
            .write()
            .await
            .insert(old.code.clone(), old);

        let entry = cache.get_airline("OLD").await;
        assert_eq!(entry.name, "OLD Air", "stale entry refetched upstream");
        assert_eq!(api.single_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_stats_count_by_source_and_age() {
        let api = Arc::new(MockApi::default());
        api.fail_lookups.store(true, Ordering::SeqCst);
        let cache = cache_with(api.clone());

        cache.get_airline("XQ").await; // cached fallback

        let stats = cache.stats().await;
        assert_eq!(stats.total, BOOTSTRAP_AIRLINES.len() + 1);
        assert_eq!(stats.fallback, 1);
        assert_eq!(stats.bootstrap, BOOTSTRAP_AIRLINES.len());
        assert_eq!(stats.stale, 0);
    }
}
