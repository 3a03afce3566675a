//! Async facade over the canary store and decision engine.
//!
//! Request handlers talk to `CanaryService` only. It owns the real entropy
//! source and clock, runs store I/O on the blocking pool under a deadline,
//! and emits decision logs and metrics.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::canary::engine::{decide, RandomSource, RngSource};
use crate::canary::error::CanaryResult;
use crate::canary::lookup::find_by_name;
use crate::canary::types::{AppRecord, ConfigSet, DecisionResult, Outcome};
use crate::config::StoreConfig;
use crate::observability::metrics;
use crate::resilience::timeouts::run_blocking;
use crate::store::{ConfigStore, ConfigUpdater, Version};

#[derive(Debug, Clone)]
pub struct CanaryService {
    store: Arc<ConfigStore>,
    updater: Arc<ConfigUpdater>,
    io_timeout: Duration,
}

impl CanaryService {
    pub fn new(store: Arc<ConfigStore>, io_timeout: Duration) -> Self {
        let updater = Arc::new(ConfigUpdater::new(store.clone()));
        Self {
            store,
            updater,
            io_timeout,
        }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(
            Arc::new(ConfigStore::from_path(&config.path)),
            Duration::from_millis(config.io_timeout_ms),
        )
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Current record set and its version.
    pub async fn load(&self) -> CanaryResult<(ConfigSet, Version)> {
        let store = self.store.clone();
        let start = Instant::now();
        let result = run_blocking(self.io_timeout, move || store.load_versioned()).await;
        metrics::record_store_io("load", start);
        result
    }

    /// One application's record and the store version it was read at.
    pub async fn record(&self, name: &str) -> CanaryResult<(AppRecord, Version)> {
        let (set, version) = self.load().await?;
        let record = find_by_name(&set, name)?.clone();
        Ok((record, version))
    }

    /// Decide with the wall clock and fresh OS entropy.
    pub async fn decide(&self, app: &str, forced: Option<Outcome>) -> CanaryResult<DecisionResult> {
        let mut source = RngSource(StdRng::from_entropy());
        self.decide_with(app, Utc::now(), &mut source, forced).await
    }

    /// Decide with an explicit clock reading and random source.
    pub async fn decide_with(
        &self,
        app: &str,
        now: DateTime<Utc>,
        source: &mut (dyn RandomSource + Send),
        forced: Option<Outcome>,
    ) -> CanaryResult<DecisionResult> {
        let (set, _) = self.load().await?;
        let record = find_by_name(&set, app)?;
        let decision = decide(record, now, source, forced)?;

        metrics::record_decision(app, decision.outcome);
        if !record.logging.disable {
            tracing::info!(
                app = %app,
                outcome = %decision.outcome,
                forced = forced.is_some(),
                expiration = %decision.expiration,
                "Canary decision"
            );
        }
        Ok(decision)
    }

    /// Replace one record, optionally only if the store is still at `expected`.
    pub async fn update(
        &self,
        record: AppRecord,
        expected: Option<Version>,
    ) -> CanaryResult<Version> {
        let updater = self.updater.clone();
        let app = record.name.clone();
        let start = Instant::now();
        let result = run_blocking(self.io_timeout, move || match expected {
            Some(expected) => updater.update_record_if(record, expected),
            None => updater.update_record(record),
        })
        .await;
        metrics::record_store_io("save", start);
        metrics::record_update(&app, result.is_ok());
        result
    }
}
