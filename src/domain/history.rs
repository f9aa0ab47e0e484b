//! Price Store
//!
//! Bounded, per-instrument rolling price history. Each instrument keeps at
//! most `capacity` samples in chronological order; the oldest sample is
//! evicted first. The full history is written through to a
//! [`SnapshotStore`] after every append.

use std::collections::{BTreeMap, VecDeque};
use std::sync::Arc;
use chrono::{DateTime, Utc};
use thiserror::Error;

use super::persistence::{PersistError, Snapshot, SnapshotStore};
use super::price::PriceSample;

/// Default number of samples kept per instrument
pub const DEFAULT_HISTORY_CAPACITY: usize = 1000;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Sample for {instrument} at {sample} is older than the latest stored sample at {latest}")]
    OutOfOrder {
        instrument: String,
        latest: DateTime<Utc>,
        sample: DateTime<Utc>,
    },
    /// The in-memory append already happened; only the durable write failed
    #[error("History persistence failed: {0}")]
    Persistence(#[from] PersistError),
}

/// Outcome of loading the persisted history at startup
#[derive(Debug, Clone, PartialEq)]
pub enum RestoreStatus {
    /// Nothing was persisted yet
    Fresh,
    /// History restored from the snapshot
    Restored { instruments: usize, samples: usize },
    /// Snapshot unreadable or invalid, continuing with an empty history
    Degraded(String),
}

impl RestoreStatus {
    pub fn is_restored(&self) -> bool {
        matches!(self, RestoreStatus::Restored { .. })
    }

    pub fn is_degraded(&self) -> bool {
        matches!(self, RestoreStatus::Degraded(_))
    }
}

/// Rolling price history with write-through persistence
pub struct PriceStore {
    history: BTreeMap<String, VecDeque<PriceSample>>,
    capacity: usize,
    storage: Arc<dyn SnapshotStore>,
}

impl PriceStore {
    /// Create an empty store. A capacity of zero is raised to one.
    pub fn new(storage: Box<dyn SnapshotStore>, capacity: usize) -> Self {
        Self {
            history: BTreeMap::new(),
            capacity: capacity.max(1),
            storage: storage.into(),
        }
    }

    /// Replace the in-memory history with the persisted snapshot.
    ///
    /// Never fails: a missing snapshot starts fresh, an unreadable or
    /// invalid one starts empty and reports [`RestoreStatus::Degraded`].
    pub fn restore(&mut self) -> RestoreStatus {
        self.history.clear();

        let snapshot = match self.storage.load() {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return RestoreStatus::Fresh,
            Err(e) => return RestoreStatus::Degraded(e.to_string()),
        };

        match Self::validate_snapshot(snapshot, self.capacity) {
            Ok(history) => {
                let samples = history.values().map(VecDeque::len).sum();
                let instruments = history.len();
                self.history = history;
                RestoreStatus::Restored { instruments, samples }
            }
            Err(reason) => RestoreStatus::Degraded(reason),
        }
    }

    fn validate_snapshot(
        snapshot: Snapshot,
        capacity: usize,
    ) -> Result<BTreeMap<String, VecDeque<PriceSample>>, String> {
        let mut history = BTreeMap::new();

        for (instrument, samples) in snapshot {
            if instrument.is_empty() {
                return Err("empty instrument id".to_string());
            }
            if let Some(bad) = samples.iter().find(|s| !s.is_valid()) {
                return Err(format!("invalid sample for {}: price {}", instrument, bad.price));
            }
            if samples.windows(2).any(|w| w[1].timestamp < w[0].timestamp) {
                return Err(format!("samples for {} are not in chronological order", instrument));
            }

            let mut samples: VecDeque<PriceSample> = samples.into();
            while samples.len() > capacity {
                samples.pop_front();
            }
            history.insert(instrument, samples);
        }

        Ok(history)
    }

    /// Append a sample to its instrument's history, evict past capacity,
    /// then persist the whole history.
    pub fn append(&mut self, sample: PriceSample) -> Result<(), StoreError> {
        self.record(sample)?;
        self.storage.save(&self.snapshot())?;
        Ok(())
    }

    /// In-memory half of [`append`](Self::append). The caller owns the
    /// durable write, through [`storage`](Self::storage).
    pub fn record(&mut self, sample: PriceSample) -> Result<(), StoreError> {
        if let Some(latest) = self.latest(&sample.token_address) {
            if sample.timestamp < latest.timestamp {
                return Err(StoreError::OutOfOrder {
                    instrument: sample.token_address.clone(),
                    latest: latest.timestamp,
                    sample: sample.timestamp,
                });
            }
        }

        let samples = self.history.entry(sample.token_address.clone()).or_default();
        samples.push_back(sample);
        while samples.len() > self.capacity {
            samples.pop_front();
        }
        Ok(())
    }

    /// Snapshot writer backing this store
    pub fn storage(&self) -> Arc<dyn SnapshotStore> {
        Arc::clone(&self.storage)
    }

    /// Newest `min(n, len)` samples in chronological order
    pub fn window(&self, instrument: &str, n: usize) -> Vec<PriceSample> {
        self.history
            .get(instrument)
            .map(|samples| {
                let skip = samples.len().saturating_sub(n);
                samples.iter().skip(skip).cloned().collect()
            })
            .unwrap_or_default()
    }

    /// Copy of the full history in snapshot form
    pub fn snapshot(&self) -> Snapshot {
        self.history
            .iter()
            .map(|(instrument, samples)| (instrument.clone(), samples.iter().cloned().collect()))
            .collect()
    }

    /// Read-only view of the in-memory history
    pub fn history(&self) -> &BTreeMap<String, VecDeque<PriceSample>> {
        &self.history
    }

    pub fn latest(&self, instrument: &str) -> Option<&PriceSample> {
        self.history.get(instrument).and_then(|samples| samples.back())
    }

    pub fn len(&self, instrument: &str) -> usize {
        self.history.get(instrument).map(VecDeque::len).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.history.values().all(VecDeque::is_empty)
    }

    pub fn instruments(&self) -> Vec<String> {
        self.history.keys().cloned().collect()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
