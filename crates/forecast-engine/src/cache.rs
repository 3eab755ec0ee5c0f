//! Per-symbol forecast cache with get-or-compute semantics.

use analysis_core::{AnalysisError, ForecastResult};
use dashmap::DashMap;
use std::sync::{Arc, Mutex, PoisonError, TryLockError};

pub type ComputeFn<'a> = dyn FnMut() -> Result<Option<ForecastResult>, AnalysisError> + 'a;

/// Key/value store owned by a forecast engine. Entries never expire.
pub trait ForecastCache: Send + Sync {
    /// Stored entry for `key`. Never waits on an in-flight computation.
    fn get(&self, key: &str) -> Option<Arc<ForecastResult>>;

    /// Return the cached entry or run `compute` and store a successful
    /// result. `Ok(None)` and errors are passed through uncached.
    fn get_or_try_insert_with(
        &self,
        key: &str,
        compute: &mut ComputeFn<'_>,
    ) -> Result<Option<Arc<ForecastResult>>, AnalysisError>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

type Slot = Arc<Mutex<Option<Arc<ForecastResult>>>>;

/// Cache where each key has its own lock, so concurrent misses on the same
/// symbol run a single fit while other symbols proceed in parallel.
#[derive(Default)]
pub struct SingleFlightCache {
    slots: DashMap<String, Slot>,
}

impl SingleFlightCache {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, key: &str) -> Slot {
        // clone out of the map so the shard lock is released before waiting
        self.slots.entry(key.to_string()).or_default().value().clone()
    }

    /// Drop an empty slot unless another caller is already waiting on it.
    fn release_empty(&self, key: &str, slot: &Slot) {
        self.slots
            .remove_if(key, |_, v| Arc::ptr_eq(v, slot) && Arc::strong_count(v) == 2);
    }
}

/// Non-blocking read of a slot; `None` while a computation holds it.
fn peek(slot: &Slot) -> Option<Arc<ForecastResult>> {
    let guard = match slot.try_lock() {
        Ok(guard) => guard,
        Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        Err(TryLockError::WouldBlock) => return None,
    };
    guard.clone()
}

impl ForecastCache for SingleFlightCache {
    fn get(&self, key: &str) -> Option<Arc<ForecastResult>> {
        let slot = self.slots.get(key)?.value().clone();
        peek(&slot)
    }

    fn get_or_try_insert_with(
        &self,
        key: &str,
        compute: &mut ComputeFn<'_>,
    ) -> Result<Option<Arc<ForecastResult>>, AnalysisError> {
        let slot = self.slot(key);
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(hit) = guard.as_ref() {
            tracing::debug!("Forecast cache hit for {}", key);
            return Ok(Some(Arc::clone(hit)));
        }

        match compute() {
            Ok(Some(result)) => {
                let result = Arc::new(result);
                *guard = Some(Arc::clone(&result));
                Ok(Some(result))
            }
            outcome => {
                self.release_empty(key, &slot);
                outcome.map(|_| None)
            }
        }
    }

    /// Stored entries. Slots busy with a computation are not counted.
    fn len(&self) -> usize {
        self.slots
            .iter()
            .filter(|entry| peek(entry.value()).is_some())
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use analysis_core::{Direction, FitSummary};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn dummy(symbol: &str) -> ForecastResult {
        ForecastResult {
            symbol: symbol.to_string(),
            direction: Direction::Up,
            last_actual: 1.0,
            last_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            arima_path: Vec::new(),
            sarima_path: Vec::new(),
            garch_path: Vec::new(),
            fit: FitSummary {
                ar_order: 0,
                seasonal_ar_order: 0,
                seasonal_lag_used: false,
                garch_omega: 0.0,
                garch_alpha: 0.1,
                garch_beta: 0.85,
            },
        }
    }

    #[test]
    fn test_computes_once() {
        let cache = SingleFlightCache::new();
        let calls = AtomicUsize::new(0);
        for _ in 0..3 {
            let got = cache
                .get_or_try_insert_with("AAA", &mut || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(Some(dummy("AAA")))
                })
                .unwrap();
            assert!(got.is_some());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_failures_not_cached() {
        let cache = SingleFlightCache::new();
        let err = cache.get_or_try_insert_with("BAD", &mut || {
            Err(AnalysisError::ModelFit("boom".to_string()))
        });
        assert!(err.is_err());
        let none = cache.get_or_try_insert_with("BAD", &mut || Ok(None)).unwrap();
        assert!(none.is_none());
        assert!(cache.is_empty());
        assert!(cache.get("BAD").is_none());
        assert!(cache.slots.is_empty());
    }

    #[test]
    fn test_lookups_do_not_wait_for_running_fit() {
        let cache = Arc::new(SingleFlightCache::new());
        let (started_tx, started_rx) = std::sync::mpsc::channel();

        let worker = {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                cache
                    .get_or_try_insert_with("SLOW", &mut || {
                        started_tx.send(()).unwrap();
                        thread::sleep(Duration::from_millis(500));
                        Ok(Some(dummy("SLOW")))
                    })
                    .unwrap()
            })
        };
        started_rx.recv().unwrap();

        let begin = std::time::Instant::now();
        assert!(cache.get("SLOW").is_none());
        assert_eq!(cache.len(), 0);
        assert!(begin.elapsed() < Duration::from_millis(250));

        assert!(worker.join().unwrap().is_some());
        assert!(cache.get("SLOW").is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_single_flight_under_contention() {
        let cache = Arc::new(SingleFlightCache::new());
        let calls = Arc::new(AtomicUsize::new(0));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                thread::spawn(move || {
                    cache
                        .get_or_try_insert_with("HOT", &mut || {
                            calls.fetch_add(1, Ordering::SeqCst);
                            thread::sleep(Duration::from_millis(20));
                            Ok(Some(dummy("HOT")))
                        })
                        .unwrap()
                        .unwrap()
                })
            })
            .collect();

        let results: Vec<Arc<ForecastResult>> =
            handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(results.iter().all(|r| Arc::ptr_eq(r, &results[0])));
    }
}
