use chrono::NaiveDate;
use flight_claim::claims::{IataCode, ProgressStore, ProgressStoreError};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// Process-local progress blobs. Visitors resume only while the process lives.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProgressStore {
    blobs: Arc<Mutex<HashMap<String, String>>>,
}

impl ProgressStore for InMemoryProgressStore {
    fn read(&self, key: &str) -> Result<Option<String>, ProgressStoreError> {
        let guard = self
            .blobs
            .lock()
            .map_err(|_| ProgressStoreError::Unavailable("progress mutex poisoned".to_string()))?;
        Ok(guard.get(key).cloned())
    }

    fn write(&self, key: &str, blob: String) -> Result<(), ProgressStoreError> {
        let mut guard = self
            .blobs
            .lock()
            .map_err(|_| ProgressStoreError::Unavailable("progress mutex poisoned".to_string()))?;
        guard.insert(key.to_string(), blob);
        Ok(())
    }
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_iata(raw: &str) -> Result<IataCode, String> {
    IataCode::parse(raw).map_err(|err| err.to_string())
}
