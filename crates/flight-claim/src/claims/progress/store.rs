use tracing::warn;

use super::state::PhaseState;

/// Fixed storage key for the progress blob.
pub const PROGRESS_STORAGE_KEY: &str = "flight-claim.progress";

/// Key for one visitor's progress blob.
pub fn storage_key(session: &str) -> String {
    format!("{PROGRESS_STORAGE_KEY}:{session}")
}

/// Key/value storage holding one JSON blob per key.
pub trait ProgressStore: Send + Sync {
    fn read(&self, key: &str) -> Result<Option<String>, ProgressStoreError>;
    fn write(&self, key: &str, blob: String) -> Result<(), ProgressStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum ProgressStoreError {
    #[error("progress store unavailable: {0}")]
    Unavailable(String),
    #[error("progress state could not be encoded: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Load progress for `key`. Missing or unparseable blobs start over at phase 1.
pub fn load_progress<S>(store: &S, key: &str) -> Result<PhaseState, ProgressStoreError>
where
    S: ProgressStore + ?Sized,
{
    let Some(blob) = store.read(key)? else {
        return Ok(PhaseState::default());
    };

    match serde_json::from_str::<PhaseState>(&blob) {
        Ok(state) => Ok(state),
        Err(err) => {
            warn!(key, error = %err, "discarding corrupt progress state");
            Ok(PhaseState::default())
        }
    }
}

pub fn save_progress<S>(store: &S, key: &str, state: &PhaseState) -> Result<(), ProgressStoreError>
where
    S: ProgressStore + ?Sized,
{
    let blob = serde_json::to_string(state)?;
    store.write(key, blob)
}
