use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::AtomicU32;
use std::sync::{Arc, Mutex};

use uuid::Uuid;

use crate::config::Config;
use crate::oracle::Oracle;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// Server-side oracle client, used when the caller brings no key.
    pub oracle: Arc<dyn Oracle>,
    pub config: Config,
    /// Batch submissions made on the trial key. Incremented once per
    /// batch, never per file.
    pub trial_uses: Arc<AtomicU32>,
    /// Archive registry: batch id → ZIP path, for the download endpoint.
    pub batches: Arc<Mutex<HashMap<Uuid, PathBuf>>>,
}
