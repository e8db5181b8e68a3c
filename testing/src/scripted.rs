use async_trait::async_trait;
use errors::ConfigError;
use hc_core::{RawLoader, SourceCoordinate};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Semaphore, watch};

struct ScriptState {
    name: String,
    payload: Mutex<Result<String, String>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    held_tx: watch::Sender<bool>,
    loads: AtomicUsize
}

/// Loader whose next payload is set by the test.
///
/// Clones share state, so a test keeps one handle while the repository owns
/// another.
#[derive(Clone)]
pub struct ScriptedLoader {
    state: Arc<ScriptState>
}

impl ScriptedLoader {
    pub fn new(payload: &str) -> Self {
        Self::with_result("scripted", Ok(payload.to_string()))
    }

    pub fn named(name: &str, payload: &str) -> Self {
        Self::with_result(name, Ok(payload.to_string()))
    }

    /// A loader whose every call fails with `SourceUnavailable`.
    pub fn failing(reason: &str) -> Self {
        Self::with_result("scripted", Err(reason.to_string()))
    }

    fn with_result(name: &str, payload: Result<String, String>) -> Self {
        let (held_tx, _) = watch::channel(false);
        Self {
            state: Arc::new(ScriptState {
                name: name.to_string(),
                payload: Mutex::new(payload),
                gate: Mutex::new(None),
                held_tx,
                loads: AtomicUsize::new(0)
            })
        }
    }

    pub fn set_payload(&self, payload: &str) {
        *self.lock_payload() = Ok(payload.to_string());
    }

    pub fn fail_with(&self, reason: &str) {
        *self.lock_payload() = Err(reason.to_string());
    }

    /// Number of `load` calls so far.
    pub fn load_count(&self) -> usize {
        self.state.loads.load(Ordering::SeqCst)
    }

    /// Make the next `load` block until the returned gate is released or
    /// dropped.
    pub fn hold(&self) -> LoadGate {
        let semaphore = Arc::new(Semaphore::new(0));
        *self
            .state
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&semaphore));
        LoadGate(semaphore)
    }

    /// Resolves once a `load` is blocked on a gate.
    pub async fn wait_until_held(&self) {
        let mut rx = self.state.held_tx.subscribe();
        let _ = rx.wait_for(|held| *held).await;
    }

    fn lock_payload(&self) -> std::sync::MutexGuard<'_, Result<String, String>> {
        self.state
            .payload
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait]
impl RawLoader for ScriptedLoader {
    async fn load(&self) -> Result<String, ConfigError> {
        self.state.loads.fetch_add(1, Ordering::SeqCst);

        let gate = self
            .state
            .gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(semaphore) = gate {
            self.state.held_tx.send_replace(true);
            let _ = semaphore.acquire().await;
            self.state.held_tx.send_replace(false);
        }

        self.lock_payload()
            .clone()
            .map_err(|reason| ConfigError::source_unavailable(self.coordinate().to_string(), reason))
    }

    fn coordinate(&self) -> SourceCoordinate {
        SourceCoordinate::Memory {
            name: self.state.name.clone()
        }
    }
}

/// Releases a held `load` when released or dropped.
pub struct LoadGate(Arc<Semaphore>);

impl LoadGate {
    pub fn release(self) {}
}

impl Drop for LoadGate {
    fn drop(&mut self) {
        self.0.add_permits(1);
    }
}
