use crate::error::ApiError;
use std::sync::Arc;
use taskpulse_core::advisor::SharedModel;
use taskpulse_core::config::Config;
use taskpulse_core::error::AppError;
use taskpulse_core::session::SessionStore;
use taskpulse_core::storage::json_store::Store;
use tokio::sync::Mutex;

/// Shared by every handler. Cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
    pub config: Arc<Config>,
    pub model: SharedModel,
    pub sessions: Arc<SessionStore>,
    write_lock: Arc<Mutex<()>>,
}

impl AppState {
    pub fn new(store: Store, config: Config, model: SharedModel) -> Self {
        Self {
            store,
            config: Arc::new(config),
            model,
            sessions: Arc::new(SessionStore::new()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn language(&self) -> String {
        self.config.model.language.clone()
    }

    /// Runs a store operation on the blocking pool.
    pub async fn read<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Store) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.store.clone();
        run_blocking(move || op(&store)).await
    }

    /// Like [`AppState::read`], but mutating operations queue behind one
    /// another so read-modify-write cycles never interleave.
    ///
    /// The guard travels into the blocking closure: a cancelled request
    /// still holds the lock until its store work has finished.
    pub async fn write<T, F>(&self, op: F) -> Result<T, ApiError>
    where
        F: FnOnce(&Store) -> Result<T, AppError> + Send + 'static,
        T: Send + 'static,
    {
        let guard = self.write_lock.clone().lock_owned().await;
        let store = self.store.clone();
        run_blocking(move || {
            let _guard = guard;
            op(&store)
        })
        .await
    }
}

pub async fn run_blocking<T, F>(op: F) -> Result<T, ApiError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(op)
        .await
        .map_err(|err| ApiError(AppError::io(format!("worker task failed: {err}"))))?
        .map_err(ApiError)
}
