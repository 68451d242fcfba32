// Application state shared by every HTTP handler

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::auth::OperatorKey;
use crate::clock::SystemClock;
use crate::config::Config;
use crate::engine::{LedgerSnapshot, MarketEngine};
use crate::error::{LedgerError, LedgerResult, PersistError};

/// One lock around the whole engine: every operation is serialized, so two
/// sells against the same balance can never both pass the balance check.
pub type SharedState = Arc<Mutex<AppState>>;

pub struct AppState {
    pub engine: MarketEngine,
    operator_key: Option<OperatorKey>,
    state_path: PathBuf,
}

impl AppState {
    pub fn new(engine: MarketEngine, operator_key: Option<OperatorKey>, state_path: impl Into<PathBuf>) -> Self {
        Self {
            engine,
            operator_key,
            state_path: state_path.into(),
        }
    }

    /// Restore from the configured snapshot file, or start empty when there
    /// is none. An unreadable or unsound snapshot is an error: starting empty
    /// would overwrite it on the next save.
    pub fn load_or_new(config: &Config) -> Result<Self, PersistError> {
        let engine = match Self::load_from_disk(&config.state_path) {
            Ok(snapshot) => {
                let engine = MarketEngine::restore(config.engine.clone(), Arc::new(SystemClock), snapshot);
                let audit = engine.audit_all();
                if !audit.is_sound() {
                    error!(?audit, path = %config.state_path.display(), "restored ledger failed its audit");
                    return Err(PersistError::Unsound {
                        path: config.state_path.display().to_string(),
                    });
                }
                info!(path = %config.state_path.display(), markets = audit.markets.len(), "loaded persisted state");
                engine
            }
            Err(PersistError::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("no persisted state found, starting fresh");
                MarketEngine::with_system_clock(config.engine.clone())
            }
            Err(e) => {
                error!(error = %e, path = %config.state_path.display(), "failed to load persisted state");
                return Err(e);
            }
        };

        if config.operator_key.is_none() {
            warn!("LEDGER_OPERATOR_KEY not set, operator routes are disabled");
        }

        Ok(Self::new(engine, config.operator_key.clone(), config.state_path.clone()))
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    pub fn save_to_disk(&self) -> Result<(), PersistError> {
        if let Some(dir) = self.state_path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)?;
            }
        }

        let json = serde_json::to_string_pretty(&self.engine.snapshot())?;

        // Write then rename so a crash never leaves a half-written snapshot
        let tmp = self.state_path.with_extension("json.tmp");
        fs::write(&tmp, json)?;
        fs::rename(&tmp, &self.state_path)?;

        info!(path = %self.state_path.display(), "state saved to disk");
        Ok(())
    }

    fn load_from_disk(path: &Path) -> Result<LedgerSnapshot, PersistError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Check the operator secret presented with an HTTP request
    pub fn verify_operator_key(&self, presented: Option<&str>) -> LedgerResult<()> {
        let key = self
            .operator_key
            .as_ref()
            .ok_or_else(|| LedgerError::Unauthorized("operator routes are disabled".to_string()))?;

        match presented {
            Some(secret) if key.verify(secret) => Ok(()),
            Some(_) => Err(LedgerError::Unauthorized("invalid operator key".to_string())),
            None => Err(LedgerError::Unauthorized("missing x-operator-key header".to_string())),
        }
    }
}

/// Save the ledger every `interval` until the task is aborted, so a hard
/// kill loses at most one interval of activity
pub async fn autosave(state: SharedState, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick fires immediately
    ticker.tick().await;

    loop {
        ticker.tick().await;
        let app_state = state.lock().await;
        if let Err(e) = app_state.save_to_disk() {
            error!(error = %e, "periodic save failed");
        }
    }
}
