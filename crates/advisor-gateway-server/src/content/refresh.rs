use crate::content::store::ContentStore;
use crate::content::sha256_hex;
use crate::upstream::ContentBackend;
use advisor_gateway_model::RuleContentDirectory;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

struct RefreshTask {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// Owns the periodic refresh lifecycle: `Stopped -> Running -> Stopped`.
/// `start` spawns one background task; `stop` signals it and waits for it
/// to exit, so no detached work survives the call. Both are idempotent and
/// the pair can be cycled any number of times.
#[derive(Default)]
pub struct ContentRefresher {
    running: Mutex<Option<RefreshTask>>,
}

impl ContentRefresher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Begins periodic refreshing. The first tick fires immediately so a
    /// freshly started gateway does not wait a full interval for content.
    /// Returns false without side effects when the loop is already running.
    pub async fn start(
        &self,
        interval: Duration,
        backend: Arc<dyn ContentBackend>,
        store: Arc<ContentStore>,
    ) -> bool {
        let mut slot = self.running.lock().await;
        if slot.is_some() {
            warn!("content refresher already running; start ignored");
            return false;
        }
        let (shutdown, mut signal) = watch::channel(false);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        refresh_once(backend.as_ref(), &store).await;
                    }
                    changed = signal.changed() => {
                        if changed.is_err() || *signal.borrow() {
                            break;
                        }
                    }
                }
            }
            info!("content refresh loop exited");
        });
        *slot = Some(RefreshTask { shutdown, handle });
        true
    }

    /// Signals the loop to terminate and waits for the in-flight tick (if
    /// any) to complete and the task to exit. Safe to call when the loop
    /// was never started.
    pub async fn stop(&self) {
        let task = self.running.lock().await.take();
        if let Some(task) = task {
            let _ = task.shutdown.send(true);
            if let Err(e) = task.handle.await {
                error!(error = %e, "content refresh task join failed");
            }
        }
    }
}

/// One refresh attempt. A failure leaves the current snapshot untouched;
/// the next tick is an independent attempt.
pub async fn refresh_once(backend: &dyn ContentBackend, store: &ContentStore) -> bool {
    match backend.fetch_all().await {
        Ok(archive) => {
            let generation = sha256_hex(&bincode::serialize(&archive).unwrap_or_default());
            let fetched = archive.rules.len();
            let directory = RuleContentDirectory::from_rules(archive.rules, generation.clone());
            if directory.len() != fetched {
                warn!(
                    fetched,
                    kept = directory.len(),
                    "content archive contained duplicate rule modules"
                );
            }
            info!(
                generation = %generation,
                rules = directory.len(),
                "content snapshot installed"
            );
            store.replace(directory);
            true
        }
        Err(e) => {
            error!(error = %e, "content refresh failed; keeping current snapshot");
            false
        }
    }
}
