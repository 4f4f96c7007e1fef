//! Scheduler engine — the periodic loop that finds due campaigns and hands
//! them to dispatch tasks. Uses tokio::interval for zero-overhead ticking.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Datelike, Local, Timelike, Utc};
use tokio::sync::watch;
use tokio::task::{JoinHandle, JoinSet};
use uuid::Uuid;

use blastline_core::error::Result;
use blastline_core::traits::{CampaignStore, MessageSender};

use crate::dispatch;
use crate::notify::NotifyRouter;

/// The campaign scheduler — scans for due campaigns and starts their runs.
///
/// Scans happen one at a time inside a single task, and a campaign is claimed
/// (status flipped and persisted) before its dispatch task is spawned. Two
/// ticks can therefore never start the same campaign twice.
pub struct CampaignScheduler {
    store: Arc<dyn CampaignStore>,
    sender: Arc<dyn MessageSender>,
    router: Arc<NotifyRouter>,
    tick_interval: Duration,
}

impl CampaignScheduler {
    pub fn new(
        store: Arc<dyn CampaignStore>,
        sender: Arc<dyn MessageSender>,
        router: Arc<NotifyRouter>,
        tick_interval: Duration,
    ) -> Self {
        Self {
            store,
            sender,
            router,
            tick_interval,
        }
    }

    /// One scan against the real clock.
    pub async fn poll_once(&self, user_id: &str, dispatches: &mut JoinSet<Uuid>) -> Result<usize> {
        self.scan(user_id, Utc::now(), &Local::now().naive_local(), None, dispatches)
            .await
    }

    /// One scan at a given instant: claim every due campaign and spawn its
    /// dispatch. Returns how many campaigns were started.
    pub async fn poll_at<T: Datelike + Timelike>(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        local_now: &T,
        dispatches: &mut JoinSet<Uuid>,
    ) -> Result<usize> {
        self.scan(user_id, now, local_now, None, dispatches).await
    }

    async fn scan<T: Datelike + Timelike>(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
        local_now: &T,
        stop_rx: Option<&watch::Receiver<bool>>,
        dispatches: &mut JoinSet<Uuid>,
    ) -> Result<usize> {
        let campaigns = self.store.list_for_user(user_id).await?;
        let mut started = 0;

        for campaign in campaigns {
            // A stop request lands here too: nothing new may start once
            // teardown has been asked for, even mid-scan.
            if stop_rx.is_some_and(|rx| *rx.borrow()) {
                break;
            }
            if !campaign.is_due(now, local_now) {
                continue;
            }
            let name = campaign.name.clone();
            match dispatch::claim(campaign, &self.store).await {
                Ok(claimed) => {
                    started += 1;
                    let store = Arc::clone(&self.store);
                    let sender = Arc::clone(&self.sender);
                    let router = Arc::clone(&self.router);
                    dispatches.spawn(async move {
                        let id = claimed.id;
                        dispatch::run_campaign(claimed, store, sender, router).await;
                        id
                    });
                }
                Err(e) => {
                    tracing::warn!("⚠️ Could not claim campaign '{name}': {e}");
                }
            }
        }

        Ok(started)
    }

    /// Spawn the scheduler loop as a background tokio task.
    pub fn start(self: Arc<Self>, user_id: impl Into<String>) -> SchedulerHandle {
        let user_id = user_id.into();
        let (stop_tx, stop_rx) = watch::channel(false);
        let task = tokio::spawn(async move {
            self.run(user_id, stop_rx).await;
        });
        SchedulerHandle { stop_tx, task }
    }

    async fn run(&self, user_id: String, stop_rx: watch::Receiver<bool>) {
        tracing::info!(
            "⏰ Campaign scheduler started for '{}' (check every {}s)",
            user_id,
            self.tick_interval.as_secs()
        );

        let mut interval = tokio::time::interval(self.tick_interval);
        let mut dispatches: JoinSet<Uuid> = JoinSet::new();
        // Second receiver for the wakeup so the scan can keep reading stop_rx.
        let mut stop_signal = stop_rx.clone();

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    let scan = self
                        .scan(&user_id, Utc::now(), &Local::now().naive_local(), Some(&stop_rx), &mut dispatches)
                        .await;
                    match scan {
                        Ok(started) if started > 0 => {
                            tracing::debug!("Scan started {started} campaign(s)");
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!("⚠️ Campaign scan failed: {e}"),
                    }
                    // Reap finished dispatches without blocking the tick.
                    while let Some(finished) = dispatches.try_join_next() {
                        match finished {
                            Ok(id) => tracing::debug!("Dispatch task for {id} finished"),
                            Err(e) => tracing::warn!("⚠️ Dispatch task failed: {e}"),
                        }
                    }
                }
                changed = stop_signal.changed() => {
                    // A closed channel means the handle is gone and no stop
                    // can ever arrive; treat it as one.
                    if changed.is_err() || *stop_signal.borrow() {
                        break;
                    }
                }
            }
        }

        // No new scans from here on; let in-flight campaigns finish.
        if !dispatches.is_empty() {
            tracing::info!(
                "Campaign scheduler stopping; waiting for {} in-flight dispatch(es)",
                dispatches.len()
            );
        }
        while let Some(finished) = dispatches.join_next().await {
            if let Err(e) = finished {
                tracing::warn!("⚠️ Dispatch task failed: {e}");
            }
        }
        tracing::info!("Campaign scheduler stopped");
    }
}

/// Handle to a running scheduler loop.
///
/// Dropping the handle closes the stop channel, which the loop treats as a
/// stop request; in-flight dispatches still run to completion.
pub struct SchedulerHandle {
    stop_tx: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    /// Ask the loop to stop after the current scan. In-flight dispatches
    /// keep running until they complete.
    pub fn stop(&self) {
        let _ = self.stop_tx.send(true);
    }

    /// Wait for the loop (and its in-flight dispatches) to finish.
    pub async fn join(self) {
        let _ = self.task.await;
    }

    /// `stop()` followed by `join()`.
    pub async fn shutdown(self) {
        self.stop();
        self.join().await;
    }
}
