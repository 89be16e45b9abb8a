use super::tracker::{CycleBatch, CycleTicket, PollState, PollTracker, Subscription, SubscriptionTarget};
use crate::api_interface::LiveUpdateMessage;
use crate::prelude::{BestEffort, RequestResult, RoomSource};
use crate::telemetry::{LogManager, MetricsRecorder, PollMetrics};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Fetches one cycle's worth of state for `target`.
///
/// A room cycle also asks for the preview frame; that sub-fetch is best
/// effort and only decides whether the message carries a frame.
pub async fn run_cycle<S: RoomSource>(
    source: &S,
    target: &SubscriptionTarget,
) -> RequestResult<CycleBatch> {
    match target {
        SubscriptionTarget::Dashboard => {
            let roster = source.list_rooms().await?;
            let messages = roster.iter().map(LiveUpdateMessage::from_room).collect();
            Ok(CycleBatch { roster, messages })
        }
        SubscriptionTarget::Room(room_id) => {
            let (room, preview) = tokio::join!(source.get_room(room_id), source.preview(room_id));
            let room = room?;
            let preview = BestEffort::from(preview);
            if let BestEffort::Unavailable(err) = &preview {
                LogManager::new(target.path()).trace(&format!("preview unavailable: {}", err));
            }
            let frame = preview.into_option().map(|preview| preview.frame);
            let message = LiveUpdateMessage::from_room(&room).with_frame(frame);
            Ok(CycleBatch {
                roster: vec![room],
                messages: vec![message],
            })
        }
    }
}

/// Spawns polling subscriptions against a shared source.
pub struct Poller<S> {
    source: Arc<S>,
}

impl<S> Clone for Poller<S> {
    fn clone(&self) -> Self {
        Self {
            source: Arc::clone(&self.source),
        }
    }
}

impl<S: RoomSource> Poller<S> {
    pub fn new(source: Arc<S>) -> Self {
        Self { source }
    }

    /// Starts polling on the current tokio runtime. The first fetch happens
    /// immediately; polling stops when the handle is cancelled or dropped.
    pub fn subscribe(&self, subscription: Subscription) -> SubscriptionHandle {
        let token = CancellationToken::new();
        let metrics = Arc::new(MetricsRecorder::new());
        let (state_tx, state_rx) = watch::channel(PollState::default());
        let task = tokio::spawn(drive(
            Arc::clone(&self.source),
            subscription.clone(),
            token.clone(),
            state_tx,
            Arc::clone(&metrics),
        ));
        SubscriptionHandle {
            subscription,
            token,
            state: state_rx,
            metrics,
            task,
        }
    }
}

async fn drive<S: RoomSource>(
    source: Arc<S>,
    subscription: Subscription,
    token: CancellationToken,
    state_tx: watch::Sender<PollState>,
    metrics: Arc<MetricsRecorder>,
) {
    let mut tracker = PollTracker::with_metrics(subscription.clone(), metrics);
    let (done_tx, mut done_rx) = mpsc::unbounded_channel::<(CycleTicket, RequestResult<CycleBatch>)>();
    let mut ticker = time::interval(subscription.cadence);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                tracker.cancel();
                break;
            }
            Some((ticket, outcome)) = done_rx.recv() => {
                let _ = tracker.commit(ticket, outcome);
                state_tx.send_if_modified(|state| {
                    if *state == *tracker.state() {
                        false
                    } else {
                        *state = tracker.state().clone();
                        true
                    }
                });
            }
            _ = ticker.tick() => {
                let ticket = tracker.begin_cycle();
                let source = Arc::clone(&source);
                let target = subscription.target.clone();
                let done = done_tx.clone();
                // Not aborted on cancellation; the tracker drops late results.
                tokio::spawn(async move {
                    let outcome = run_cycle(source.as_ref(), &target).await;
                    let _ = done.send((ticket, outcome));
                });
            }
        }
    }
}

/// Owner of a running subscription. Dropping it stops the timer.
pub struct SubscriptionHandle {
    subscription: Subscription,
    token: CancellationToken,
    state: watch::Receiver<PollState>,
    metrics: Arc<MetricsRecorder>,
    task: JoinHandle<()>,
}

impl SubscriptionHandle {
    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn state(&self) -> PollState {
        self.state.borrow().clone()
    }

    pub fn is_live(&self) -> bool {
        self.state.borrow().live
    }

    /// Waits for the next committed change. `None` once polling has stopped.
    pub async fn changed(&mut self) -> Option<PollState> {
        self.state.changed().await.ok()?;
        Some(self.state.borrow_and_update().clone())
    }

    pub fn metrics(&self) -> PollMetrics {
        self.metrics.snapshot()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels and waits for the polling task to wind down.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        let _ = (&mut self.task).await;
    }
}

impl Drop for SubscriptionHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
