use crate::api_interface::{LiveUpdateMessage, Room};
use crate::prelude::{RequestError, RequestResult};
use crate::telemetry::{LogManager, MetricsRecorder, PollMetrics};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Cadence every subscription polls at unless configured otherwise.
pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// What a subscription keeps polling.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SubscriptionTarget {
    Dashboard,
    Room(String),
}

impl SubscriptionTarget {
    pub fn path(&self) -> String {
        match self {
            SubscriptionTarget::Dashboard => "dashboard".to_string(),
            SubscriptionTarget::Room(id) => format!("room/{}", id),
        }
    }
}

impl fmt::Display for SubscriptionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

/// A `(path, cadence)` pair bound to the lifetime of the view consuming it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub target: SubscriptionTarget,
    pub cadence: Duration,
}

impl Subscription {
    pub fn dashboard() -> Self {
        Self {
            target: SubscriptionTarget::Dashboard,
            cadence: POLL_INTERVAL,
        }
    }

    pub fn room(room_id: impl Into<String>) -> Self {
        Self {
            target: SubscriptionTarget::Room(room_id.into()),
            cadence: POLL_INTERVAL,
        }
    }

    pub fn with_cadence(mut self, cadence: Duration) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn path(&self) -> String {
        self.target.path()
    }
}

/// Identity of one poll cycle: the subscription epoch it was started in and
/// its sequence number within the subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleTicket {
    pub epoch: u64,
    pub seq: u64,
}

/// What one successful cycle fetched.
///
/// `roster` carries the rooms as returned (membership and static fields);
/// `messages` carries one live update per room in roster order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CycleBatch {
    pub roster: Vec<Room>,
    pub messages: Vec<LiveUpdateMessage>,
}

/// Latest committed outcome of a subscription.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PollState {
    /// Sequence number of the last committed cycle.
    pub seq: Option<u64>,
    /// Whether the last committed cycle succeeded.
    pub live: bool,
    /// Last successful batch; survives failed cycles.
    pub batch: Option<Arc<CycleBatch>>,
    pub last_error: Option<RequestError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    Failed,
    /// A newer cycle was already committed.
    Stale,
    /// The subscription was cancelled or retargeted after the cycle began.
    Cancelled,
}

/// Issues cycle tickets and decides which results may be committed.
pub struct PollTracker {
    subscription: Subscription,
    epoch: u64,
    next_seq: u64,
    state: PollState,
    logger: LogManager,
    metrics: Arc<MetricsRecorder>,
}

impl PollTracker {
    pub fn new(subscription: Subscription) -> Self {
        Self::with_metrics(subscription, Arc::new(MetricsRecorder::new()))
    }

    pub fn with_metrics(subscription: Subscription, metrics: Arc<MetricsRecorder>) -> Self {
        let logger = LogManager::new(subscription.path());
        Self {
            subscription,
            epoch: 0,
            next_seq: 0,
            state: PollState::default(),
            logger,
            metrics,
        }
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn state(&self) -> &PollState {
        &self.state
    }

    pub fn is_live(&self) -> bool {
        self.state.live
    }

    pub fn metrics(&self) -> PollMetrics {
        self.metrics.snapshot()
    }

    pub fn begin_cycle(&mut self) -> CycleTicket {
        self.next_seq += 1;
        CycleTicket {
            epoch: self.epoch,
            seq: self.next_seq,
        }
    }

    /// Invalidates every ticket issued so far.
    pub fn cancel(&mut self) {
        self.epoch += 1;
        self.logger.trace("subscription cancelled");
    }

    /// Points the tracker at a new subscription, dropping the old state.
    pub fn retarget(&mut self, subscription: Subscription) {
        self.cancel();
        self.logger = LogManager::new(subscription.path());
        self.subscription = subscription;
        self.state = PollState::default();
    }

    pub fn commit(
        &mut self,
        ticket: CycleTicket,
        outcome: RequestResult<CycleBatch>,
    ) -> CommitOutcome {
        if ticket.epoch != self.epoch {
            self.metrics.record_cancelled();
            self.logger
                .trace(&format!("dropping cycle {} from a cancelled epoch", ticket.seq));
            return CommitOutcome::Cancelled;
        }
        if self.state.seq.is_some_and(|committed| ticket.seq <= committed) {
            self.metrics.record_stale();
            self.logger.trace(&format!(
                "dropping stale cycle {} (committed {:?})",
                ticket.seq, self.state.seq
            ));
            return CommitOutcome::Stale;
        }

        self.state.seq = Some(ticket.seq);
        match outcome {
            Ok(batch) => {
                if !self.state.live {
                    self.logger.record(&format!(
                        "live again at cycle {} ({} rooms)",
                        ticket.seq,
                        batch.roster.len()
                    ));
                }
                self.state.live = true;
                self.state.last_error = None;
                self.state.batch = Some(Arc::new(batch));
                self.metrics.record_applied();
                CommitOutcome::Applied
            }
            Err(err) => {
                if self.state.live {
                    self.logger
                        .warn(&format!("cycle {} failed: {}", ticket.seq, err));
                }
                self.state.live = false;
                self.state.last_error = Some(err);
                self.metrics.record_failed();
                CommitOutcome::Failed
            }
        }
    }
}
