pub mod client;
pub mod poller;
pub mod reconcile;
pub mod tracker;

pub use client::{ApiClient, ClientConfig};
pub use poller::{run_cycle, Poller, SubscriptionHandle};
pub use reconcile::{
    apply_all, apply_update, merge_roster, merge_snapshot, RoomCollection, SnapshotKind,
};
pub use tracker::{
    CommitOutcome, CycleBatch, CycleTicket, PollState, PollTracker, Subscription,
    SubscriptionTarget, POLL_INTERVAL,
};
