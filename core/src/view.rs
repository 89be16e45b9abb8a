//! View state owned by the presentation layer.
//!
//! `LiveView` holds the reconciled room collection for one subscription and
//! only moves forward: it absorbs a `PollState` once per committed cycle.
//! Render models (`RoomCard`, `DashboardSummary`) are derived on demand and
//! never stored.

use crate::api_interface::Room;
use crate::math::{classify, occupancy_percent, OccupancyStatus, StatusColor};
use crate::sync::{apply_all, merge_roster, PollState, RoomCollection};
use chrono::NaiveDateTime;
use std::sync::Arc;

#[derive(Debug, Clone, Default)]
pub struct LiveView {
    rooms: RoomCollection,
    frame: Option<String>,
    live: bool,
    synced: bool,
    applied_seq: Option<u64>,
    last_error: Option<String>,
}

impl LiveView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds a committed poll state into the view.
    ///
    /// Returns `false` when the state is not newer than what the view has
    /// already seen. A failed cycle only updates liveness and the error; the
    /// rooms stay as they were. The roster settles membership and static
    /// fields, then each room's live fields are merged from what the backend
    /// actually sent.
    pub fn absorb(&mut self, state: &PollState) -> bool {
        let Some(seq) = state.seq else {
            return false;
        };
        if self.applied_seq.is_some_and(|applied| seq <= applied) {
            return false;
        }
        self.applied_seq = Some(seq);
        self.live = state.live;
        self.last_error = state.last_error.as_ref().map(|err| err.message());

        if state.live {
            if let Some(batch) = &state.batch {
                let rooms = merge_roster(std::mem::take(&mut self.rooms), &batch.roster);
                self.rooms = apply_all(rooms, &batch.messages);
                self.synced = true;
                // Keep the previous frame when this cycle had none.
                if let Some(frame) = batch.messages.iter().rev().find_map(|m| m.frame.clone()) {
                    self.frame = Some(frame);
                }
            }
        }
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn rooms(&self) -> &[Arc<Room>] {
        &self.rooms
    }

    pub fn room(&self, room_id: &str) -> Option<&Arc<Room>> {
        self.rooms.iter().find(|room| room.id == room_id)
    }

    pub fn frame(&self) -> Option<&str> {
        self.frame.as_deref()
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    /// Whether at least one successful cycle has been absorbed.
    pub fn has_data(&self) -> bool {
        self.synced
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn cards(&self) -> Vec<RoomCard> {
        self.rooms.iter().map(|room| RoomCard::from_room(room)).collect()
    }

    pub fn summary(&self) -> DashboardSummary {
        DashboardSummary::from_rooms(&self.rooms)
    }
}

/// Render model of one room tile.
#[derive(Debug, Clone, PartialEq)]
pub struct RoomCard {
    pub id: String,
    pub name: String,
    pub count: u32,
    pub raw_count: u32,
    pub capacity: u32,
    /// Unrounded; only the label rounds.
    pub occupancy_percent: f64,
    pub status: OccupancyStatus,
    pub color: StatusColor,
    pub is_active: bool,
    pub last_updated: Option<NaiveDateTime>,
}

impl RoomCard {
    pub fn from_room(room: &Room) -> Self {
        let percent = occupancy_percent(room.count, room.capacity);
        let status = classify(percent);
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            count: room.count,
            raw_count: room.raw_count,
            capacity: room.capacity,
            occupancy_percent: percent,
            status,
            color: status.color(),
            is_active: room.is_active,
            last_updated: room.last_updated,
        }
    }

    pub fn occupancy_label(&self) -> String {
        format!("{:.1}%", self.occupancy_percent)
    }

    pub fn count_label(&self) -> String {
        format!("{} / {}", self.count, self.capacity)
    }

    /// Fill fraction for progress bars, clamped to `[0, 1]`.
    pub fn progress(&self) -> f32 {
        (self.occupancy_percent / 100.0).clamp(0.0, 1.0) as f32
    }

    pub fn updated_label(&self, now: NaiveDateTime) -> String {
        match self.last_updated {
            None => "never updated".to_string(),
            Some(at) => age_label(now.signed_duration_since(at)),
        }
    }
}

fn age_label(age: chrono::Duration) -> String {
    let seconds = age.num_seconds().max(0);
    if seconds < 60 {
        format!("{}s ago", seconds)
    } else if seconds < 3600 {
        format!("{}m ago", seconds / 60)
    } else {
        format!("{}h ago", seconds / 3600)
    }
}

/// Totals across the displayed collection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DashboardSummary {
    pub room_count: usize,
    pub active_rooms: usize,
    pub total_count: u64,
    pub total_capacity: u64,
    pub occupancy_percent: f64,
    pub status: OccupancyStatus,
}

impl DashboardSummary {
    pub fn from_rooms(rooms: &[Arc<Room>]) -> Self {
        let total_count: u64 = rooms.iter().map(|room| room.count as u64).sum();
        let total_capacity: u64 = rooms.iter().map(|room| room.capacity as u64).sum();
        let percent = if total_capacity == 0 {
            0.0
        } else {
            total_count as f64 / total_capacity as f64 * 100.0
        };
        Self {
            room_count: rooms.len(),
            active_rooms: rooms.iter().filter(|room| room.is_active).count(),
            total_count,
            total_capacity,
            occupancy_percent: percent,
            status: classify(percent),
        }
    }
}
