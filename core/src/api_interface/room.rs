use crate::math::status::OccupancyStatus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

fn default_active() -> bool {
    true
}

/// A monitored room together with its latest live count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RoomRecord")]
pub struct Room {
    pub id: String,
    pub name: String,
    pub capacity: u32,
    pub camera_url: String,
    pub is_active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
    pub count: u32,
    pub raw_count: u32,
    pub occupancy_percent: f64,
    pub status: OccupancyStatus,
    pub last_updated: Option<NaiveDateTime>,
    #[serde(skip)]
    pub reported: ReportedFields,
}

/// Which live fields of a decoded room were actually present on the wire.
/// Rooms built locally report every field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportedFields {
    pub count: bool,
    pub raw_count: bool,
    pub occupancy_percent: bool,
    pub status: bool,
}

impl ReportedFields {
    pub fn all() -> Self {
        Self {
            count: true,
            raw_count: true,
            occupancy_percent: true,
            status: true,
        }
    }
}

impl Default for ReportedFields {
    fn default() -> Self {
        Self::all()
    }
}

#[derive(Deserialize)]
struct RoomRecord {
    id: String,
    name: String,
    capacity: u32,
    camera_url: String,
    #[serde(default = "default_active")]
    is_active: bool,
    #[serde(default)]
    created_at: Option<NaiveDateTime>,
    count: Option<u32>,
    raw_count: Option<u32>,
    occupancy_percent: Option<f64>,
    status: Option<OccupancyStatus>,
    #[serde(default)]
    last_updated: Option<NaiveDateTime>,
}

impl From<RoomRecord> for Room {
    fn from(record: RoomRecord) -> Self {
        Self {
            reported: ReportedFields {
                count: record.count.is_some(),
                raw_count: record.raw_count.is_some(),
                occupancy_percent: record.occupancy_percent.is_some(),
                status: record.status.is_some(),
            },
            id: record.id,
            name: record.name,
            capacity: record.capacity,
            camera_url: record.camera_url,
            is_active: record.is_active,
            created_at: record.created_at,
            count: record.count.unwrap_or_default(),
            raw_count: record.raw_count.unwrap_or_default(),
            occupancy_percent: record.occupancy_percent.unwrap_or_default(),
            status: record.status.unwrap_or_default(),
            last_updated: record.last_updated,
        }
    }
}

impl Room {
    /// A room with no count recorded yet.
    pub fn new(id: impl Into<String>, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
            camera_url: String::new(),
            is_active: true,
            created_at: None,
            count: 0,
            raw_count: 0,
            occupancy_percent: 0.0,
            status: OccupancyStatus::Empty,
            last_updated: None,
            reported: ReportedFields::all(),
        }
    }
}

/// Body of `POST /api/rooms`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomCreate {
    pub id: String,
    pub name: String,
    pub capacity: u32,
    pub camera_url: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl RoomCreate {
    pub fn validate(&self) -> Result<(), String> {
        if self.id.trim().is_empty() {
            return Err("room id must not be empty".into());
        }
        if self.name.trim().is_empty() {
            return Err("room name must not be empty".into());
        }
        if self.capacity == 0 {
            return Err("capacity must be greater than zero".into());
        }
        Ok(())
    }
}

/// Partial body of `PUT /api/rooms/{id}`; absent fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoomUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub camera_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl RoomUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.capacity.is_none()
            && self.camera_url.is_none()
            && self.is_active.is_none()
    }

    pub fn apply_to(&self, room: &mut Room) {
        if let Some(name) = &self.name {
            room.name = name.clone();
        }
        if let Some(capacity) = self.capacity {
            room.capacity = capacity;
        }
        if let Some(camera_url) = &self.camera_url {
            room.camera_url = camera_url.clone();
        }
        if let Some(is_active) = self.is_active {
            room.is_active = is_active;
        }
    }
}

/// Response of `GET /api/rooms/{id}/current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentCount {
    pub room_id: String,
    pub room_name: String,
    pub count: u32,
    pub raw_count: u32,
    pub capacity: u32,
    pub occupancy_percent: f64,
    pub status: OccupancyStatus,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
}

/// One stored sample of `GET /api/rooms/{id}/history`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountRecord {
    pub id: u64,
    pub room_id: String,
    pub count: u32,
    pub raw_count: u32,
    pub occupancy: f64,
    pub timestamp: NaiveDateTime,
}
