use crowdcore::api_interface::{
    CountRecord, CurrentCount, DetectionSettings, ModelInfo, ModelKind, PreviewFrame, Room,
    RoomCreate, RoomUpdate, SettingsError, SettingsUpdate, SystemStatus,
};
use crowdcore::math::{classify, occupancy_percent, round_tenth, EmaCounter};
use chrono::{Duration, NaiveDateTime, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Longest history window the API serves, in hours.
pub const MAX_HISTORY_HOURS: u32 = 72;
pub const DEFAULT_HISTORY_HOURS: u32 = 10;

pub type SharedState = Arc<RwLock<SimState>>;

/// Naive UTC wall clock, the timestamp format the API speaks.
pub fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

pub fn read_state(state: &SharedState) -> RwLockReadGuard<'_, SimState> {
    state.read().unwrap_or_else(PoisonError::into_inner)
}

pub fn write_state(state: &SharedState) -> RwLockWriteGuard<'_, SimState> {
    state.write().unwrap_or_else(PoisonError::into_inner)
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum StoreError {
    #[error("Room not found")]
    RoomNotFound,
    #[error("Room with this ID already exists")]
    Duplicate,
    #[error("No preview available for this room")]
    NoPreview,
    #[error("{0}")]
    Invalid(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

pub fn available_models() -> Vec<ModelInfo> {
    let model = |id: &str, name: &str, description: &str, kind| ModelInfo {
        id: id.into(),
        name: name.into(),
        description: description.into(),
        kind,
    };
    vec![
        model(
            "yolo26m.pt",
            "YOLO26m (Person Detection)",
            "General person detection, good for normal scenes",
            ModelKind::Person,
        ),
        model(
            "models/yolov8-crowdhuman.pt",
            "YOLOv8 CrowdHuman (Head Detection)",
            "Best for dense crowds, trained on CrowdHuman dataset",
            ModelKind::Head,
        ),
        model(
            "models/yolov8-head-medium.pt",
            "YOLOv8 SCUT-HEAD Medium",
            "Head detection, balanced accuracy/speed",
            ModelKind::Head,
        ),
        model(
            "models/yolov8-head-nano.pt",
            "YOLOv8 SCUT-HEAD Nano",
            "Fast head detection, lower accuracy",
            ModelKind::Head,
        ),
    ]
}

#[derive(Debug)]
struct RoomEntry {
    room: Room,
    counter: EmaCounter,
    preview: Option<PreviewFrame>,
}

/// In-memory backend state shared between the HTTP routes and the ticker.
#[derive(Debug)]
pub struct SimState {
    rooms: BTreeMap<String, RoomEntry>,
    history: Vec<CountRecord>,
    next_record_id: u64,
    settings: DetectionSettings,
    started_at: NaiveDateTime,
    inference_ms: Option<f64>,
}

impl SimState {
    pub fn new(settings: DetectionSettings, started_at: NaiveDateTime) -> Self {
        Self {
            rooms: BTreeMap::new(),
            history: Vec::new(),
            next_record_id: 1,
            settings,
            started_at,
            inference_ms: None,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }

    /// Rooms with live fields, ordered by name.
    pub fn list_rooms(&self) -> Vec<Room> {
        let mut rooms: Vec<Room> = self.rooms.values().map(|entry| entry.room.clone()).collect();
        rooms.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
        rooms
    }

    pub fn room_ids(&self) -> Vec<(String, u32, bool)> {
        self.rooms
            .values()
            .map(|entry| (entry.room.id.clone(), entry.room.capacity, entry.room.is_active))
            .collect()
    }

    pub fn get_room(&self, room_id: &str) -> Result<Room, StoreError> {
        self.entry(room_id).map(|entry| entry.room.clone())
    }

    pub fn create_room(&mut self, create: RoomCreate, now: NaiveDateTime) -> Result<Room, StoreError> {
        create.validate().map_err(StoreError::Invalid)?;
        if self.rooms.contains_key(&create.id) {
            return Err(StoreError::Duplicate);
        }
        let mut room = Room::new(create.id.clone(), create.name, create.capacity);
        room.camera_url = create.camera_url;
        room.is_active = create.is_active;
        room.created_at = Some(now);
        let entry = RoomEntry {
            room: room.clone(),
            counter: EmaCounter::new(self.settings.smoothing_alpha),
            preview: None,
        };
        self.rooms.insert(create.id, entry);
        Ok(room)
    }

    pub fn update_room(&mut self, room_id: &str, update: &RoomUpdate) -> Result<Room, StoreError> {
        if update.capacity == Some(0) {
            return Err(StoreError::Invalid("capacity must be greater than zero".into()));
        }
        if update.name.as_deref().is_some_and(|name| name.trim().is_empty()) {
            return Err(StoreError::Invalid("room name must not be empty".into()));
        }
        let entry = self.rooms.get_mut(room_id).ok_or(StoreError::RoomNotFound)?;
        update.apply_to(&mut entry.room);
        refresh_live_fields(&mut entry.room);
        Ok(entry.room.clone())
    }

    /// Removes the room together with its count history.
    pub fn delete_room(&mut self, room_id: &str) -> Result<(), StoreError> {
        self.rooms.remove(room_id).ok_or(StoreError::RoomNotFound)?;
        self.history.retain(|record| record.room_id != room_id);
        Ok(())
    }

    pub fn current(&self, room_id: &str) -> Result<CurrentCount, StoreError> {
        let room = &self.entry(room_id)?.room;
        Ok(CurrentCount {
            room_id: room.id.clone(),
            room_name: room.name.clone(),
            count: room.count,
            raw_count: room.raw_count,
            capacity: room.capacity,
            occupancy_percent: room.occupancy_percent,
            status: room.status,
            timestamp: room.last_updated,
        })
    }

    /// Count records from the last `hours` hours, oldest first.
    pub fn history(
        &self,
        room_id: &str,
        hours: u32,
        now: NaiveDateTime,
    ) -> Result<Vec<CountRecord>, StoreError> {
        if !(1..=MAX_HISTORY_HOURS).contains(&hours) {
            return Err(StoreError::Invalid(format!(
                "hours must be between 1 and {}",
                MAX_HISTORY_HOURS
            )));
        }
        self.entry(room_id)?;
        let since = now - Duration::hours(hours as i64);
        let mut records: Vec<CountRecord> = self
            .history
            .iter()
            .filter(|record| record.room_id == room_id && record.timestamp >= since)
            .cloned()
            .collect();
        records.sort_by_key(|record| (record.timestamp, record.id));
        Ok(records)
    }

    pub fn preview(&self, room_id: &str) -> Result<PreviewFrame, StoreError> {
        self.entry(room_id)?
            .preview
            .clone()
            .ok_or(StoreError::NoPreview)
    }

    pub fn set_preview(&mut self, room_id: &str, frame: String, detections: u32, now: NaiveDateTime) {
        if let Some(entry) = self.rooms.get_mut(room_id) {
            entry.preview = Some(PreviewFrame {
                room_id: room_id.to_string(),
                frame,
                detections,
                timestamp: now,
            });
        }
    }

    pub fn settings(&self) -> &DetectionSettings {
        &self.settings
    }

    /// Applies a partial settings update; a new smoothing factor takes effect
    /// on every room's next sample.
    pub fn update_settings(&mut self, update: &SettingsUpdate) -> Result<DetectionSettings, StoreError> {
        let next = self.settings.merged(update)?;
        if next.smoothing_alpha != self.settings.smoothing_alpha {
            for entry in self.rooms.values_mut() {
                entry.counter.set_alpha(next.smoothing_alpha);
            }
        }
        self.settings = next;
        Ok(self.settings.clone())
    }

    pub fn status(&self, now: NaiveDateTime) -> SystemStatus {
        let uptime = now.signed_duration_since(self.started_at);
        SystemStatus {
            device: "cpu (simulated)".into(),
            model: self.settings.model.clone(),
            model_loaded: true,
            cameras_connected: self.rooms.values().filter(|entry| entry.room.is_active).count() as u32,
            cameras_total: self.rooms.len() as u32,
            uptime_seconds: uptime.num_milliseconds().max(0) as f64 / 1000.0,
            avg_inference_ms: round_tenth(self.inference_ms.unwrap_or(0.0)),
        }
    }

    /// Feeds one raw detection into the room's smoother and appends the
    /// resulting record to the history.
    pub fn record_count(
        &mut self,
        room_id: &str,
        raw: u32,
        inference_ms: f64,
        now: NaiveDateTime,
    ) -> Result<CountRecord, StoreError> {
        let entry = self.rooms.get_mut(room_id).ok_or(StoreError::RoomNotFound)?;
        let count = entry.counter.update(raw);
        entry.room.count = count;
        entry.room.raw_count = raw;
        entry.room.last_updated = Some(now);
        refresh_live_fields(&mut entry.room);

        let record = CountRecord {
            id: self.next_record_id,
            room_id: room_id.to_string(),
            count,
            raw_count: raw,
            occupancy: entry.room.occupancy_percent,
            timestamp: now,
        };
        self.next_record_id += 1;
        self.history.push(record.clone());

        self.inference_ms = Some(match self.inference_ms {
            None => inference_ms,
            Some(avg) => 0.9 * avg + 0.1 * inference_ms,
        });
        Ok(record)
    }

    /// Drops records older than the longest window the API can serve.
    pub fn prune_history(&mut self, now: NaiveDateTime) -> usize {
        let cutoff = now - Duration::hours(MAX_HISTORY_HOURS as i64);
        let before = self.history.len();
        self.history.retain(|record| record.timestamp >= cutoff);
        before - self.history.len()
    }

    fn entry(&self, room_id: &str) -> Result<&RoomEntry, StoreError> {
        self.rooms.get(room_id).ok_or(StoreError::RoomNotFound)
    }
}

fn refresh_live_fields(room: &mut Room) {
    let percent = occupancy_percent(room.count, room.capacity);
    room.occupancy_percent = round_tenth(percent);
    room.status = classify(percent);
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use crowdcore::math::OccupancyStatus;

    fn at(hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 1)
            .and_then(|day| day.and_hms_opt(hour, minute, 0))
            .unwrap()
    }

    fn create(id: &str, name: &str, capacity: u32) -> RoomCreate {
        RoomCreate {
            id: id.into(),
            name: name.into(),
            capacity,
            camera_url: String::new(),
            is_active: true,
        }
    }

    fn state_with_hall() -> SimState {
        let mut state = SimState::new(DetectionSettings::default(), at(8, 0));
        state.create_room(create("hall-1", "Main Hall", 300), at(8, 0)).unwrap();
        state
    }

    #[test]
    fn rooms_are_listed_by_name() {
        let mut state = state_with_hall();
        state.create_room(create("z", "Annex", 10), at(8, 0)).unwrap();
        let names: Vec<String> = state.list_rooms().into_iter().map(|room| room.name).collect();
        assert_eq!(names, vec!["Annex", "Main Hall"]);
    }

    #[test]
    fn duplicate_and_invalid_rooms_are_rejected() {
        let mut state = state_with_hall();
        assert_eq!(
            state.create_room(create("hall-1", "Again", 10), at(8, 0)),
            Err(StoreError::Duplicate)
        );
        assert!(matches!(
            state.create_room(create("x", "X", 0), at(8, 0)),
            Err(StoreError::Invalid(_))
        ));
    }

    #[test]
    fn record_count_smooths_and_classifies() {
        let mut state = state_with_hall();
        let first = state.record_count("hall-1", 120, 20.0, at(9, 0)).unwrap();
        assert_eq!(first.count, 120);
        assert_eq!(first.occupancy, 40.0);

        let room = state.get_room("hall-1").unwrap();
        assert_eq!(room.status, OccupancyStatus::Medium);
        assert_eq!(room.last_updated, Some(at(9, 0)));

        // 0.3 * 220 + 0.7 * 120 = 150
        let second = state.record_count("hall-1", 220, 20.0, at(9, 1)).unwrap();
        assert_eq!(second.count, 150);
        assert_eq!(second.raw_count, 220);
        assert_eq!(state.current("hall-1").unwrap().occupancy_percent, 50.0);
    }

    #[test]
    fn history_filters_by_window_in_ascending_order() {
        let mut state = state_with_hall();
        state.record_count("hall-1", 10, 20.0, at(1, 0)).unwrap();
        state.record_count("hall-1", 20, 20.0, at(9, 0)).unwrap();
        state.record_count("hall-1", 30, 20.0, at(11, 30)).unwrap();

        let records = state.history("hall-1", 10, at(12, 0)).unwrap();
        let stamps: Vec<NaiveDateTime> = records.iter().map(|r| r.timestamp).collect();
        assert_eq!(stamps, vec![at(9, 0), at(11, 30)]);

        assert!(matches!(
            state.history("hall-1", 0, at(12, 0)),
            Err(StoreError::Invalid(_))
        ));
        assert!(matches!(
            state.history("hall-1", 73, at(12, 0)),
            Err(StoreError::Invalid(_))
        ));
        assert_eq!(state.history("nope", 10, at(12, 0)), Err(StoreError::RoomNotFound));
    }

    #[test]
    fn delete_removes_history() {
        let mut state = state_with_hall();
        state.record_count("hall-1", 10, 20.0, at(9, 0)).unwrap();
        state.delete_room("hall-1").unwrap();
        assert_eq!(state.get_room("hall-1"), Err(StoreError::RoomNotFound));
        state.create_room(create("hall-1", "Main Hall", 300), at(10, 0)).unwrap();
        assert!(state.history("hall-1", 72, at(10, 0)).unwrap().is_empty());
        assert_eq!(state.delete_room("ghost"), Err(StoreError::RoomNotFound));
    }

    #[test]
    fn capacity_change_recomputes_occupancy() {
        let mut state = state_with_hall();
        state.record_count("hall-1", 120, 20.0, at(9, 0)).unwrap();
        let update = RoomUpdate {
            capacity: Some(150),
            ..Default::default()
        };
        let room = state.update_room("hall-1", &update).unwrap();
        assert_eq!(room.occupancy_percent, 80.0);
        assert_eq!(room.status, OccupancyStatus::High);
    }

    #[test]
    fn settings_update_validates_and_retunes_smoothing() {
        let mut state = state_with_hall();
        let bad = SettingsUpdate {
            confidence_threshold: Some(1.5),
            ..Default::default()
        };
        assert!(matches!(state.update_settings(&bad), Err(StoreError::Settings(_))));

        let alpha = SettingsUpdate {
            smoothing_alpha: Some(1.0),
            ..Default::default()
        };
        state.update_settings(&alpha).unwrap();
        state.record_count("hall-1", 100, 20.0, at(9, 0)).unwrap();
        let second = state.record_count("hall-1", 10, 20.0, at(9, 1)).unwrap();
        assert_eq!(second.count, 10);
    }

    #[test]
    fn preview_is_missing_until_rendered() {
        let mut state = state_with_hall();
        assert_eq!(state.preview("hall-1"), Err(StoreError::NoPreview));
        state.set_preview("hall-1", "data:image/x-portable-graymap;base64,AA==".into(), 4, at(9, 0));
        assert_eq!(state.preview("hall-1").unwrap().detections, 4);
    }

    #[test]
    fn prune_drops_records_past_the_longest_window() {
        let mut state = state_with_hall();
        state.record_count("hall-1", 1, 20.0, at(0, 0)).unwrap();
        let later = at(0, 0) + Duration::hours(73);
        state.record_count("hall-1", 2, 20.0, later).unwrap();
        assert_eq!(state.prune_history(later), 1);
    }

    #[test]
    fn status_reports_cameras_and_uptime() {
        let mut state = state_with_hall();
        state
            .update_room(
                "hall-1",
                &RoomUpdate {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .unwrap();
        state.create_room(create("lab", "Lab", 20), at(8, 0)).unwrap();
        let status = state.status(at(8, 30));
        assert_eq!(status.cameras_total, 2);
        assert_eq!(status.cameras_connected, 1);
        assert_eq!(status.uptime_seconds, 1800.0);
        assert_eq!(status.model, "yolo26m.pt");
    }
}
