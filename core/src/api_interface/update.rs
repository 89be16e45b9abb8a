use super::room::Room;
use crate::math::status::OccupancyStatus;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpdateKind {
    CountUpdate,
    #[serde(other)]
    Unknown,
}

/// Per-room live update produced by one poll cycle and consumed once by the
/// reconciler. Every payload field is optional so partial updates never
/// erase what the view already knows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiveUpdateMessage {
    #[serde(rename = "type")]
    pub kind: UpdateKind,
    pub room_id: String,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub raw_count: Option<u32>,
    #[serde(default)]
    pub occupancy_percent: Option<f64>,
    #[serde(default)]
    pub status: Option<OccupancyStatus>,
    #[serde(default)]
    pub timestamp: Option<NaiveDateTime>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
}

impl LiveUpdateMessage {
    pub fn count_update(room_id: impl Into<String>) -> Self {
        Self {
            kind: UpdateKind::CountUpdate,
            room_id: room_id.into(),
            count: None,
            raw_count: None,
            occupancy_percent: None,
            status: None,
            timestamp: None,
            frame: None,
        }
    }

    /// Snapshot of a room's live fields as a full count update.
    /// Live fields of `room`; fields the backend left out stay `None`.
    pub fn from_room(room: &Room) -> Self {
        let reported = room.reported;
        Self {
            count: reported.count.then_some(room.count),
            raw_count: reported.raw_count.then_some(room.raw_count),
            occupancy_percent: reported.occupancy_percent.then_some(room.occupancy_percent),
            status: reported.status.then_some(room.status),
            timestamp: room.last_updated,
            ..Self::count_update(room.id.clone())
        }
    }

    pub fn with_frame(mut self, frame: Option<String>) -> Self {
        self.frame = frame;
        self
    }
}

/// Latest annotated still for a room, as served by `/api/rooms/{id}/preview`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PreviewFrame {
    pub room_id: String,
    /// Base64 image, usually as a `data:` URL.
    pub frame: String,
    pub detections: u32,
    pub timestamp: NaiveDateTime,
}

impl PreviewFrame {
    pub fn mime_type(&self) -> Option<&str> {
        frame_mime(&self.frame)
    }

    pub fn decode_image(&self) -> Result<Vec<u8>, base64::DecodeError> {
        decode_frame(&self.frame)
    }
}

/// MIME type named by a `data:` URL header, if any.
pub fn frame_mime(frame: &str) -> Option<&str> {
    let header = frame.strip_prefix("data:")?;
    let (meta, _) = header.split_once(',')?;
    meta.split(';').next().filter(|mime| !mime.is_empty())
}

/// Decodes a base64 frame, with or without a `data:...;base64,` prefix.
pub fn decode_frame(frame: &str) -> Result<Vec<u8>, base64::DecodeError> {
    let payload = match frame.split_once("base64,") {
        Some((_, payload)) => payload,
        None => frame,
    };
    STANDARD.decode(payload.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_decodes_backend_shape() {
        let msg: LiveUpdateMessage = serde_json::from_str(
            r#"{"type":"count_update","room_id":"hall-1","count":12,"raw_count":14,
                "occupancy_percent":4.0,"status":"low","timestamp":"2025-03-01T10:00:00"}"#,
        )
        .unwrap();
        assert_eq!(msg.kind, UpdateKind::CountUpdate);
        assert_eq!(msg.count, Some(12));
        assert!(msg.frame.is_none());
    }

    #[test]
    fn unknown_message_type_is_tolerated() {
        let msg: LiveUpdateMessage =
            serde_json::from_str(r#"{"type":"room_deleted","room_id":"x"}"#).unwrap();
        assert_eq!(msg.kind, UpdateKind::Unknown);
        assert!(msg.count.is_none());
    }

    #[test]
    fn from_room_copies_live_fields() {
        let mut room = Room::new("hall-1", "Hall", 300);
        room.count = 120;
        room.raw_count = 118;
        room.occupancy_percent = 40.0;
        room.status = OccupancyStatus::Medium;
        let msg = LiveUpdateMessage::from_room(&room);
        assert_eq!(msg.room_id, "hall-1");
        assert_eq!(msg.count, Some(120));
        assert_eq!(msg.status, Some(OccupancyStatus::Medium));
    }

    #[test]
    fn from_room_skips_fields_the_backend_left_out() {
        let room: Room = serde_json::from_str(
            r#"{"id":"lab","name":"Lab","capacity":20,"camera_url":"0","raw_count":4}"#,
        )
        .unwrap();
        let msg = LiveUpdateMessage::from_room(&room);
        assert_eq!(msg.count, None);
        assert_eq!(msg.raw_count, Some(4));
        assert_eq!(msg.status, None);
        assert_eq!(msg.timestamp, None);
    }

    #[test]
    fn preview_frame_decodes_data_url() {
        let frame = PreviewFrame {
            room_id: "a".into(),
            frame: "data:image/jpeg;base64,aGVsbG8=".into(),
            detections: 2,
            timestamp: chrono::DateTime::from_timestamp(0, 0).unwrap().naive_utc(),
        };
        assert_eq!(frame.mime_type(), Some("image/jpeg"));
        assert_eq!(frame.decode_image().unwrap(), b"hello");
        assert_eq!(decode_frame("aGVsbG8=").unwrap(), b"hello");
    }
}
