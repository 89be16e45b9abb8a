use crate::api_interface::{LiveUpdateMessage, Room, UpdateKind};
use std::collections::HashMap;
use std::sync::Arc;

/// Collection of rooms held by a view. Entries are shared so that an
/// untouched room stays pointer-identical across merges.
pub type RoomCollection = Vec<Arc<Room>>;

/// How an incoming room list relates to the held collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SnapshotKind {
    /// The incoming list is the whole collection: it decides membership and
    /// order.
    Full,
    /// The incoming list only touches the rooms it names.
    Partial,
}

/// Merges one live update into the collection.
///
/// Only `count_update` messages for a known room have any effect; the
/// matched room takes the message's fields where present and keeps its own
/// otherwise. Every other entry is returned as the same `Arc`.
pub fn apply_update(rooms: RoomCollection, message: &LiveUpdateMessage) -> RoomCollection {
    if message.kind != UpdateKind::CountUpdate {
        return rooms;
    }
    rooms
        .into_iter()
        .map(|room| {
            if room.id != message.room_id {
                return room;
            }
            let merged = merge_live_fields(&room, message);
            if merged == *room {
                room
            } else {
                Arc::new(merged)
            }
        })
        .collect()
}

/// Applies a batch of updates in order.
pub fn apply_all<'a, I>(rooms: RoomCollection, messages: I) -> RoomCollection
where
    I: IntoIterator<Item = &'a LiveUpdateMessage>,
{
    messages.into_iter().fold(rooms, apply_update)
}

fn merge_live_fields(room: &Room, message: &LiveUpdateMessage) -> Room {
    let mut merged = room.clone();
    if let Some(count) = message.count {
        merged.count = count;
    }
    if let Some(raw_count) = message.raw_count {
        merged.raw_count = raw_count;
    }
    if let Some(percent) = message.occupancy_percent {
        merged.occupancy_percent = percent;
    }
    if let Some(status) = message.status {
        merged.status = status;
    }
    if let Some(timestamp) = message.timestamp {
        merged.last_updated = Some(timestamp);
    }
    merged
}

/// Folds a full room listing into the collection.
///
/// The listing decides membership and order. Known rooms only take its
/// static fields (name, capacity, camera, active flag); their live fields
/// are left for `apply_update`. Unknown rooms are taken as listed.
pub fn merge_roster(rooms: RoomCollection, roster: &[Room]) -> RoomCollection {
    let incoming: Vec<Room> = {
        let known: HashMap<&str, &Arc<Room>> =
            rooms.iter().map(|room| (room.id.as_str(), room)).collect();
        roster
            .iter()
            .map(|listed| match known.get(listed.id.as_str()) {
                Some(current) => with_static_fields(current, listed),
                None => listed.clone(),
            })
            .collect()
    };
    merge_snapshot(rooms, incoming, SnapshotKind::Full)
}

fn with_static_fields(current: &Room, listed: &Room) -> Room {
    let mut merged = current.clone();
    merged.name = listed.name.clone();
    merged.capacity = listed.capacity;
    merged.camera_url = listed.camera_url.clone();
    merged.is_active = listed.is_active;
    merged.created_at = listed.created_at.or(current.created_at);
    merged
}

/// Merges a room list into the collection by id.
///
/// Rooms whose content did not change keep their existing `Arc`.
pub fn merge_snapshot(rooms: RoomCollection, incoming: Vec<Room>, kind: SnapshotKind) -> RoomCollection {
    let mut existing: HashMap<String, Arc<Room>> = HashMap::with_capacity(rooms.len());
    let mut order: Vec<String> = Vec::with_capacity(rooms.len());
    for room in rooms {
        order.push(room.id.clone());
        existing.insert(room.id.clone(), room);
    }

    let reuse = |existing: &mut HashMap<String, Arc<Room>>, room: Room| -> Arc<Room> {
        match existing.remove(&room.id) {
            Some(current) if *current == room => current,
            _ => Arc::new(room),
        }
    };

    match kind {
        SnapshotKind::Full => incoming
            .into_iter()
            .map(|room| reuse(&mut existing, room))
            .collect(),
        SnapshotKind::Partial => {
            let mut updated: HashMap<String, Arc<Room>> = HashMap::with_capacity(incoming.len());
            let mut appended: Vec<String> = Vec::new();
            for room in incoming {
                let id = room.id.clone();
                if !existing.contains_key(&id) && !updated.contains_key(&id) {
                    appended.push(id.clone());
                }
                let merged = reuse(&mut existing, room);
                updated.insert(id, merged);
            }
            order
                .into_iter()
                .chain(appended)
                .filter_map(|id| updated.remove(&id).or_else(|| existing.remove(&id)))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::status::OccupancyStatus;
    use chrono::NaiveDate;

    fn collection() -> RoomCollection {
        vec![
            Arc::new(Room::new("hall-1", "Main Hall", 300)),
            Arc::new(Room::new("lab", "Lab", 20)),
            Arc::new(Room::new("cafe", "Cafe", 80)),
        ]
    }

    fn update_for(room_id: &str) -> LiveUpdateMessage {
        LiveUpdateMessage {
            count: Some(12),
            raw_count: Some(13),
            occupancy_percent: Some(60.0),
            status: Some(OccupancyStatus::Medium),
            timestamp: NaiveDate::from_ymd_opt(2025, 3, 1)
                .and_then(|day| day.and_hms_opt(10, 0, 0)),
            ..LiveUpdateMessage::count_update(room_id)
        }
    }

    #[test]
    fn update_touches_only_the_matching_room() {
        let before = collection();
        let after = apply_update(before.clone(), &update_for("lab"));

        assert_eq!(after.len(), 3);
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert!(Arc::ptr_eq(&before[2], &after[2]));
        assert_eq!(*before[0], *after[0]);
        assert_eq!(*before[2], *after[2]);

        assert_eq!(after[1].count, 12);
        assert_eq!(after[1].raw_count, 13);
        assert_eq!(after[1].occupancy_percent, 60.0);
        assert_eq!(after[1].status, OccupancyStatus::Medium);
        assert!(after[1].last_updated.is_some());
        assert_eq!(after[1].name, "Lab");
    }

    #[test]
    fn unknown_room_is_a_no_op() {
        let before = collection();
        let after = apply_update(before.clone(), &update_for("deleted-room"));
        assert_eq!(before, after);
        assert!(before.iter().zip(&after).all(|(a, b)| Arc::ptr_eq(a, b)));
    }

    #[test]
    fn partial_message_keeps_known_fields() {
        let rooms = apply_update(collection(), &update_for("cafe"));
        let partial = LiveUpdateMessage {
            count: Some(20),
            ..LiveUpdateMessage::count_update("cafe")
        };
        let rooms = apply_update(rooms, &partial);
        assert_eq!(rooms[2].count, 20);
        assert_eq!(rooms[2].raw_count, 13);
        assert_eq!(rooms[2].status, OccupancyStatus::Medium);
        assert!(rooms[2].last_updated.is_some());
    }

    #[test]
    fn other_message_kinds_are_ignored() {
        let before = collection();
        let mut message = update_for("lab");
        message.kind = UpdateKind::Unknown;
        let after = apply_update(before.clone(), &message);
        assert!(Arc::ptr_eq(&before[1], &after[1]));
    }

    #[test]
    fn identical_update_keeps_the_same_entry() {
        let rooms = apply_update(collection(), &update_for("lab"));
        let again = apply_update(rooms.clone(), &update_for("lab"));
        assert!(Arc::ptr_eq(&rooms[1], &again[1]));
    }

    #[test]
    fn apply_all_folds_in_order() {
        let later = LiveUpdateMessage {
            count: Some(99),
            ..LiveUpdateMessage::count_update("lab")
        };
        let rooms = apply_all(collection(), [&update_for("lab"), &later]);
        assert_eq!(rooms[1].count, 99);
        assert_eq!(rooms[1].raw_count, 13);
    }

    #[test]
    fn full_snapshot_defines_membership_and_order() {
        let before = collection();
        let mut cafe = Room::new("cafe", "Cafe", 80);
        cafe.count = 4;
        let incoming = vec![
            cafe,
            Room::new("hall-1", "Main Hall", 300),
            Room::new("annex", "Annex", 40),
        ];
        let after = merge_snapshot(before.clone(), incoming, SnapshotKind::Full);

        let ids: Vec<&str> = after.iter().map(|room| room.id.as_str()).collect();
        assert_eq!(ids, vec!["cafe", "hall-1", "annex"]);
        assert!(Arc::ptr_eq(&before[0], &after[1]));
        assert!(!Arc::ptr_eq(&before[2], &after[0]));
        assert_eq!(after[0].count, 4);
    }

    #[test]
    fn roster_refreshes_static_fields_only() {
        let before = apply_update(collection(), &update_for("lab"));
        let renamed: Room = serde_json::from_str(
            r#"{"id":"lab","name":"Robotics Lab","capacity":25,"camera_url":"1"}"#,
        )
        .unwrap();
        let roster = vec![
            Room::new("hall-1", "Main Hall", 300),
            renamed,
            Room::new("annex", "Annex", 40),
        ];
        let after = merge_roster(before.clone(), &roster);

        let ids: Vec<&str> = after.iter().map(|room| room.id.as_str()).collect();
        assert_eq!(ids, vec!["hall-1", "lab", "annex"]);
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert_eq!(after[1].name, "Robotics Lab");
        assert_eq!(after[1].capacity, 25);
        assert_eq!(after[1].count, 12);
        assert_eq!(after[1].status, OccupancyStatus::Medium);
        assert!(after[1].last_updated.is_some());
    }

    #[test]
    fn partial_snapshot_preserves_unrelated_rooms() {
        let before = collection();
        let mut lab = Room::new("lab", "Lab", 20);
        lab.count = 7;
        let incoming = vec![lab, Room::new("annex", "Annex", 40)];
        let after = merge_snapshot(before.clone(), incoming, SnapshotKind::Partial);

        let ids: Vec<&str> = after.iter().map(|room| room.id.as_str()).collect();
        assert_eq!(ids, vec!["hall-1", "lab", "cafe", "annex"]);
        assert!(Arc::ptr_eq(&before[0], &after[0]));
        assert!(Arc::ptr_eq(&before[2], &after[2]));
        assert_eq!(after[1].count, 7);
    }
}
