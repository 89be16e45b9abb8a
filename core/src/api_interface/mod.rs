pub mod room;
pub mod settings;
pub mod update;

pub use room::{CountRecord, CurrentCount, ReportedFields, Room, RoomCreate, RoomUpdate};
pub use settings::{
    DetectionSettings, ModelInfo, ModelKind, SettingsError, SettingsUpdate, SystemStatus,
    SUPPORTED_IMGSZ,
};
pub use update::{decode_frame, frame_mime, LiveUpdateMessage, PreviewFrame, UpdateKind};
