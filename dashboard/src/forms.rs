use crowdcore::api_interface::{DetectionSettings, Room, RoomCreate, RoomUpdate, SettingsUpdate};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoomField {
    Id,
    Name,
    Capacity,
    CameraUrl,
}

/// Text-backed form for creating or editing a room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomForm {
    pub id: String,
    pub name: String,
    pub capacity: String,
    pub camera_url: String,
    pub is_active: bool,
}

impl RoomForm {
    pub fn new() -> Self {
        Self {
            is_active: true,
            ..Default::default()
        }
    }

    pub fn from_room(room: &Room) -> Self {
        Self {
            id: room.id.clone(),
            name: room.name.clone(),
            capacity: room.capacity.to_string(),
            camera_url: room.camera_url.clone(),
            is_active: room.is_active,
        }
    }

    pub fn update_field(&mut self, field: RoomField, value: String) {
        match field {
            RoomField::Id => self.id = value,
            RoomField::Name => self.name = value,
            RoomField::Capacity => self.capacity = value,
            RoomField::CameraUrl => self.camera_url = value,
        }
    }

    fn parse_capacity(&self) -> Result<u32, String> {
        match self.capacity.trim().parse::<u32>() {
            Ok(capacity) if capacity > 0 => Ok(capacity),
            _ => Err(format!("capacity must be a positive whole number, got '{}'", self.capacity)),
        }
    }

    pub fn to_create(&self) -> Result<RoomCreate, String> {
        let create = RoomCreate {
            id: self.id.trim().to_string(),
            name: self.name.trim().to_string(),
            capacity: self.parse_capacity()?,
            camera_url: self.camera_url.trim().to_string(),
            is_active: self.is_active,
        };
        create.validate()?;
        Ok(create)
    }

    /// Only the fields that differ from `current`.
    pub fn to_update(&self, current: &Room) -> Result<RoomUpdate, String> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err("room name must not be empty".into());
        }
        let capacity = self.parse_capacity()?;
        let camera_url = self.camera_url.trim();
        Ok(RoomUpdate {
            name: (name != current.name).then(|| name.to_string()),
            capacity: (capacity != current.capacity).then_some(capacity),
            camera_url: (camera_url != current.camera_url).then(|| camera_url.to_string()),
            is_active: (self.is_active != current.is_active).then_some(self.is_active),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingsField {
    Model,
    Confidence,
    Interval,
    Smoothing,
    ImageSize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SettingsForm {
    pub model: String,
    pub confidence_threshold: String,
    pub detection_interval: String,
    pub smoothing_alpha: String,
    pub imgsz: String,
}

impl SettingsForm {
    pub fn from_settings(settings: &DetectionSettings) -> Self {
        Self {
            model: settings.model.clone(),
            confidence_threshold: settings.confidence_threshold.to_string(),
            detection_interval: settings.detection_interval.to_string(),
            smoothing_alpha: settings.smoothing_alpha.to_string(),
            imgsz: settings.imgsz.to_string(),
        }
    }

    pub fn update_field(&mut self, field: SettingsField, value: String) {
        match field {
            SettingsField::Model => self.model = value,
            SettingsField::Confidence => self.confidence_threshold = value,
            SettingsField::Interval => self.detection_interval = value,
            SettingsField::Smoothing => self.smoothing_alpha = value,
            SettingsField::ImageSize => self.imgsz = value,
        }
    }

    /// Parses the form, validates it, and returns the minimal update
    /// against the settings last read from the backend.
    pub fn to_update(&self, current: &DetectionSettings) -> Result<SettingsUpdate, String> {
        let target = DetectionSettings {
            model: self.model.trim().to_string(),
            confidence_threshold: parse_field("confidence threshold", &self.confidence_threshold)?,
            detection_interval: parse_field("detection interval", &self.detection_interval)?,
            smoothing_alpha: parse_field("smoothing alpha", &self.smoothing_alpha)?,
            imgsz: parse_field("image size", &self.imgsz)?,
        };
        target.validate().map_err(|err| err.to_string())?;
        Ok(current.diff(&target))
    }
}

fn parse_field<T: std::str::FromStr>(label: &str, value: &str) -> Result<T, String> {
    value
        .trim()
        .parse()
        .map_err(|_| format!("{} is not a valid number: '{}'", label, value))
}
