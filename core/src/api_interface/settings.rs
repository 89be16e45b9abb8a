use serde::{Deserialize, Serialize};

/// Image sizes the detector accepts.
pub const SUPPORTED_IMGSZ: [u32; 3] = [480, 640, 1280];

/// Detection parameters, read and written through `/api/settings`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionSettings {
    pub model: String,
    pub confidence_threshold: f64,
    /// Seconds between detections on each camera.
    pub detection_interval: u32,
    pub smoothing_alpha: f64,
    pub imgsz: u32,
}

impl Default for DetectionSettings {
    fn default() -> Self {
        Self {
            model: "yolo26m.pt".into(),
            confidence_threshold: 0.20,
            detection_interval: 15,
            smoothing_alpha: 0.3,
            imgsz: 1280,
        }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("model must not be empty")]
    EmptyModel,
    #[error("confidence_threshold must be in (0, 1), got {0}")]
    Confidence(f64),
    #[error("detection_interval must be at least 1 second, got {0}")]
    Interval(u32),
    #[error("smoothing_alpha must be in (0, 1], got {0}")]
    Smoothing(f64),
    #[error("imgsz must be one of 480, 640, 1280, got {0}")]
    ImageSize(u32),
}

impl DetectionSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.model.trim().is_empty() {
            return Err(SettingsError::EmptyModel);
        }
        if !(self.confidence_threshold > 0.0 && self.confidence_threshold < 1.0) {
            return Err(SettingsError::Confidence(self.confidence_threshold));
        }
        if self.detection_interval < 1 {
            return Err(SettingsError::Interval(self.detection_interval));
        }
        if !(self.smoothing_alpha > 0.0 && self.smoothing_alpha <= 1.0) {
            return Err(SettingsError::Smoothing(self.smoothing_alpha));
        }
        if !SUPPORTED_IMGSZ.contains(&self.imgsz) {
            return Err(SettingsError::ImageSize(self.imgsz));
        }
        Ok(())
    }

    /// Returns the settings with `update` applied, validated as a whole.
    pub fn merged(&self, update: &SettingsUpdate) -> Result<Self, SettingsError> {
        let mut next = self.clone();
        if let Some(model) = &update.model {
            next.model = model.clone();
        }
        if let Some(confidence) = update.confidence_threshold {
            next.confidence_threshold = confidence;
        }
        if let Some(interval) = update.detection_interval {
            next.detection_interval = interval;
        }
        if let Some(alpha) = update.smoothing_alpha {
            next.smoothing_alpha = alpha;
        }
        if let Some(imgsz) = update.imgsz {
            next.imgsz = imgsz;
        }
        next.validate()?;
        Ok(next)
    }

    /// The partial update that turns `self` into `target`.
    pub fn diff(&self, target: &DetectionSettings) -> SettingsUpdate {
        SettingsUpdate {
            model: (self.model != target.model).then(|| target.model.clone()),
            confidence_threshold: (self.confidence_threshold != target.confidence_threshold)
                .then_some(target.confidence_threshold),
            detection_interval: (self.detection_interval != target.detection_interval)
                .then_some(target.detection_interval),
            smoothing_alpha: (self.smoothing_alpha != target.smoothing_alpha)
                .then_some(target.smoothing_alpha),
            imgsz: (self.imgsz != target.imgsz).then_some(target.imgsz),
        }
    }
}

/// Partial body of `PUT /api/settings`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SettingsUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence_threshold: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detection_interval: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smoothing_alpha: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imgsz: Option<u32>,
}

impl SettingsUpdate {
    pub fn is_empty(&self) -> bool {
        *self == SettingsUpdate::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModelKind {
    Person,
    Head,
}

/// Entry of `GET /api/models`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: ModelKind,
}

/// Response of `GET /api/status`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    pub device: String,
    pub model: String,
    pub model_loaded: bool,
    pub cameras_connected: u32,
    pub cameras_total: u32,
    pub uptime_seconds: f64,
    pub avg_inference_ms: f64,
}
