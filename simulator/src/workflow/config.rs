use anyhow::Context;
use crowdcore::api_interface::{DetectionSettings, RoomCreate};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

/// A room the simulator starts with.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomSeed {
    pub id: String,
    pub name: String,
    pub capacity: u32,
    #[serde(default)]
    pub camera_url: String,
    /// Fraction of capacity the random walk drifts around.
    #[serde(default = "default_baseline")]
    pub baseline: f64,
}

fn default_baseline() -> f64 {
    0.4
}

impl RoomSeed {
    pub fn new(id: &str, name: &str, capacity: u32, baseline: f64) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
            camera_url: format!("rtsp://sim/{}", id),
            baseline,
        }
    }

    pub fn to_create(&self) -> RoomCreate {
        RoomCreate {
            id: self.id.clone(),
            name: self.name.clone(),
            capacity: self.capacity,
            camera_url: self.camera_url.clone(),
            is_active: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub port: u16,
    pub seed: u64,
    /// Milliseconds between synthetic detections.
    pub tick_ms: u64,
    pub frame_width: u32,
    pub frame_height: u32,
    pub settings: DetectionSettings,
    pub rooms: Vec<RoomSeed>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            seed: 7,
            tick_ms: 2_000,
            frame_width: 160,
            frame_height: 90,
            settings: DetectionSettings::default(),
            rooms: vec![
                RoomSeed::new("hall-1", "Main Hall", 300, 0.4),
                RoomSeed::new("lab-2", "Robotics Lab", 24, 0.75),
                RoomSeed::new("cafe", "Cafeteria", 120, 0.55),
                RoomSeed::new("library", "Library", 80, 0.2),
            ],
        }
    }
}

impl SimConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading simulator config {}", path_ref.display()))?;
        let config: SimConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing simulator config {}", path_ref.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_args(port: Option<u16>, seed: Option<u64>) -> Self {
        Self::default().with_overrides(port, seed)
    }

    pub fn with_overrides(mut self, port: Option<u16>, seed: Option<u64>) -> Self {
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(seed) = seed {
            self.seed = seed;
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        self.settings
            .validate()
            .context("invalid detection settings in simulator config")?;
        anyhow::ensure!(self.tick_ms > 0, "tick_ms must be positive");
        anyhow::ensure!(
            self.frame_width > 0 && self.frame_height > 0,
            "frame size must be positive"
        );
        for room in &self.rooms {
            room.to_create()
                .validate()
                .map_err(anyhow::Error::msg)
                .with_context(|| format!("invalid seeded room {}", room.id))?;
        }
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
