/// Occupancy as a percentage of capacity; may exceed 100.
pub fn occupancy_percent(count: u32, capacity: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }
    count as f64 * 100.0 / capacity as f64
}

/// Rounds to one decimal place, the precision the backend reports.
pub fn round_tenth(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Exponential moving average over raw detection counts.
///
/// The first sample seeds the average; later samples blend in with weight
/// `alpha`.
#[derive(Debug, Clone)]
pub struct EmaCounter {
    alpha: f64,
    smoothed: Option<f64>,
    raw: u32,
}

impl EmaCounter {
    pub fn new(alpha: f64) -> Self {
        Self {
            alpha: alpha.clamp(0.0, 1.0),
            smoothed: None,
            raw: 0,
        }
    }

    /// Feeds a raw count and returns the rounded smoothed count.
    pub fn update(&mut self, raw: u32) -> u32 {
        self.raw = raw;
        let next = match self.smoothed {
            None => raw as f64,
            Some(previous) => self.alpha * raw as f64 + (1.0 - self.alpha) * previous,
        };
        self.smoothed = Some(next);
        self.smoothed_count()
    }

    pub fn smoothed_count(&self) -> u32 {
        self.smoothed.map(|value| value.round() as u32).unwrap_or(0)
    }

    pub fn raw_count(&self) -> u32 {
        self.raw
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn reset(&mut self) {
        self.smoothed = None;
        self.raw = 0;
    }
}
