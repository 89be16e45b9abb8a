use rand::{rngs::StdRng, Rng, SeedableRng};

/// Bounded random walk producing raw people counts for one room.
///
/// The level is a fraction of capacity that drifts around `baseline`, with
/// per-sample detector noise on top. Levels up to 1.2 are allowed so rooms
/// can run over capacity now and then.
#[derive(Debug, Clone)]
pub struct OccupancyWalk {
    rng: StdRng,
    baseline: f64,
    level: f64,
    volatility: f64,
    noise: f64,
}

impl OccupancyWalk {
    pub fn new(seed: u64, baseline: f64) -> Self {
        let baseline = baseline.clamp(0.0, 1.2);
        Self {
            rng: StdRng::seed_from_u64(seed),
            baseline,
            level: baseline,
            volatility: 0.05,
            noise: 0.03,
        }
    }

    /// Advances the walk and returns the next raw count for `capacity`.
    pub fn next_raw(&mut self, capacity: u32) -> u32 {
        let step = self.rng.gen_range(-self.volatility..self.volatility);
        let pull = (self.baseline - self.level) * 0.1;
        self.level = (self.level + step + pull).clamp(0.0, 1.2);

        let jitter = self.rng.gen_range(-self.noise..self.noise);
        let raw = (self.level + jitter).max(0.0) * capacity as f64;
        raw.round() as u32
    }

    /// Milliseconds a detection pass would have taken.
    pub fn inference_ms(&mut self) -> f64 {
        self.rng.gen_range(18.0..42.0)
    }

    pub fn frame_seed(&mut self) -> u64 {
        self.rng.gen()
    }
}

/// Stable per-room seed so reruns with the same base seed replay the same
/// counts.
pub fn room_seed(base: u64, room_id: &str) -> u64 {
    room_id
        .bytes()
        .fold(base ^ 0x9e37_79b9_7f4a_7c15, |acc, byte| {
            acc.rotate_left(5) ^ byte as u64
        })
}
