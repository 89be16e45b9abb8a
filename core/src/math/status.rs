use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete occupancy bucket shared by badges, progress bars, and gauges.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OccupancyStatus {
    #[default]
    Empty,
    Low,
    Medium,
    High,
    Full,
}

/// Display colour bound 1:1 to a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusColor {
    Gray,
    Green,
    Yellow,
    Orange,
    Red,
}

pub const LOW_THRESHOLD: f64 = 40.0;
pub const HIGH_THRESHOLD: f64 = 70.0;
pub const FULL_THRESHOLD: f64 = 90.0;

/// Maps an occupancy percentage to its bucket.
///
/// Each boundary belongs to the upper bucket. Negative and NaN inputs are
/// outside the domain and read as empty.
pub fn classify(percent: f64) -> OccupancyStatus {
    if percent.is_nan() || percent <= 0.0 {
        OccupancyStatus::Empty
    } else if percent < LOW_THRESHOLD {
        OccupancyStatus::Low
    } else if percent < HIGH_THRESHOLD {
        OccupancyStatus::Medium
    } else if percent < FULL_THRESHOLD {
        OccupancyStatus::High
    } else {
        OccupancyStatus::Full
    }
}

impl OccupancyStatus {
    pub const ALL: [OccupancyStatus; 5] = [
        OccupancyStatus::Empty,
        OccupancyStatus::Low,
        OccupancyStatus::Medium,
        OccupancyStatus::High,
        OccupancyStatus::Full,
    ];

    pub fn color(self) -> StatusColor {
        match self {
            OccupancyStatus::Empty => StatusColor::Gray,
            OccupancyStatus::Low => StatusColor::Green,
            OccupancyStatus::Medium => StatusColor::Yellow,
            OccupancyStatus::High => StatusColor::Orange,
            OccupancyStatus::Full => StatusColor::Red,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OccupancyStatus::Empty => "empty",
            OccupancyStatus::Low => "low",
            OccupancyStatus::Medium => "medium",
            OccupancyStatus::High => "high",
            OccupancyStatus::Full => "full",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            OccupancyStatus::Empty => "Empty",
            OccupancyStatus::Low => "Low",
            OccupancyStatus::Medium => "Medium",
            OccupancyStatus::High => "High",
            OccupancyStatus::Full => "Full",
        }
    }
}

impl fmt::Display for OccupancyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl StatusColor {
    pub fn rgb(self) -> [u8; 3] {
        match self {
            StatusColor::Gray => [0x6b, 0x72, 0x80],
            StatusColor::Green => [0x22, 0xc5, 0x5e],
            StatusColor::Yellow => [0xea, 0xb3, 0x08],
            StatusColor::Orange => [0xf9, 0x73, 0x16],
            StatusColor::Red => [0xef, 0x44, 0x44],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries_belong_to_upper_bucket() {
        assert_eq!(classify(0.0), OccupancyStatus::Empty);
        assert_eq!(classify(0.001), OccupancyStatus::Low);
        assert_eq!(classify(39.999), OccupancyStatus::Low);
        assert_eq!(classify(40.0), OccupancyStatus::Medium);
        assert_eq!(classify(69.999), OccupancyStatus::Medium);
        assert_eq!(classify(70.0), OccupancyStatus::High);
        assert_eq!(classify(89.999), OccupancyStatus::High);
        assert_eq!(classify(90.0), OccupancyStatus::Full);
    }

    #[test]
    fn overfull_rooms_stay_full() {
        assert_eq!(classify(100.0), OccupancyStatus::Full);
        assert_eq!(classify(250.0), OccupancyStatus::Full);
        assert_eq!(classify(f64::INFINITY), OccupancyStatus::Full);
    }

    #[test]
    fn out_of_domain_reads_empty() {
        assert_eq!(classify(-5.0), OccupancyStatus::Empty);
        assert_eq!(classify(f64::NAN), OccupancyStatus::Empty);
    }

    #[test]
    fn buckets_are_monotonic() {
        let mut previous = classify(0.0);
        let mut step = 0.0;
        while step <= 120.0 {
            let current = classify(step);
            assert!(current >= previous, "regressed at {step}");
            previous = current;
            step += 0.25;
        }
    }

    #[test]
    fn colors_are_distinct() {
        let colors: Vec<_> = OccupancyStatus::ALL.iter().map(|s| s.color().rgb()).collect();
        for (i, a) in colors.iter().enumerate() {
            for b in colors.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
        assert_eq!(OccupancyStatus::Medium.color(), StatusColor::Yellow);
    }

    #[test]
    fn serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&OccupancyStatus::High).unwrap(),
            "\"high\""
        );
    }
}
