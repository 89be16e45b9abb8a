use std::f32::consts::PI;

/// Geometry of a circular progress ring drawn with a dashed stroke.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeGeometry {
    pub outer_radius: f32,
    pub stroke_width: f32,
}

impl GaugeGeometry {
    pub fn new(outer_radius: f32, stroke_width: f32) -> Self {
        Self {
            outer_radius,
            stroke_width,
        }
    }

    /// Radius of the stroke's centre line.
    pub fn radius(&self) -> f32 {
        self.outer_radius - self.stroke_width / 2.0
    }

    pub fn circumference(&self) -> f32 {
        2.0 * PI * self.radius()
    }

    /// Unfilled arc length for `percent`. Not clamped: above 100 the offset
    /// goes negative.
    pub fn dash_offset(&self, percent: f32) -> f32 {
        let circumference = self.circumference();
        circumference - (percent / 100.0) * circumference
    }

    /// Offset used for drawing; the ring never over-fills or runs backwards.
    pub fn render_offset(&self, percent: f32) -> f32 {
        self.dash_offset(clamp_percent(percent))
    }

    /// Filled arc length for drawing.
    pub fn filled_length(&self, percent: f32) -> f32 {
        self.circumference() - self.render_offset(percent)
    }

    /// Angle swept by the filled arc, in radians.
    pub fn filled_sweep(&self, percent: f32) -> f32 {
        let radius = self.radius();
        if radius <= 0.0 {
            return 0.0;
        }
        self.filled_length(percent) / radius
    }
}

fn clamp_percent(percent: f32) -> f32 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}
