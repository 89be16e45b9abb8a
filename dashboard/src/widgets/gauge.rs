use super::TRACK_COLOR;
use crate::app::Message;
use crowdcore::math::GaugeGeometry;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, LineCap, Path, Stroke},
    Color, Point, Rectangle, Renderer, Theme,
};
use std::f32::consts::FRAC_PI_2;

/// Stroke width relative to the outer radius, 12 on an 80 px ring.
const STROKE_RATIO: f32 = 12.0 / 80.0;
/// Arc resolution in radians per segment.
const SEGMENT: f32 = 0.04;

/// Circular occupancy ring filled clockwise from twelve o'clock.
#[derive(Debug, Clone)]
pub struct Gauge {
    percent: f32,
    color: Color,
}

impl Gauge {
    pub fn new(percent: f64, color: Color) -> Self {
        Self {
            percent: percent as f32,
            color,
        }
    }
}

/// Points along the filled arc of `geometry` around `center`.
pub fn arc_points(geometry: &GaugeGeometry, center: Point, percent: f32) -> Vec<Point> {
    let sweep = geometry.filled_sweep(percent);
    if sweep <= 0.0 {
        return Vec::new();
    }
    let radius = geometry.radius();
    let segments = (sweep / SEGMENT).ceil().max(1.0) as usize;
    (0..=segments)
        .map(|i| {
            let angle = -FRAC_PI_2 + sweep * (i as f32 / segments as f32);
            Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin())
        })
        .collect()
}

impl canvas::Program<Message> for Gauge {
    type State = ();

    fn draw(
        &self,
        _state: &Self::State,
        renderer: &Renderer,
        _theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let mut frame = Frame::new(renderer, bounds.size());
        let center = Point::new(bounds.width / 2.0, bounds.height / 2.0);
        let outer = bounds.width.min(bounds.height) / 2.0;
        let geometry = GaugeGeometry::new(outer, outer * STROKE_RATIO);

        let track = Path::new(|builder| builder.circle(center, geometry.radius()));
        frame.stroke(
            &track,
            Stroke::default()
                .with_width(geometry.stroke_width)
                .with_color(TRACK_COLOR),
        );

        let points = arc_points(&geometry, center, self.percent);
        if points.len() > 1 {
            let arc = Path::new(|builder| {
                for (i, point) in points.iter().enumerate() {
                    if i == 0 {
                        builder.move_to(*point);
                    } else {
                        builder.line_to(*point);
                    }
                }
            });
            frame.stroke(
                &arc,
                Stroke::default()
                    .with_width(geometry.stroke_width)
                    .with_color(self.color)
                    .with_line_cap(LineCap::Round),
            );
        }

        vec![frame.into_geometry()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_gauge_draws_no_arc() {
        let geometry = GaugeGeometry::new(80.0, 12.0);
        assert!(arc_points(&geometry, Point::ORIGIN, 0.0).is_empty());
    }

    #[test]
    fn arc_starts_at_top_and_half_ends_at_bottom() {
        let geometry = GaugeGeometry::new(80.0, 12.0);
        let center = Point::new(80.0, 80.0);
        let points = arc_points(&geometry, center, 50.0);
        let first = points[0];
        let last = points[points.len() - 1];
        assert!((first.x - 80.0).abs() < 1e-3 && (first.y - 6.0).abs() < 1e-3);
        assert!((last.x - 80.0).abs() < 1e-2 && (last.y - 154.0).abs() < 1e-2);
    }

    #[test]
    fn overfull_gauge_closes_the_ring_once() {
        let geometry = GaugeGeometry::new(80.0, 12.0);
        let full = arc_points(&geometry, Point::ORIGIN, 100.0);
        let over = arc_points(&geometry, Point::ORIGIN, 150.0);
        assert_eq!(full, over);
    }
}
