use super::{status_color, BACKGROUND};
use crate::app::Message;
use crowdcore::api_interface::CountRecord;
use crowdcore::math::{classify, OccupancyStatus};
use crowdcore::math::status::{FULL_THRESHOLD, HIGH_THRESHOLD, LOW_THRESHOLD};
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry, Path, Stroke},
    Color, Point, Rectangle, Renderer, Theme,
};

/// One sample of the chart: horizontal position in `[0, 1]` and occupancy
/// percent.
pub type ChartPoint = (f32, f32);

/// Occupancy over the history window, with the status thresholds as
/// guide lines.
#[derive(Debug, Clone)]
pub struct HistoryChart {
    points: Vec<ChartPoint>,
}

impl HistoryChart {
    pub fn new(records: &[CountRecord]) -> Self {
        Self {
            points: chart_points(records),
        }
    }
}

/// Spreads records over `[0, 1]` by timestamp. A single record sits at 0.
pub fn chart_points(records: &[CountRecord]) -> Vec<ChartPoint> {
    let (Some(first), Some(last)) = (records.first(), records.last()) else {
        return Vec::new();
    };
    let span = last
        .timestamp
        .signed_duration_since(first.timestamp)
        .num_milliseconds()
        .max(1) as f32;
    records
        .iter()
        .map(|record| {
            let offset = record
                .timestamp
                .signed_duration_since(first.timestamp)
                .num_milliseconds() as f32;
            ((offset / span).clamp(0.0, 1.0), record.occupancy as f32)
        })
        .collect()
}

impl canvas::Program<Message> for HistoryChart {
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
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), BACKGROUND);

        let ceiling = self
            .points
            .iter()
            .map(|(_, percent)| *percent)
            .fold(100.0, f32::max);
        let y_for = |percent: f32| bounds.height - (percent / ceiling) * bounds.height;

        for threshold in [LOW_THRESHOLD, HIGH_THRESHOLD, FULL_THRESHOLD] {
            let y = y_for(threshold as f32);
            let guide = Path::line(Point::new(0.0, y), Point::new(bounds.width, y));
            let color = status_color(classify(threshold).color());
            frame.stroke(
                &guide,
                Stroke::default()
                    .with_width(1.0)
                    .with_color(Color { a: 0.35, ..color }),
            );
        }

        if self.points.len() > 1 {
            let path = Path::new(|builder| {
                for (i, (x, percent)) in self.points.iter().enumerate() {
                    let point = Point::new(x * bounds.width, y_for(*percent));
                    if i == 0 {
                        builder.move_to(point);
                    } else {
                        builder.line_to(point);
                    }
                }
            });
            frame.stroke(
                &path,
                Stroke::default()
                    .with_width(2.5)
                    .with_color(Color::from_rgb(0.18, 0.72, 0.89)),
            );
        } else if let Some((_, percent)) = self.points.first() {
            let dot = Path::new(|builder| builder.circle(Point::new(6.0, y_for(*percent)), 3.5));
            frame.fill(&dot, status_color(OccupancyStatus::Low.color()));
        }

        vec![frame.into_geometry()]
    }
}
