use super::TRACK_COLOR;
use crate::app::Message;
use iced::{
    mouse,
    widget::canvas::{self, Frame, Geometry},
    Color, Point, Rectangle, Renderer, Size, Theme,
};

/// Horizontal occupancy bar; `fraction` is already clamped to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct OccupancyBar {
    fraction: f32,
    color: Color,
}

impl OccupancyBar {
    pub fn new(fraction: f32, color: Color) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
            color,
        }
    }
}

impl canvas::Program<Message> for OccupancyBar {
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
        frame.fill_rectangle(Point::ORIGIN, bounds.size(), TRACK_COLOR);
        if self.fraction > 0.0 {
            frame.fill_rectangle(
                Point::ORIGIN,
                Size::new(bounds.width * self.fraction, bounds.height),
                self.color,
            );
        }
        vec![frame.into_geometry()]
    }
}
