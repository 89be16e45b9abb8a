pub mod bar;
pub mod cards;
pub mod gauge;
pub mod history;

use crowdcore::math::StatusColor;
use iced::Color;

pub fn status_color(color: StatusColor) -> Color {
    let [r, g, b] = color.rgb();
    Color::from_rgb8(r, g, b)
}

pub const TRACK_COLOR: Color = Color {
    r: 0.16,
    g: 0.17,
    b: 0.2,
    a: 1.0,
};
pub const BACKGROUND: Color = Color {
    r: 0.05,
    g: 0.05,
    b: 0.06,
    a: 1.0,
};
