use super::{bar::OccupancyBar, status_color};
use crate::app::{Message, Page};
use chrono::NaiveDateTime;
use crowdcore::view::RoomCard;
use iced::{
    widget::{button, column, row, text, Canvas},
    Element, Length,
};

pub const CARD_WIDTH: f32 = 260.0;
pub const CARDS_PER_ROW: usize = 3;

/// One clickable tile of the room grid.
pub fn room_card<'a>(card: &RoomCard, now: NaiveDateTime) -> Element<'a, Message> {
    let color = status_color(card.color);
    let activity = if card.is_active { "" } else { " (inactive)" };

    let content = column![
        text(format!("{}{}", card.name, activity)).size(18),
        row![
            text(card.count_label()).size(14),
            text(card.occupancy_label()).size(22).color(color),
        ]
        .spacing(16),
        Canvas::new(OccupancyBar::new(card.progress(), color))
            .width(Length::Fill)
            .height(Length::Fixed(8.0)),
        row![
            text(card.status.label()).size(12).color(color),
            text(card.updated_label(now)).size(12),
        ]
        .spacing(12),
    ]
    .spacing(8)
    .padding(6);

    button(content)
        .on_press(Message::Navigate(Page::Room(card.id.clone())))
        .width(Length::Fixed(CARD_WIDTH))
        .padding(10)
        .into()
}
