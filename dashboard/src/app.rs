use crate::config::DashboardConfig;
use crate::forms::{RoomField, RoomForm, SettingsField, SettingsForm};
use crate::widgets::cards::{room_card, CARDS_PER_ROW};
use crate::widgets::gauge::Gauge;
use crate::widgets::history::HistoryChart;
use crate::widgets::status_color;
use chrono::{NaiveDateTime, Utc};
use crowdcore::api_interface::{
    decode_frame, frame_mime, CountRecord, DetectionSettings, ModelInfo, Room, SystemStatus,
};
use crowdcore::math::StatusColor;
use crowdcore::sync::{
    run_cycle, ApiClient, CommitOutcome, CycleBatch, CycleTicket, PollTracker, Subscription,
};
use crowdcore::view::{DashboardSummary, LiveView, RoomCard};
use crowdcore::RequestResult;
use iced::{
    widget::{button, column, row, scrollable, text, text_input, Canvas, Column, Container, Row},
    Alignment, Element, Length, Task,
};
use log::{info, warn};
use std::time::Duration;

const ACTIVITY_LIMIT: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Page {
    Grid,
    Room(String),
    Settings,
}

#[derive(Debug, Clone)]
pub enum Message {
    Tick,
    CycleFinished(CycleTicket, RequestResult<CycleBatch>),
    Navigate(Page),
    HistoryLoaded(String, RequestResult<Vec<CountRecord>>),
    RoomField(RoomField, String),
    ToggleActive,
    SubmitRoom,
    RoomSaved(RequestResult<Room>),
    EditRoom(String),
    CancelEdit,
    DeleteRoom(String),
    RoomDeleted(String, RequestResult<()>),
    SettingsLoaded(RequestResult<DetectionSettings>),
    ModelsLoaded(RequestResult<Vec<ModelInfo>>),
    StatusLoaded(RequestResult<SystemStatus>),
    SettingsField(SettingsField, String),
    SubmitSettings,
    SettingsSaved(RequestResult<DetectionSettings>),
}

/// Presentation state. Everything shown under the room grid and the room
/// page comes from `live`, which only changes when a poll cycle commits.
pub struct Dashboard {
    client: ApiClient,
    config: DashboardConfig,
    page: Page,
    tracker: PollTracker,
    live: LiveView,
    history: Vec<CountRecord>,
    history_error: Option<String>,
    room_form: RoomForm,
    editing: Option<String>,
    form_error: Option<String>,
    settings: Option<DetectionSettings>,
    settings_form: SettingsForm,
    settings_error: Option<String>,
    models: Vec<ModelInfo>,
    system: Option<SystemStatus>,
    activity: Vec<String>,
}

fn now() -> NaiveDateTime {
    Utc::now().naive_utc()
}

/// Size and type of the preview still, as shown under the gauge.
pub fn describe_frame(frame: &str) -> String {
    match decode_frame(frame) {
        Ok(bytes) => format!(
            "Preview frame: {} bytes ({})",
            bytes.len(),
            frame_mime(frame).unwrap_or("unknown type")
        ),
        Err(err) => format!("Preview frame could not be decoded: {}", err),
    }
}

fn grid_header(summary: &DashboardSummary) -> String {
    format!(
        "{} rooms ({} active) | {} / {} people | {:.1}% {}",
        summary.room_count,
        summary.active_rooms,
        summary.total_count,
        summary.total_capacity,
        summary.occupancy_percent,
        summary.status.label()
    )
}

impl Dashboard {
    pub fn boot(client: ApiClient, config: DashboardConfig) -> (Self, Task<Message>) {
        let tracker = PollTracker::new(Subscription::dashboard().with_cadence(config.cadence()));
        let mut dashboard = Dashboard {
            client,
            config,
            page: Page::Grid,
            tracker,
            live: LiveView::new(),
            history: Vec::new(),
            history_error: None,
            room_form: RoomForm::new(),
            editing: None,
            form_error: None,
            settings: None,
            settings_form: SettingsForm::default(),
            settings_error: None,
            models: Vec::new(),
            system: None,
            activity: Vec::new(),
        };
        let first = dashboard.poll_now();
        (dashboard, first)
    }

    pub fn cadence(&self) -> Duration {
        self.config.cadence()
    }

    pub fn title(&self) -> String {
        match &self.page {
            Page::Grid => "CrowdCount: Rooms".into(),
            Page::Room(id) => match self.live.room(id) {
                Some(room) => format!("CrowdCount: {}", room.name),
                None => format!("CrowdCount: {}", id),
            },
            Page::Settings => "CrowdCount: Settings".into(),
        }
    }

    pub fn update(state: &mut Self, message: Message) -> Task<Message> {
        match message {
            Message::Tick => state.on_tick(),
            Message::CycleFinished(ticket, outcome) => {
                match state.tracker.commit(ticket, outcome) {
                    CommitOutcome::Applied | CommitOutcome::Failed => {
                        state.live.absorb(state.tracker.state());
                    }
                    CommitOutcome::Stale | CommitOutcome::Cancelled => {}
                }
                Task::none()
            }
            Message::Navigate(page) => state.navigate(page),
            Message::HistoryLoaded(room_id, result) => {
                if state.page == Page::Room(room_id) {
                    match result {
                        Ok(records) => {
                            state.history = records;
                            state.history_error = None;
                        }
                        Err(err) => state.history_error = Some(err.to_string()),
                    }
                }
                Task::none()
            }
            Message::RoomField(field, value) => {
                state.room_form.update_field(field, value);
                Task::none()
            }
            Message::ToggleActive => {
                state.room_form.is_active = !state.room_form.is_active;
                Task::none()
            }
            Message::SubmitRoom => state.submit_room(),
            Message::RoomSaved(Ok(room)) => {
                state.push_activity(format!("Saved room {} ({})", room.name, room.id));
                state.editing = None;
                state.form_error = None;
                state.room_form = RoomForm::new();
                state.poll_now()
            }
            Message::RoomSaved(Err(err)) => {
                state.form_error = Some(err.to_string());
                Task::none()
            }
            Message::EditRoom(room_id) => {
                if let Some(room) = state.live.room(&room_id) {
                    state.room_form = RoomForm::from_room(room);
                    state.editing = Some(room_id);
                    state.form_error = None;
                }
                Task::none()
            }
            Message::CancelEdit => {
                state.editing = None;
                state.form_error = None;
                state.room_form = RoomForm::new();
                Task::none()
            }
            Message::DeleteRoom(room_id) => {
                let client = state.client.clone();
                let target = room_id.clone();
                Task::perform(
                    async move { client.delete_room(&target).await },
                    move |result| Message::RoomDeleted(room_id.clone(), result),
                )
            }
            Message::RoomDeleted(room_id, Ok(())) => {
                state.push_activity(format!("Deleted room {}", room_id));
                if state.page == Page::Grid {
                    state.poll_now()
                } else {
                    state.navigate(Page::Grid)
                }
            }
            Message::RoomDeleted(room_id, Err(err)) => {
                state.form_error = Some(format!("Deleting {} failed: {}", room_id, err));
                Task::none()
            }
            Message::SettingsLoaded(result) | Message::SettingsSaved(result) => {
                match result {
                    Ok(settings) => {
                        state.settings_form = SettingsForm::from_settings(&settings);
                        state.settings = Some(settings);
                        state.settings_error = None;
                    }
                    Err(err) => state.settings_error = Some(err.to_string()),
                }
                Task::none()
            }
            Message::ModelsLoaded(result) => {
                match result {
                    Ok(models) => state.models = models,
                    Err(err) => warn!("model list unavailable: {}", err),
                }
                Task::none()
            }
            Message::StatusLoaded(result) => {
                match result {
                    Ok(status) => state.system = Some(status),
                    Err(err) => {
                        warn!("system status unavailable: {}", err);
                        state.system = None;
                    }
                }
                Task::none()
            }
            Message::SettingsField(field, value) => {
                state.settings_form.update_field(field, value);
                Task::none()
            }
            Message::SubmitSettings => state.submit_settings(),
        }
    }

    fn on_tick(&mut self) -> Task<Message> {
        match self.page.clone() {
            Page::Grid => self.poll_now(),
            Page::Room(room_id) => Task::batch([self.poll_now(), self.load_history(room_id)]),
            Page::Settings => self.load_status(),
        }
    }

    /// Starts one cycle for the current subscription.
    fn poll_now(&mut self) -> Task<Message> {
        if self.page == Page::Settings {
            return Task::none();
        }
        let ticket = self.tracker.begin_cycle();
        let client = self.client.clone();
        let target = self.tracker.subscription().target.clone();
        Task::perform(
            async move { run_cycle(&client, &target).await },
            move |outcome| Message::CycleFinished(ticket, outcome),
        )
    }

    fn navigate(&mut self, page: Page) -> Task<Message> {
        if self.page == page {
            return Task::none();
        }
        info!("navigating to {:?}", page);
        self.page = page.clone();
        self.live.reset();
        self.history.clear();
        self.history_error = None;
        self.editing = None;
        self.form_error = None;
        self.room_form = RoomForm::new();

        let cadence = self.config.cadence();
        match page {
            Page::Grid => {
                self.tracker
                    .retarget(Subscription::dashboard().with_cadence(cadence));
                self.poll_now()
            }
            Page::Room(room_id) => {
                self.tracker
                    .retarget(Subscription::room(room_id.clone()).with_cadence(cadence));
                Task::batch([self.poll_now(), self.load_history(room_id)])
            }
            Page::Settings => {
                self.tracker.cancel();
                Task::batch([self.load_settings(), self.load_models(), self.load_status()])
            }
        }
    }

    fn load_history(&self, room_id: String) -> Task<Message> {
        let client = self.client.clone();
        let hours = self.config.history_hours;
        let target = room_id.clone();
        Task::perform(
            async move { client.history(&target, hours).await },
            move |result| Message::HistoryLoaded(room_id.clone(), result),
        )
    }

    fn load_settings(&self) -> Task<Message> {
        let client = self.client.clone();
        Task::perform(async move { client.get_settings().await }, Message::SettingsLoaded)
    }

    fn load_models(&self) -> Task<Message> {
        let client = self.client.clone();
        Task::perform(async move { client.list_models().await }, Message::ModelsLoaded)
    }

    fn load_status(&self) -> Task<Message> {
        let client = self.client.clone();
        Task::perform(async move { client.system_status().await }, Message::StatusLoaded)
    }

    fn submit_room(&mut self) -> Task<Message> {
        let client = self.client.clone();
        match self.editing.clone() {
            Some(room_id) => {
                let Some(current) = self.live.room(&room_id) else {
                    self.form_error = Some(format!("Room {} is no longer listed", room_id));
                    return Task::none();
                };
                match self.room_form.to_update(current) {
                    Ok(update) if update.is_empty() => {
                        self.editing = None;
                        self.room_form = RoomForm::new();
                        Task::none()
                    }
                    Ok(update) => Task::perform(
                        async move { client.update_room(&room_id, &update).await },
                        Message::RoomSaved,
                    ),
                    Err(err) => {
                        self.form_error = Some(err);
                        Task::none()
                    }
                }
            }
            None => match self.room_form.to_create() {
                Ok(create) => Task::perform(
                    async move { client.create_room(&create).await },
                    Message::RoomSaved,
                ),
                Err(err) => {
                    self.form_error = Some(err);
                    Task::none()
                }
            },
        }
    }

    fn submit_settings(&mut self) -> Task<Message> {
        let Some(current) = &self.settings else {
            self.settings_error = Some("Settings have not been loaded yet".into());
            return Task::none();
        };
        match self.settings_form.to_update(current) {
            Ok(update) if update.is_empty() => {
                self.push_activity("Settings unchanged".into());
                Task::none()
            }
            Ok(update) => {
                self.push_activity("Settings submitted".into());
                let client = self.client.clone();
                Task::perform(
                    async move { client.update_settings(&update).await },
                    Message::SettingsSaved,
                )
            }
            Err(err) => {
                self.settings_error = Some(err);
                Task::none()
            }
        }
    }

    fn push_activity(&mut self, entry: String) {
        info!("{}", entry);
        self.activity.push(entry);
        if self.activity.len() > ACTIVITY_LIMIT {
            self.activity.remove(0);
        }
    }

    pub fn view(state: &Self) -> Element<'_, Message> {
        let mut nav = row![
            button("Rooms").on_press(Message::Navigate(Page::Grid)).padding(8),
            button("Settings")
                .on_press(Message::Navigate(Page::Settings))
                .padding(8),
        ]
        .spacing(10)
        .align_y(Alignment::Center);
        if state.page != Page::Settings {
            nav = nav.push(state.liveness());
        }

        let body = match &state.page {
            Page::Grid => state.grid_view(),
            Page::Room(room_id) => state.room_view(room_id),
            Page::Settings => state.settings_view(),
        };

        let metrics = state.tracker.metrics();
        let footer = text(format!(
            "{} | polled {} via {} every {}s | cycles applied {} failed {} stale {} cancelled {}",
            state.activity.last().map(String::as_str).unwrap_or("Ready"),
            state.tracker.subscription().path(),
            state.client.base_url(),
            state.config.poll_secs,
            metrics.applied,
            metrics.failed,
            metrics.stale,
            metrics.cancelled
        ))
        .size(12);

        let layout = column![nav, scrollable(body).height(Length::Fill), footer]
            .spacing(12)
            .padding(20);

        Container::new(layout)
            .width(Length::Fill)
            .height(Length::Fill)
            .into()
    }

    fn liveness(&self) -> Element<'_, Message> {
        if self.live.is_live() {
            text("\u{25cf} Live")
                .size(14)
                .color(status_color(StatusColor::Green))
                .into()
        } else {
            let reason = self
                .live
                .last_error()
                .map(|err| format!("\u{25cb} Offline: {}", err))
                .unwrap_or_else(|| "\u{25cb} Connecting...".into());
            text(reason)
                .size(14)
                .color(status_color(StatusColor::Gray))
                .into()
        }
    }

    fn grid_view(&self) -> Element<'_, Message> {
        let summary = self.live.summary();
        let header = text(grid_header(&summary))
        .size(18)
        .color(status_color(summary.status.color()));

        let cards: Vec<RoomCard> = self.live.cards();
        let stamp = now();
        let grid: Element<'_, Message> = if cards.is_empty() {
            let note = if self.live.has_data() {
                "No rooms configured yet"
            } else {
                "Waiting for the first poll..."
            };
            text(note).size(14).into()
        } else {
            cards
                .chunks(CARDS_PER_ROW)
                .fold(Column::new().spacing(12), |col, chunk| {
                    col.push(
                        chunk
                            .iter()
                            .fold(Row::new().spacing(12), |row, card| {
                                row.push(room_card(card, stamp))
                            }),
                    )
                })
                .into()
        };

        let activity = if self.activity.is_empty() {
            Column::new().push(text("No activity yet").size(12))
        } else {
            self.activity
                .iter()
                .rev()
                .fold(Column::new().spacing(4), |col, entry| {
                    col.push(text(entry.clone()).size(12))
                })
        };

        column![
            text("Rooms").size(26),
            header,
            grid,
            self.room_form_view("Add room"),
            text("Activity log").size(16),
            Container::new(activity).padding(6),
        ]
        .spacing(14)
        .into()
    }

    fn room_view(&self, room_id: &str) -> Element<'_, Message> {
        let Some(room) = self.live.room(room_id) else {
            let note = match self.live.last_error() {
                Some(err) => format!("Room {} unavailable: {}", room_id, err),
                None => format!("Loading room {}...", room_id),
            };
            return column![
                text(note).size(16),
                button("Back to rooms")
                    .on_press(Message::Navigate(Page::Grid))
                    .padding(8),
            ]
            .spacing(10)
            .into();
        };
        let card = RoomCard::from_room(room);
        let color = status_color(card.color);

        let gauge = column![
            Canvas::new(Gauge::new(card.occupancy_percent, color))
                .width(Length::Fixed(180.0))
                .height(Length::Fixed(180.0)),
            text(card.occupancy_label()).size(28).color(color),
            text(card.status.label()).size(16).color(color),
        ]
        .spacing(6)
        .align_x(Alignment::Center);

        let preview = self
            .live
            .frame()
            .map(describe_frame)
            .unwrap_or_else(|| "No preview frame yet".into());

        let details = column![
            text(card.name.clone()).size(26),
            text(format!("People: {}", card.count_label())).size(16),
            text(format!("Raw detections: {}", card.raw_count)).size(14),
            text(format!("Camera: {}", room.camera_url)).size(14),
            text(format!("Updated {}", card.updated_label(now()))).size(14),
            text(preview).size(14),
            row![
                button("Edit")
                    .on_press(Message::EditRoom(card.id.clone()))
                    .padding(8),
                button("Delete")
                    .on_press(Message::DeleteRoom(card.id.clone()))
                    .padding(8),
            ]
            .spacing(10),
        ]
        .spacing(8);

        let chart_title = match &self.history_error {
            Some(err) => format!("Last {} hours (unavailable: {})", self.config.history_hours, err),
            None => format!(
                "Last {} hours ({} samples)",
                self.config.history_hours,
                self.history.len()
            ),
        };

        let mut page = column![
            row![gauge, details].spacing(30).align_y(Alignment::Start),
            text(chart_title).size(16),
            Canvas::new(HistoryChart::new(&self.history))
                .width(Length::Fill)
                .height(Length::Fixed(220.0)),
        ]
        .spacing(14);

        if self.editing.as_deref() == Some(room_id) {
            page = page.push(self.room_form_view("Edit room"));
        }
        page.into()
    }

    fn room_form_view(&self, title: &str) -> Element<'_, Message> {
        let editing = self.editing.is_some();
        let mut id_input = text_input("Room id", &self.room_form.id).padding(6);
        if !editing {
            id_input = id_input.on_input(|value| Message::RoomField(RoomField::Id, value));
        }
        let active = if self.room_form.is_active {
            "Active: yes"
        } else {
            "Active: no"
        };

        let mut actions = row![
            button(active).on_press(Message::ToggleActive).padding(8),
            button(if editing { "Save" } else { "Create" })
                .on_press(Message::SubmitRoom)
                .padding(8),
        ]
        .spacing(10);
        if editing {
            actions = actions.push(button("Cancel").on_press(Message::CancelEdit).padding(8));
        }

        let mut form = column![
            text(title.to_string()).size(18),
            id_input,
            text_input("Name", &self.room_form.name)
                .on_input(|value| Message::RoomField(RoomField::Name, value))
                .padding(6),
            text_input("Capacity", &self.room_form.capacity)
                .on_input(|value| Message::RoomField(RoomField::Capacity, value))
                .padding(6),
            text_input("Camera URL", &self.room_form.camera_url)
                .on_input(|value| Message::RoomField(RoomField::CameraUrl, value))
                .padding(6),
            actions,
        ]
        .spacing(8)
        .width(Length::Fixed(360.0));
        if let Some(err) = &self.form_error {
            form = form.push(text(err.clone()).size(13).color(status_color(StatusColor::Red)));
        }
        form.into()
    }

    fn settings_view(&self) -> Element<'_, Message> {
        let form = column![
            text("Detection settings").size(26),
            text_input("Model", &self.settings_form.model)
                .on_input(|value| Message::SettingsField(SettingsField::Model, value))
                .padding(6),
            text_input("Confidence threshold (0-1)", &self.settings_form.confidence_threshold)
                .on_input(|value| Message::SettingsField(SettingsField::Confidence, value))
                .padding(6),
            text_input("Detection interval (s)", &self.settings_form.detection_interval)
                .on_input(|value| Message::SettingsField(SettingsField::Interval, value))
                .padding(6),
            text_input("Smoothing alpha (0-1]", &self.settings_form.smoothing_alpha)
                .on_input(|value| Message::SettingsField(SettingsField::Smoothing, value))
                .padding(6),
            text_input("Image size (480, 640, 1280)", &self.settings_form.imgsz)
                .on_input(|value| Message::SettingsField(SettingsField::ImageSize, value))
                .padding(6),
            button("Save settings")
                .on_press(Message::SubmitSettings)
                .padding(10),
        ]
        .spacing(10)
        .width(Length::Fixed(360.0));
        let form = match &self.settings_error {
            Some(err) => form.push(text(err.clone()).size(13).color(status_color(StatusColor::Red))),
            None => form,
        };

        let models = self.models.iter().fold(
            Column::new().spacing(6).push(text("Available models").size(18)),
            |col, model| {
                let marker = if model.id == self.settings_form.model {
                    "\u{25cf}"
                } else {
                    "\u{25cb}"
                };
                col.push(
                    button(text(format!("{} {} [{:?}]", marker, model.name, model.kind)).size(13))
                        .on_press(Message::SettingsField(SettingsField::Model, model.id.clone()))
                        .padding(6),
                )
                .push(text(model.description.clone()).size(12))
            },
        );

        let system: Element<'_, Message> = match &self.system {
            Some(status) => column![
                text("System status").size(18),
                text(format!("Device: {}", status.device)).size(13),
                text(format!(
                    "Model: {} ({})",
                    status.model,
                    if status.model_loaded { "loaded" } else { "not loaded" }
                ))
                .size(13),
                text(format!(
                    "Cameras: {} / {} connected",
                    status.cameras_connected, status.cameras_total
                ))
                .size(13),
                text(format!("Uptime: {:.0} s", status.uptime_seconds)).size(13),
                text(format!("Average inference: {:.1} ms", status.avg_inference_ms)).size(13),
            ]
            .spacing(4)
            .into(),
            None => text("System status unavailable").size(13).into(),
        };

        row![form, column![models, system].spacing(20)]
            .spacing(30)
            .align_y(Alignment::Start)
            .into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dashboard() -> Dashboard {
        let config = DashboardConfig::default();
        let client = ApiClient::new(&config.api).unwrap();
        Dashboard::boot(client, config).0
    }

    fn batch(count: u32) -> CycleBatch {
        let mut room = Room::new("hall-1", "Main Hall", 300);
        room.count = count;
        let messages = vec![crowdcore::api_interface::LiveUpdateMessage::from_room(&room)];
        CycleBatch {
            roster: vec![room],
            messages,
        }
    }

    #[test]
    fn describe_frame_reports_size_and_type() {
        let text = describe_frame("data:image/x-portable-graymap;base64,AAEC");
        assert_eq!(text, "Preview frame: 3 bytes (image/x-portable-graymap)");
        assert!(describe_frame("%%%").starts_with("Preview frame could not be decoded"));
    }

    #[test]
    fn grid_header_lists_each_total_once() {
        let mut state = dashboard();
        let ticket = state.tracker.begin_cycle();
        let _ = Dashboard::update(&mut state, Message::CycleFinished(ticket, Ok(batch(120))));
        let header = grid_header(&state.live.summary());
        assert_eq!(header, "1 rooms (1 active) | 120 / 300 people | 40.0% Medium");
    }

    #[test]
    fn committed_cycle_reaches_the_grid() {
        let mut state = dashboard();
        let ticket = state.tracker.begin_cycle();
        let _ = Dashboard::update(&mut state, Message::CycleFinished(ticket, Ok(batch(120))));
        let cards = state.live.cards();
        assert_eq!(cards[0].occupancy_label(), "40.0%");
        assert!(state.live.is_live());
    }

    #[test]
    fn cycles_from_a_previous_page_are_dropped() {
        let mut state = dashboard();
        let stale = state.tracker.begin_cycle();
        let _ = Dashboard::update(&mut state, Message::Navigate(Page::Room("hall-1".into())));
        let _ = Dashboard::update(&mut state, Message::CycleFinished(stale, Ok(batch(10))));
        assert!(state.live.room("hall-1").is_none());
        assert_eq!(state.tracker.metrics().cancelled, 1);
    }

    #[test]
    fn failed_cycle_flags_offline_and_keeps_cards() {
        let mut state = dashboard();
        let ticket = state.tracker.begin_cycle();
        let _ = Dashboard::update(&mut state, Message::CycleFinished(ticket, Ok(batch(120))));
        let ticket = state.tracker.begin_cycle();
        let err = crowdcore::RequestError::Transport("connection refused".into());
        let _ = Dashboard::update(&mut state, Message::CycleFinished(ticket, Err(err)));
        assert!(!state.live.is_live());
        assert_eq!(state.live.cards()[0].count, 120);
    }

    #[test]
    fn form_errors_stay_with_the_form() {
        let mut state = dashboard();
        let ticket = state.tracker.begin_cycle();
        let _ = Dashboard::update(&mut state, Message::CycleFinished(ticket, Ok(batch(5))));
        let err = crowdcore::RequestError::Status {
            status: 400,
            message: "Room with this ID already exists".into(),
        };
        let _ = Dashboard::update(&mut state, Message::RoomSaved(Err(err)));
        assert_eq!(
            state.form_error.as_deref(),
            Some("Room with this ID already exists")
        );
        assert!(state.live.is_live());
        assert!(state.live.last_error().is_none());
    }
}
