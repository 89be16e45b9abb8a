use anyhow::Context;
use app::{Dashboard, Message};
use clap::Parser;
use config::DashboardConfig;
use crowdcore::sync::ApiClient;
use iced::{time, Subscription, Theme};
use log::info;
use std::path::PathBuf;

mod app;
mod config;
mod forms;
mod widgets;

#[derive(Parser)]
#[command(author, version, about = "CrowdCount occupancy dashboard")]
struct Args {
    /// Load connection and polling settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    /// Backend base URL, e.g. http://127.0.0.1:8000
    #[arg(long)]
    api_url: Option<String>,
    /// Seconds between poll cycles
    #[arg(long)]
    poll_secs: Option<u64>,
    /// Window of the room history chart, 1-72 hours
    #[arg(long)]
    history_hours: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config {
        Some(path) => DashboardConfig::load(path)?,
        None => DashboardConfig::default(),
    }
    .with_overrides(args.api_url, args.poll_secs, args.history_hours)?;

    let client = ApiClient::new(&config.api)
        .with_context(|| format!("creating API client for {}", config.api.base_url))?;
    info!(
        "polling {} every {}s",
        client.base_url(),
        config.poll_secs
    );

    iced::application(
        move || Dashboard::boot(client.clone(), config.clone()),
        Dashboard::update,
        Dashboard::view,
    )
    .title(Dashboard::title)
    .subscription(application_subscription)
    .theme(application_theme)
    .run()
    .context("running the dashboard window")
}

fn application_subscription(state: &Dashboard) -> Subscription<Message> {
    time::every(state.cadence()).map(|_| Message::Tick)
}

fn application_theme(_: &Dashboard) -> Theme {
    Theme::Dark
}
