use anyhow::Context;
use api::routes::routes;
use api::store::{now, read_state};
use clap::Parser;
use log::info;
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::runtime::Builder as TokioBuilder;
use tokio::signal;
use workflow::config::SimConfig;
use workflow::runner::{seed_state, Runner};

mod api;
mod generator;
mod workflow;

#[derive(Parser)]
#[command(author, version, about = "In-memory CrowdCount backend with synthetic occupancy")]
struct Args {
    /// Load rooms, tick cadence and detection settings from YAML
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long)]
    port: Option<u16>,
    /// Seed for the synthetic count generator
    #[arg(long)]
    seed: Option<u64>,
    /// Run a single detection pass, print the room table and exit
    #[arg(long, default_value_t = false)]
    once: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let config = match args.config {
        Some(path) => SimConfig::load(path)?.with_overrides(args.port, args.seed),
        None => SimConfig::from_args(args.port, args.seed),
    };

    let state = seed_state(&config, now())?;
    let mut runner = Runner::new(config.clone(), state.clone());

    if args.once {
        runner.tick(now());
        for room in read_state(&state).list_rooms() {
            println!(
                "{:<12} {:<20} {:>4}/{:<4} {:>6.1}% {}",
                room.id,
                room.name,
                room.count,
                room.capacity,
                room.occupancy_percent,
                room.status
            );
        }
        return Ok(());
    }

    let runtime = TokioBuilder::new_multi_thread()
        .enable_all()
        .build()
        .context("creating runtime for the simulator")?;
    runtime.block_on(async move {
        let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
        let (bound, server) = warp::serve(routes(state))
            .try_bind_with_graceful_shutdown(addr, async {
                if let Err(err) = signal::ctrl_c().await {
                    log::error!("awaiting Ctrl+C failed: {}", err);
                }
            })
            .with_context(|| format!("binding simulator on {}", addr))?;
        info!("serving the CrowdCount API on http://{} (Ctrl+C to stop)", bound);

        let ticker = tokio::spawn(runner.run());
        server.await;
        ticker.abort();
        info!("simulator stopped");
        Ok::<(), anyhow::Error>(())
    })
}
