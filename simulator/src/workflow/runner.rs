use crate::api::store::{now, read_state, write_state, SharedState, SimState};
use crate::generator::frame::render_frame;
use crate::generator::occupancy::{room_seed, OccupancyWalk};
use crate::workflow::config::SimConfig;
use anyhow::Context;
use chrono::NaiveDateTime;
use log::{debug, info, warn};
use std::collections::HashMap;

/// Seeds the in-memory state from the config's room list.
pub fn seed_state(config: &SimConfig, started_at: NaiveDateTime) -> anyhow::Result<SharedState> {
    let mut state = SimState::new(config.settings.clone(), started_at);
    for seed in &config.rooms {
        state
            .create_room(seed.to_create(), started_at)
            .with_context(|| format!("seeding room {}", seed.id))?;
    }
    Ok(state.shared())
}

/// Drives synthetic detections: one raw sample and one preview frame per
/// active room per tick.
pub struct Runner {
    config: SimConfig,
    state: SharedState,
    walks: HashMap<String, OccupancyWalk>,
}

impl Runner {
    pub fn new(config: SimConfig, state: SharedState) -> Self {
        Self {
            config,
            state,
            walks: HashMap::new(),
        }
    }

    /// Runs one detection pass and returns how many rooms were sampled.
    pub fn tick(&mut self, now: NaiveDateTime) -> usize {
        let rooms = read_state(&self.state).room_ids();
        self.walks
            .retain(|id, _| rooms.iter().any(|(room_id, _, _)| room_id == id));

        let mut sampled = Vec::new();
        {
            let mut state = write_state(&self.state);
            for (room_id, capacity, active) in rooms {
                if !active {
                    continue;
                }
                let baseline = self
                    .config
                    .rooms
                    .iter()
                    .find(|seed| seed.id == room_id)
                    .map(|seed| seed.baseline)
                    .unwrap_or(0.4);
                let base_seed = self.config.seed;
                let walk = self
                    .walks
                    .entry(room_id.clone())
                    .or_insert_with(|| OccupancyWalk::new(room_seed(base_seed, &room_id), baseline));

                let raw = walk.next_raw(capacity);
                let inference_ms = walk.inference_ms();
                let frame_seed = walk.frame_seed();
                match state.record_count(&room_id, raw, inference_ms, now) {
                    Ok(record) => {
                        debug!(
                            "{}: raw {} smoothed {} ({:.1}%)",
                            room_id, record.raw_count, record.count, record.occupancy
                        );
                        sampled.push((room_id, raw, frame_seed));
                    }
                    Err(err) => warn!("skipping {}: {}", room_id, err),
                }
            }
            let pruned = state.prune_history(now);
            if pruned > 0 {
                debug!("pruned {} expired count records", pruned);
            }
        }

        // Frames are rendered without holding the store lock.
        let previews: Vec<(String, String, u32)> = sampled
            .into_iter()
            .map(|(room_id, raw, frame_seed)| {
                let frame = render_frame(
                    self.config.frame_width,
                    self.config.frame_height,
                    raw,
                    frame_seed,
                );
                (room_id, frame, raw)
            })
            .collect();
        let count = previews.len();
        let mut state = write_state(&self.state);
        for (room_id, frame, raw) in previews {
            state.set_preview(&room_id, frame, raw, now);
        }
        count
    }

    pub async fn run(mut self) {
        let mut interval = tokio::time::interval(self.config.tick());
        info!(
            "generating detections every {} ms for {} seeded rooms",
            self.config.tick_ms,
            self.config.rooms.len()
        );
        loop {
            interval.tick().await;
            self.tick(now());
        }
    }
}
