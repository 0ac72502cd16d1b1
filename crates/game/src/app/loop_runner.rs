use std::process::ExitCode;
use std::time::Duration;

use platformer_engine::{ActionStates, World, WorldEvent};
use tracing::{error, info};

use super::bootstrap::AppWiring;
use super::level::{load_level, ScriptSegment};

/// Simulated display refresh used for replay, independent of the tick rate.
const FRAME_DT: Duration = Duration::from_micros(16_667);
const IDLE_FRAMES: u32 = 600;
const PROGRESS_LOG_INTERVAL_FRAMES: u32 = 60;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ReplaySummary {
    pub(crate) frames: u32,
    pub(crate) stomps: u32,
    pub(crate) player_died: bool,
}

pub(crate) fn run(app: AppWiring) -> ExitCode {
    let level_path = app.paths.level_file(&app.level_name);
    let mut level = match load_level(&level_path, &app.settings) {
        Ok(level) => level,
        Err(err) => {
            error!(error = %err, "level_load_failed");
            return ExitCode::FAILURE;
        }
    };

    let script = level.script.take().unwrap_or_else(|| idle_script(IDLE_FRAMES));
    let summary = replay(&mut level.world, &script);

    let player = level.world.player().map(|actor| (actor.body.x, actor.body.y));
    info!(
        frames = summary.frames,
        ticks = level.world.total_ticks(),
        stomps = summary.stomps,
        player_died = summary.player_died,
        enemies_left = level.world.enemy_count(),
        player_position = ?player,
        "run_finished"
    );
    info!("shutdown");
    ExitCode::SUCCESS
}

fn idle_script(frames: u32) -> Vec<ScriptSegment> {
    vec![ScriptSegment {
        frames,
        actions: Vec::new(),
    }]
}

/// Plays the script one frame at a time. Stops early once the player is dead.
pub(crate) fn replay(world: &mut World, script: &[ScriptSegment]) -> ReplaySummary {
    let mut summary = ReplaySummary::default();
    for segment in script {
        let input = ActionStates::from_actions(&segment.actions);
        for _ in 0..segment.frames {
            let report = world.advance(FRAME_DT, &input);
            summary.frames = summary.frames.saturating_add(1);
            for event in report.events {
                match event {
                    WorldEvent::EnemyStomped { .. } => summary.stomps += 1,
                    WorldEvent::PlayerDied { .. } => summary.player_died = true,
                }
            }
            if summary.player_died {
                return summary;
            }
            if summary.frames % PROGRESS_LOG_INTERVAL_FRAMES == 0 {
                info!(
                    frames = summary.frames,
                    ticks = world.total_ticks(),
                    actor_count = world.actors().len(),
                    "replay_progress"
                );
            }
        }
    }
    summary
}
