use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use platformer_engine::physics::{BodyError, ContactPolicy, EnemyTuning, PlayerTuning, SimConfig};
use platformer_engine::{
    InputAction, LoopConfig, TileGrid, TileGridError, TileId, TileKey, TileKeys, TimestepError,
    World, DEFAULT_TILE_SIZE,
};
use serde::Deserialize;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub(crate) enum LevelLoadError {
    #[error("failed to read level file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse level file {path}{}: {source}", at_field(field))]
    Parse {
        path: PathBuf,
        field: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid level file {path} at {field}: {message}")]
    Invalid {
        path: PathBuf,
        field: String,
        message: String,
    },
    #[error("level file {path} has an unusable tile map: {source}")]
    Grid {
        path: PathBuf,
        #[source]
        source: TileGridError,
    },
    #[error("level file {path} has an unusable spawn: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: BodyError,
    },
    #[error(transparent)]
    Timestep(#[from] TimestepError),
}

fn at_field(field: &str) -> String {
    if field.is_empty() || field == "." {
        String::new()
    } else {
        format!(" at {field}")
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct LevelFile {
    #[serde(default = "default_tile_size")]
    pub(crate) tile_size: f32,
    /// Falls back to the built-in air/block table when absent.
    #[serde(default)]
    pub(crate) keys: Option<Vec<TileKey>>,
    pub(crate) tiles: Vec<Vec<TileId>>,
    pub(crate) player: SpawnPoint,
    #[serde(default)]
    pub(crate) enemies: Vec<SpawnPoint>,
    #[serde(default)]
    pub(crate) contact_policy: Option<ContactPolicy>,
    #[serde(default)]
    pub(crate) script: Option<Vec<ScriptSegment>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct SpawnPoint {
    pub(crate) x: f32,
    pub(crate) y: f32,
}

/// `frames` consecutive frames with `actions` held down.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct ScriptSegment {
    pub(crate) frames: u32,
    #[serde(default)]
    pub(crate) actions: Vec<InputAction>,
}

fn default_tile_size() -> f32 {
    DEFAULT_TILE_SIZE
}

#[derive(Debug, Clone, Default)]
pub(crate) struct LevelSettings {
    pub(crate) sim: SimConfig,
    pub(crate) loop_config: LoopConfig,
    pub(crate) player: PlayerTuning,
    pub(crate) enemy: EnemyTuning,
}

#[derive(Debug)]
pub(crate) struct LoadedLevel {
    pub(crate) world: World,
    pub(crate) script: Option<Vec<ScriptSegment>>,
}

pub(crate) fn load_level(
    path: &Path,
    settings: &LevelSettings,
) -> Result<LoadedLevel, LevelLoadError> {
    let raw = fs::read_to_string(path).map_err(|source| LevelLoadError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let level = parse_level_json(&raw, path)?;
    validate_level(&level, path)?;
    let script = level.script.clone();
    let world = build_world(&level, settings, path)?;
    info!(
        path = %path.display(),
        enemy_count = level.enemies.len(),
        scripted = script.is_some(),
        "level_loaded"
    );
    Ok(LoadedLevel { world, script })
}

fn parse_level_json(raw: &str, path: &Path) -> Result<LevelFile, LevelLoadError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize::<_, LevelFile>(&mut deserializer).map_err(|error| {
        let field = error.path().to_string();
        LevelLoadError::Parse {
            path: path.to_path_buf(),
            field,
            source: error.into_inner(),
        }
    })
}

fn validate_level(level: &LevelFile, path: &Path) -> Result<(), LevelLoadError> {
    let invalid = |field: String, message: &str| LevelLoadError::Invalid {
        path: path.to_path_buf(),
        field,
        message: message.to_string(),
    };

    let spawns = std::iter::once(("player".to_string(), level.player)).chain(
        level
            .enemies
            .iter()
            .enumerate()
            .map(|(index, spawn)| (format!("enemies[{index}]"), *spawn)),
    );
    for (field, spawn) in spawns {
        if !spawn.x.is_finite() {
            return Err(invalid(format!("{field}.x"), "expected finite number"));
        }
        if !spawn.y.is_finite() {
            return Err(invalid(format!("{field}.y"), "expected finite number"));
        }
    }

    if level.keys.as_ref().is_some_and(Vec::is_empty) {
        let message = "expected at least one tile key";
        return Err(invalid("keys".to_string(), message));
    }
    Ok(())
}

fn build_world(
    level: &LevelFile,
    settings: &LevelSettings,
    path: &Path,
) -> Result<World, LevelLoadError> {
    let keys = level.keys.clone().map(TileKeys::from_keys).unwrap_or_default();
    let grid_error = |source| LevelLoadError::Grid {
        path: path.to_path_buf(),
        source,
    };
    let grid = TileGrid::from_id_map(&level.tiles, level.tile_size, &keys).map_err(grid_error)?;

    let sim = SimConfig {
        contact_policy: level.contact_policy.unwrap_or(settings.sim.contact_policy),
        ..settings.sim
    };
    let mut world = World::new(grid, sim, &settings.loop_config)?;

    let spawn_error = |source| LevelLoadError::Spawn {
        path: path.to_path_buf(),
        source,
    };
    world
        .spawn_player(level.player.x, level.player.y, &settings.player)
        .map_err(spawn_error)?;
    for enemy in &level.enemies {
        world
            .spawn_enemy(enemy.x, enemy.y, &settings.enemy)
            .map_err(spawn_error)?;
    }
    Ok(world)
}
