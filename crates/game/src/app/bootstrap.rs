use std::env;

use platformer_engine::LoopConfig;
use tracing::info;
use tracing_subscriber::EnvFilter;

use super::level::LevelSettings;
use super::paths::{resolve_app_paths, AppPaths, StartupError};

const LEVEL_ENV_VAR: &str = "PLATFORMER_LEVEL";
const TPS_ENV_VAR: &str = "PLATFORMER_TPS";
const DEFAULT_LEVEL: &str = "level_1";

pub(crate) struct AppWiring {
    pub(crate) paths: AppPaths,
    pub(crate) level_name: String,
    pub(crate) settings: LevelSettings,
}

pub(crate) fn build_app() -> Result<AppWiring, StartupError> {
    init_tracing();
    info!("=== Platformer Startup ===");

    let paths = resolve_app_paths()?;
    let level_name = level_name_from(read_env(LEVEL_ENV_VAR)?)?;
    let loop_config = loop_config_from(read_env(TPS_ENV_VAR)?)?;
    info!(
        root = %paths.root.display(),
        levels_dir = %paths.levels_dir.display(),
        level = %level_name,
        target_tps = loop_config.target_tps,
        "startup"
    );

    Ok(AppWiring {
        paths,
        level_name,
        settings: LevelSettings {
            loop_config,
            ..LevelSettings::default()
        },
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn read_env(var: &'static str) -> Result<Option<String>, StartupError> {
    match env::var(var) {
        Ok(value) => Ok(Some(value)),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(source) => Err(StartupError::EnvVar { var, source }),
    }
}

fn level_name_from(raw: Option<String>) -> Result<String, StartupError> {
    let Some(raw) = raw else {
        return Ok(DEFAULT_LEVEL.to_string());
    };
    let name = raw.trim();
    if name.is_empty() {
        return Ok(DEFAULT_LEVEL.to_string());
    }
    if name.contains(['/', '\\']) || name == ".." {
        return Err(StartupError::InvalidLevelName {
            var: LEVEL_ENV_VAR,
            value: raw,
        });
    }
    Ok(name.to_string())
}

fn loop_config_from(raw_tps: Option<String>) -> Result<LoopConfig, StartupError> {
    let mut config = LoopConfig::default();
    if let Some(raw) = raw_tps {
        config.target_tps = raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|tps| *tps > 0)
            .ok_or(StartupError::InvalidTickRate {
                var: TPS_ENV_VAR,
                value: raw,
            })?;
    }
    Ok(config)
}
