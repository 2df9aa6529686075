use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use ninja_engine::SceneConfig;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::loop_runner::LoopConfig;

const MAPS_DIR_ENV_VAR: &str = "NINJA_MAPS_DIR";
const SEED_ENV_VAR: &str = "NINJA_SEED";
const START_LEVEL_ENV_VAR: &str = "NINJA_START_LEVEL";
const DEFAULT_MAPS_DIR: &str = "data/maps";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: SceneConfig,
    pub(crate) maps_dir: PathBuf,
}

pub(crate) fn build_app() -> AppWiring {
    init_tracing();
    info!("=== Ninja Game Startup ===");

    let mut scene = SceneConfig::default();
    if let Some(seed) = parse_env_override(SEED_ENV_VAR, env::var(SEED_ENV_VAR)) {
        scene.seed = seed;
    }
    if let Some(start_level) =
        parse_env_override(START_LEVEL_ENV_VAR, env::var(START_LEVEL_ENV_VAR))
    {
        scene.start_level = start_level;
    }
    let maps_dir = env::var_os(MAPS_DIR_ENV_VAR)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_MAPS_DIR));

    AppWiring {
        config: LoopConfig::default(),
        scene,
        maps_dir,
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn parse_env_override<T: FromStr>(
    env_var: &'static str,
    value: Result<String, env::VarError>,
) -> Option<T> {
    match value {
        Ok(value) => match value.trim().parse::<T>() {
            Ok(parsed) => Some(parsed),
            Err(_) => {
                warn!(
                    env_var,
                    value = value.as_str(),
                    "invalid env var value; falling back to default"
                );
                None
            }
        },
        Err(env::VarError::NotPresent) => None,
        Err(err) => {
            warn!(
                env_var,
                error = %err,
                "unable to read env var; falling back to default"
            );
            None
        }
    }
}
