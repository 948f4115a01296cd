use super::{EnvError, Environment};
use tracing::{debug, warn};

pub const SHLVL_PREFIX: &str = "SHLVL=";

const SHLVL_LIMIT: u32 = 1000;

fn current_level(environment: &Environment) -> u32 {
    environment
        .get("SHLVL")
        .and_then(|value| value.trim().parse::<i64>().ok())
        .map(|level| level.clamp(0, i64::from(u32::MAX)) as u32)
        .unwrap_or(0)
}

/// Bumps `SHLVL` for a newly started shell and returns the new level.
///
/// Missing, non-numeric or negative values count as 0.
pub fn increment_shell_level(environment: &mut Environment) -> Result<u32, EnvError> {
    let mut level = current_level(environment).saturating_add(1);
    if level >= SHLVL_LIMIT {
        warn!(level, "shell level too high, resetting to 1");
        level = 1;
    }

    if !environment.find_and_replace(SHLVL_PREFIX, level.to_string())? {
        environment.set("SHLVL", &level.to_string())?;
    }
    debug!(level, "shell level updated");
    Ok(level)
}
