pub mod config;
pub mod dc;
pub mod message;

use std::path::Path;

use fc_core::{Actor, Condition, FlatCheckConfig, Scene, TokenId, UserContext};

/// Load the configuration file, or the defaults when none is given.
pub fn load_config(path: Option<&Path>) -> Result<FlatCheckConfig, String> {
    let Some(path) = path else {
        return Ok(FlatCheckConfig::default());
    };
    let json = std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read {}: {e}", path.display()))?;
    let config =
        FlatCheckConfig::from_json(&json).map_err(|e| format!("{}: {e}", path.display()))?;
    tracing::debug!(path = %path.display(), namespace = %config.namespace, "loaded configuration");
    Ok(config)
}

/// Parse a comma-separated condition list such as `grabbed,stupefied-2`.
fn parse_conditions(list: &str) -> Vec<Condition> {
    list.split(',').filter_map(Condition::parse).collect()
}

/// Spawn one token per condition list and target it.
fn spawn_targets(scene: &mut Scene, user: &mut UserContext, lists: &[String]) -> Vec<TokenId> {
    lists
        .iter()
        .enumerate()
        .map(|(i, list)| {
            let actor = parse_conditions(list)
                .into_iter()
                .fold(Actor::npc(format!("Target {}", i + 1)), Actor::with_condition);
            let token = scene.spawn(actor);
            user.target(token);
            token
        })
        .collect()
}

fn describe_conditions(conditions: &[Condition]) -> String {
    if conditions.is_empty() {
        return "—".to_string();
    }
    conditions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
