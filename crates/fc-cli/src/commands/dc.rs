use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use fc_core::{Actor, Scene, UserContext};
use fc_mechanics::{AggregateTargetSlot, aggregate_for_targets, requirement_for};

use super::{describe_conditions, parse_conditions, spawn_targets};

pub fn run(origin: &str, targets: &[String]) -> Result<(), String> {
    let mut scene = Scene::default();
    let mut user = UserContext::default();

    let origin = parse_conditions(origin)
        .into_iter()
        .fold(Actor::character("Origin"), Actor::with_condition);
    let origin_token = scene.spawn(origin);
    user.control(origin_token);
    let tokens = spawn_targets(&mut scene, &mut user, targets);

    let origin = scene
        .guess_origin(&user)
        .ok_or_else(|| "origin token has no actor".to_string())?;

    if tokens.len() > 1 {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Target", "Conditions", "Flat check"]);
        for token in tokens.iter().filter_map(|id| scene.token(*id)) {
            let conditions = scene
                .actor_of(token)
                .map(|a| describe_conditions(&a.conditions))
                .unwrap_or_default();
            let requirement = requirement_for(&scene, origin, token, None)
                .map_or_else(|| "—".to_string(), |d| d.to_string());
            table.add_row(vec![token.name.clone(), conditions, requirement]);
        }
        println!("{table}");
        println!();
    }

    match aggregate_for_targets(&scene, origin, &user.targets, None) {
        Some(AggregateTargetSlot::Single(descriptor)) => {
            println!("  {}", descriptor.to_string().bold());
            if let Some(description) = &descriptor.description {
                println!("  {description}");
            }
        }
        Some(AggregateTargetSlot::Count(count)) => {
            println!("  {count} targets require a flat check");
        }
        None => println!("  No flat check required."),
    }

    Ok(())
}
