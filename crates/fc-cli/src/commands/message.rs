use clap::Args;
use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use fc_core::{Actor, FlatCheckConfig, Scene, UserContext};
use fc_mechanics::{FlatOutcome, FlatRoll, FlatRoller, MechResult, RollOptions, ScriptedRoller, SeededRoller};
use fc_message::render::RULE_NOTE;
use fc_message::{
    Activation, CellMark, ContextType, ControlBlock, ControlRow, FixedChoice, ItemInfo, ItemKind,
    KeepPolicy, MemoryStore, MessageRecord, RecordStore, RollCell, SlotKey, SlotResolver, Viewer,
    build_control_block, populate,
};

use super::{parse_conditions, spawn_targets};

#[derive(Args)]
pub struct MessageArgs {
    /// Speaker conditions, comma-separated (e.g. grabbed,stupefied-2)
    #[arg(short, long, default_value = "")]
    conditions: String,

    /// Kind of item used: action, consumable, equipment, feat, melee, weapon, spell
    #[arg(short, long, default_value = "action")]
    item: String,

    /// Item traits, comma-separated (e.g. manipulate,auditory)
    #[arg(long, default_value = "")]
    traits: String,

    /// Conditions of one targeted token, comma-separated; repeat per target
    #[arg(short, long = "target")]
    targets: Vec<String>,

    /// Speaker's hero points
    #[arg(long, default_value = "1")]
    hero_points: i32,

    /// Only roll this slot (grabbed, stupefied, deafened, targets)
    #[arg(long)]
    slot: Option<String>,

    /// Reroll after the first roll, keeping: hero, new, low, high
    #[arg(short, long)]
    keep: Option<String>,

    /// RNG seed
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Use these d20 results instead of rolling, comma-separated
    #[arg(long, value_delimiter = ',')]
    rolls: Option<Vec<u32>>,

    /// Also print the stored flags as JSON
    #[arg(long)]
    json: bool,
}

enum Dice {
    Seeded(SeededRoller),
    Scripted(ScriptedRoller),
}

impl FlatRoller for Dice {
    fn roll(&mut self, dc: u32, options: RollOptions) -> MechResult<FlatRoll> {
        match self {
            Self::Seeded(r) => r.roll(dc, options),
            Self::Scripted(r) => r.roll(dc, options),
        }
    }
}

pub fn run(args: &MessageArgs, config: &FlatCheckConfig) -> Result<(), String> {
    let keep = args.keep.as_deref().map(str::parse::<KeepPolicy>).transpose()?;
    let only = args.slot.as_deref().map(str::parse::<SlotKey>).transpose()?;

    let mut scene = Scene::default();
    let mut user = UserContext::default();
    let speaker = parse_conditions(&args.conditions)
        .into_iter()
        .fold(Actor::character("Speaker"), Actor::with_condition)
        .with_hero_points(args.hero_points, args.hero_points.max(3));
    let speaker_id = speaker.id;
    let speaker_token = scene.spawn(speaker);
    user.control(speaker_token);
    spawn_targets(&mut scene, &mut user, &args.targets);

    let kind = ItemKind::parse(&args.item);
    let traits: Vec<&str> = args.traits.split(',').map(str::trim).filter(|t| !t.is_empty()).collect();
    let mut record = MessageRecord::new(Some(speaker_id)).with_item(ItemInfo::new(kind, &traits));
    if kind == ItemKind::Spell {
        record = record.with_context(ContextType::SpellCast, false);
    }

    let written = populate(&mut record, &scene, &user, config, None).map_err(|e| e.to_string())?;
    let flags = record
        .check_flags(&config.namespace)
        .filter(|f| written && !f.is_empty());
    let Some(flags) = flags else {
        println!("  No flat checks apply to this message.");
        return Ok(());
    };

    let mut store = MemoryStore::new(config.namespace.clone(), scene);
    let message = store.insert(record);
    let dice = match &args.rolls {
        Some(totals) => Dice::Scripted(ScriptedRoller::new(totals.iter().copied())),
        None => Dice::Seeded(SeededRoller::new(args.seed)),
    };
    let mut resolver = SlotResolver::new(dice);

    let mut keys: Vec<SlotKey> = flags.slots().map(|(k, _)| k).collect();
    if let Some(only) = only {
        keys.retain(|k| *k == only);
        if keys.is_empty() {
            return Err(format!("no '{only}' flat check on this message"));
        }
    }

    for key in keys {
        let first = resolver
            .activate(&mut store, &mut FixedChoice(None), Viewer::owner(), message, key)
            .map_err(|e| e.to_string())?;
        print_activation(key, &first);
        if let Some(keep) = keep {
            let second = resolver
                .activate(&mut store, &mut FixedChoice(Some(keep)), Viewer::owner(), message, key)
                .map_err(|e| e.to_string())?;
            print_activation(key, &second);
        }
    }
    println!();

    let record = store
        .record(message)
        .ok_or_else(|| "message disappeared from the store".to_string())?;
    let flags = record.check_flags(store.namespace()).unwrap_or_default();
    print_block(&build_control_block(&flags, Viewer::owner()));

    if let Some(points) = store.actor(speaker_id).and_then(|a| a.hero_points.as_ref()) {
        println!("  {points}");
    }

    if args.json {
        let value = record.flag(store.namespace()).cloned().unwrap_or_default();
        let json = serde_json::to_string_pretty(&value).map_err(|e| e.to_string())?;
        println!("{json}");
    }

    Ok(())
}

fn print_activation(key: SlotKey, activation: &Activation) {
    match activation {
        Activation::Rolled(roll) => println!("  {} {key}: {roll}", "Rolled".bold()),
        Activation::Rerolled { roll, keep } => {
            println!("  {} {key} (keep {keep}): {roll}", "Rerolled".bold());
        }
        Activation::Cancelled => println!("  {key}: reroll cancelled"),
        Activation::Ignored(reason) => println!("  {key}: ignored ({reason:?})"),
    }
}

fn print_block(block: &ControlBlock) {
    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Check", "DC", "Rolls", "Kept", "Result"]);

    for row in block.check_rows() {
        let rolls = row
            .cells
            .iter()
            .filter_map(format_cell)
            .collect::<Vec<_>>()
            .join(" ");
        let kept = row.keep.map(|k| k.to_string()).unwrap_or_default();
        let result = row
            .cells
            .iter()
            .find_map(|c| match c.mark {
                CellMark::Outcome(FlatOutcome::Success) => Some("success".green().to_string()),
                CellMark::Outcome(FlatOutcome::Failure) => Some("failure".red().to_string()),
                _ => None,
            })
            .unwrap_or_else(|| "—".to_string());
        table.add_row(vec![row.label.clone(), format!("DC {}", row.dc), rolls, kept, result]);
    }
    println!("{table}");

    for row in &block.rows {
        if let ControlRow::Note(text) = row {
            println!("  {text}");
        }
    }
    if block.rule_note {
        println!("  {}", RULE_NOTE.italic());
    }
}

fn format_cell(cell: &RollCell) -> Option<String> {
    let value = cell.value?.to_string();
    Some(match cell.mark {
        CellMark::Struck => value.strikethrough().dimmed().to_string(),
        _ => value,
    })
}
