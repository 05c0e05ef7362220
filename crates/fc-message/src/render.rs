//! Turn stored flags into the control block shown on a message.
//!
//! [`build_control_block`] is pure: flags and a viewer in, rows out.
//! [`render_message`] is the host boundary; it finds an insertion point in
//! the message markup, inserts the block and binds the click action. It
//! never fails outward; problems are logged and the message renders
//! without controls.

use fc_mechanics::FlatOutcome;

use crate::error::{MessageError, MessageResult};
use crate::flags::{CheckSlotState, FlatCheckFlags, KeepPolicy, SlotKey};
use crate::record::{MessageRecord, Viewer};

/// The click action bound on rendered controls.
pub const ROLL_ACTION: &str = "roll-flatcheck";

/// Tooltip shown when grabbed and stupefied checks appear together.
pub const RULE_NOTE: &str = "If more than one flat check would ever cause or prevent the same \
     thing, just roll once and use the highest DC.";

/// Styling of one roll cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellMark {
    /// A result that does not count.
    Struck,
    /// The live result.
    Outcome(FlatOutcome),
    /// No result yet.
    Neutral,
}

impl CellMark {
    /// CSS class of the cell.
    pub fn class(self) -> &'static str {
        match self {
            Self::Struck => "strikethrough",
            Self::Outcome(FlatOutcome::Success) => "success",
            Self::Outcome(FlatOutcome::Failure) => "failure",
            Self::Neutral => "",
        }
    }
}

/// One of the two result cells of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollCell {
    /// The roll shown, if any.
    pub value: Option<u32>,
    /// How it is styled.
    pub mark: CellMark,
}

/// Mark the two cells of a slot: left is the replaced roll, right the latest.
///
/// After a reroll exactly one cell carries the outcome. On a tie, `high`
/// keeps the newer cell and `low` the older one.
pub fn mark_cells(slot: &CheckSlotState) -> [RollCell; 2] {
    let outcome = |total: u32| CellMark::Outcome(FlatOutcome::resolve(total, slot.dc));
    let mut cells = [
        RollCell {
            value: slot.reroll.map(|r| r.old_roll),
            mark: CellMark::Struck,
        },
        RollCell {
            value: slot.roll,
            mark: CellMark::Neutral,
        },
    ];

    match (slot.reroll, slot.roll) {
        (Some(reroll), Some(roll)) => {
            let newer_is_live = match reroll.keep {
                KeepPolicy::High => roll >= reroll.old_roll,
                KeepPolicy::Low => roll < reroll.old_roll,
                KeepPolicy::Hero | KeepPolicy::New => true,
            };
            if newer_is_live {
                cells[1].mark = outcome(roll);
            } else {
                cells[0].mark = outcome(reroll.old_roll);
                cells[1].mark = CellMark::Struck;
            }
        }
        (_, Some(roll)) => cells[1].mark = outcome(roll),
        (_, None) => {}
    }
    cells
}

/// What the slot's button shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    /// Roll for the first time.
    Roll,
    /// Open the reroll prompt.
    Reroll,
    /// Not clickable by this viewer.
    Hidden,
}

/// A rendered check slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRow {
    /// Slot key, echoed in the click payload.
    pub key: SlotKey,
    /// What imposes the check.
    pub label: String,
    /// Difficulty class.
    pub dc: u32,
    /// Left (replaced) and right (latest) result cells.
    pub cells: [RollCell; 2],
    /// Keep policy of a completed reroll.
    pub keep: Option<KeepPolicy>,
    /// Button state.
    pub button: ButtonState,
}

impl CheckRow {
    fn new(key: SlotKey, slot: &CheckSlotState, viewer: Viewer) -> Self {
        let button = match (slot.is_interactive(viewer.can_modify), slot.roll) {
            (false, _) => ButtonState::Hidden,
            (true, None) => ButtonState::Roll,
            (true, Some(_)) => ButtonState::Reroll,
        };
        Self {
            key,
            label: slot.label.clone(),
            dc: slot.dc,
            cells: mark_cells(slot),
            keep: slot.reroll.map(|r| r.keep),
            button,
        }
    }

    fn to_markup(&self) -> String {
        let cell = |c: &RollCell| {
            let value = c.value.map(|v| v.to_string()).unwrap_or_default();
            format!(r#"<span class="{}">{value}</span>"#, c.mark.class())
        };
        let icon = self
            .keep
            .map(|k| format!(r#"<span class="fc-icon"><i class="{}"></i></span>"#, k.icon()))
            .unwrap_or_default();
        let button_icon = if self.cells[1].value.is_some() {
            "fa-rotate rotate"
        } else {
            "fa-dice-d20 die"
        };
        let button_class = if self.button == ButtonState::Hidden {
            "hidden"
        } else {
            ""
        };
        format!(
            concat!(
                r#"<div class="fc-check">"#,
                r#"<span class="fc-label">{label}</span>"#,
                r#"<span class="fc-dc">DC {dc}</span>"#,
                r#"<span class="fc-roll"><span class="fc-rolls">{left}{right}</span>{icon}</span>"#,
                r#"<button class="{button_class}" data-action="{action}" data-key="{key}" data-dc="{dc}">"#,
                r#"<i class="fa-solid {button_icon}"></i></button>"#,
                "</div>"
            ),
            label = escape(&self.label),
            dc = self.dc,
            left = cell(&self.cells[0]),
            right = cell(&self.cells[1]),
            icon = icon,
            button_class = button_class,
            action = ROLL_ACTION,
            key = self.key,
            button_icon = button_icon,
        )
    }
}

/// A row of the control block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlRow {
    /// An interactive check.
    Check(CheckRow),
    /// An informational line.
    Note(String),
}

/// Everything rendered for one message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ControlBlock {
    /// Rows in display order.
    pub rows: Vec<ControlRow>,
    /// Whether the "roll once" rule note is shown.
    pub rule_note: bool,
}

impl ControlBlock {
    /// Returns true if there is nothing to show.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The interactive rows.
    pub fn check_rows(&self) -> impl Iterator<Item = &CheckRow> {
        self.rows.iter().filter_map(|row| match row {
            ControlRow::Check(check) => Some(check),
            ControlRow::Note(_) => None,
        })
    }

    /// HTML fragment for the block.
    pub fn to_markup(&self) -> String {
        let mut out = String::from(r#"<section class="fc-flatcheck-buttons">"#);
        for row in &self.rows {
            match row {
                ControlRow::Check(check) => out.push_str(&check.to_markup()),
                ControlRow::Note(text) => out.push_str(&format!(
                    r#"<div class="fc-note"><i class="fa-regular fa-circle-question"></i> {}</div>"#,
                    escape(text)
                )),
            }
        }
        if self.rule_note {
            out.push_str(&format!(
                r#"<div class="fc-rule-note"><span data-tooltip="{}"><i class="fa-solid fa-circle-info"></i></span></div>"#,
                escape(RULE_NOTE)
            ));
        }
        out.push_str("</section>");
        out
    }
}

/// Build the control block for `flags` as seen by `viewer`.
pub fn build_control_block(flags: &FlatCheckFlags, viewer: Viewer) -> ControlBlock {
    let mut rows: Vec<ControlRow> = flags
        .slots()
        .map(|(key, slot)| ControlRow::Check(CheckRow::new(key, slot, viewer)))
        .collect();
    if let Some(count) = flags.target_count() {
        rows.push(ControlRow::Note(format!("{count} targets require a flat check")));
    }
    ControlBlock {
        rows,
        rule_note: flags.grabbed.is_some() && flags.stupefied.is_some(),
    }
}

/// A landmark in the message markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// The card's button section.
    CardButtons,
    /// The dice roll block.
    DiceRoll,
    /// The message footer.
    Footer,
    /// The message content.
    MessageContent,
}

/// Where a fragment goes relative to its anchor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// As the anchor's last child.
    Append,
    /// As the anchor's next sibling.
    After,
    /// As the anchor's previous sibling.
    Before,
}

/// An insertion point.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Insertion {
    /// The anchor.
    pub anchor: Anchor,
    /// Placement relative to it.
    pub placement: Placement,
}

/// Insertion points in order of preference.
pub const INSERTION_ORDER: [Insertion; 4] = [
    Insertion {
        anchor: Anchor::CardButtons,
        placement: Placement::Append,
    },
    Insertion {
        anchor: Anchor::DiceRoll,
        placement: Placement::After,
    },
    Insertion {
        anchor: Anchor::Footer,
        placement: Placement::Before,
    },
    Insertion {
        anchor: Anchor::MessageContent,
        placement: Placement::Append,
    },
];

/// The rendered markup of one message, as the host exposes it.
pub trait MessageDom {
    /// Whether the markup contains the anchor.
    fn has(&self, anchor: Anchor) -> bool;
    /// Insert a fragment.
    fn insert(&mut self, at: Insertion, fragment: &str);
    /// Route clicks on elements carrying `data-action = action` to the resolver.
    fn bind_action(&mut self, action: &'static str);
}

/// An in-memory [`MessageDom`] that records what was inserted.
#[derive(Debug, Clone, Default)]
pub struct StaticDom {
    anchors: Vec<Anchor>,
    /// Fragments inserted so far.
    pub inserted: Vec<(Insertion, String)>,
    /// Actions bound so far.
    pub bound: Vec<&'static str>,
}

impl StaticDom {
    /// Markup containing the given anchors.
    pub fn with_anchors(anchors: &[Anchor]) -> Self {
        Self {
            anchors: anchors.to_vec(),
            ..Self::default()
        }
    }
}

impl MessageDom for StaticDom {
    fn has(&self, anchor: Anchor) -> bool {
        self.anchors.contains(&anchor)
    }

    fn insert(&mut self, at: Insertion, fragment: &str) {
        self.inserted.push((at, fragment.to_string()));
    }

    fn bind_action(&mut self, action: &'static str) {
        self.bound.push(action);
    }
}

/// Render the controls for `record` into `dom`.
///
/// Returns where the block was inserted, or `None` if nothing was rendered.
pub fn render_message(
    dom: &mut dyn MessageDom,
    record: &MessageRecord,
    namespace: &str,
    viewer: Viewer,
) -> Option<Insertion> {
    if !record.content_visible {
        return None;
    }
    match try_render(dom, record, namespace, viewer) {
        Ok(at) => at,
        Err(err) => {
            tracing::error!(message = %record.id, %err, "could not render flat check controls");
            None
        }
    }
}

fn try_render(
    dom: &mut dyn MessageDom,
    record: &MessageRecord,
    namespace: &str,
    viewer: Viewer,
) -> MessageResult<Option<Insertion>> {
    let Some(flags) = record.check_flags(namespace) else {
        return Ok(None);
    };
    let block = build_control_block(&flags, viewer);
    if block.is_empty() {
        return Ok(None);
    }
    let at = INSERTION_ORDER
        .into_iter()
        .find(|i| dom.has(i.anchor))
        .ok_or(MessageError::NoInsertionPoint)?;
    dom.insert(at, &block.to_markup());
    dom.bind_action(ROLL_ACTION);
    Ok(Some(at))
}

/// A click on a rendered control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Click {
    /// The slot clicked.
    pub key: SlotKey,
    /// The DC shown on the control.
    pub dc: u32,
}

/// Parse a click payload (`data-action`, `data-key`, `data-dc`).
pub fn parse_click(action: &str, key: &str, dc: &str) -> Option<Click> {
    if action != ROLL_ACTION {
        return None;
    }
    let key = key.parse().ok()?;
    let dc = dc.trim().parse().ok()?;
    Some(Click { key, dc })
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
