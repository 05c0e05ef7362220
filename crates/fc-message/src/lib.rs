//! Flat check slots attached to chat messages.
//!
//! When a message is created, [`populate`] works out which flat checks the
//! action needs and stores them on the message as [`FlatCheckFlags`]. Every
//! render pass turns those flags into a [`ControlBlock`]; clicking a control
//! drives the [`SlotResolver`], which rolls, offers a reroll policy on the
//! second click, and persists the result through a [`RecordStore`].

pub mod error;
pub mod flags;
pub mod populate;
pub mod prompt;
pub mod record;
pub mod render;
pub mod resolver;
pub mod store;

pub use error::{MessageError, MessageResult};
pub use flags::{CheckSlotState, FlatCheckFlags, KeepPolicy, Reroll, SlotKey, SlotPhase, TargetsSlot};
pub use populate::{populate, prepare_flags, should_show_flat_checks};
pub use prompt::{AcceptDefault, FixedChoice, RerollPrompt, RerollRequest};
pub use record::{ContextType, ItemInfo, ItemKind, MessageRecord, Viewer};
pub use render::{
    Anchor, ButtonState, CellMark, CheckRow, Click, ControlBlock, ControlRow, Insertion, MessageDom,
    Placement, ROLL_ACTION, RollCell, StaticDom, build_control_block, mark_cells, parse_click,
    render_message,
};
pub use resolver::{Activation, IgnoreReason, PendingReroll, SlotResolver, Step};
pub use store::{MemoryStore, RecordStore, SlotUpdate};
