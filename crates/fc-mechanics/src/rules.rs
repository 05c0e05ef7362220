//! DC rule engine.
//!
//! Two fixed tables map conditions to DCs: one for conditions on the acting
//! creature (it cannot see well), one for conditions on the target (it
//! cannot be seen well). Each side folds its conditions down to the single
//! highest-DC entry, then the higher side wins. On a tie the origin wins.
//!
//! An active visibility provider overrides the tables completely.

use fc_core::condition::capitalize;
use fc_core::{Actor, CheckDescriptor, Condition, Scene, Token};

use crate::provider::{Affects, ProviderStatus, VisibilityProvider};

/// A row of a condition→DC table.
pub trait DcTable: Copy {
    /// Look up a condition slug in the table.
    fn from_slug(slug: &str) -> Option<Self>;
    /// The DC this condition imposes.
    fn dc(self) -> u32;
    /// The condition's slug.
    fn slug(self) -> &'static str;
}

/// Conditions on the acting creature that impose a flat check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OriginCondition {
    /// DC 5.
    Dazzled,
    /// DC 11.
    Blinded,
}

impl DcTable for OriginCondition {
    fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "dazzled" => Some(Self::Dazzled),
            "blinded" => Some(Self::Blinded),
            _ => None,
        }
    }

    fn dc(self) -> u32 {
        match self {
            Self::Dazzled => 5,
            Self::Blinded => 11,
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Dazzled => "dazzled",
            Self::Blinded => "blinded",
        }
    }
}

/// Conditions on a target that impose a flat check on those acting against it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetCondition {
    /// DC 5.
    Concealed,
    /// DC 11.
    Hidden,
    /// DC 11.
    Invisible,
    /// DC 11.
    Undetected,
    /// DC 11.
    Unnoticed,
}

impl DcTable for TargetCondition {
    fn from_slug(slug: &str) -> Option<Self> {
        match slug {
            "concealed" => Some(Self::Concealed),
            "hidden" => Some(Self::Hidden),
            "invisible" => Some(Self::Invisible),
            "undetected" => Some(Self::Undetected),
            "unnoticed" => Some(Self::Unnoticed),
            _ => None,
        }
    }

    fn dc(self) -> u32 {
        match self {
            Self::Concealed => 5,
            Self::Hidden | Self::Invisible | Self::Undetected | Self::Unnoticed => 11,
        }
    }

    fn slug(self) -> &'static str {
        match self {
            Self::Concealed => "concealed",
            Self::Hidden => "hidden",
            Self::Invisible => "invisible",
            Self::Undetected => "undetected",
            Self::Unnoticed => "unnoticed",
        }
    }
}

/// The highest-DC table entry among `conditions`. The first one seen wins ties.
pub fn strongest<T: DcTable>(conditions: &[Condition]) -> Option<T> {
    conditions
        .iter()
        .filter_map(|c| T::from_slug(&c.slug))
        .fold(None, |best, next| match best {
            Some(b) if b.dc() >= next.dc() => Some(b),
            _ => Some(next),
        })
}

/// Apply the built-in tables to the two sides' conditions.
pub fn table_requirement(origin: &[Condition], target: &[Condition]) -> Option<CheckDescriptor> {
    let origin = strongest::<OriginCondition>(origin);
    let target = strongest::<TargetCondition>(target);

    match (origin, target) {
        (None, None) => None,
        (Some(o), Some(t)) if o.dc() < t.dc() => Some(describe(t)),
        (Some(o), _) => Some(describe(o)),
        (None, Some(t)) => Some(describe(t)),
    }
}

fn describe<T: DcTable>(row: T) -> CheckDescriptor {
    CheckDescriptor::new(capitalize(row.slug()), row.dc())
}

/// The flat check `origin` must roll to affect `target`, if any.
///
/// Defers to `provider` when it is active and supports DC queries;
/// otherwise falls back to [`table_requirement`].
pub fn requirement_for(
    scene: &Scene,
    origin: &Actor,
    target: &Token,
    provider: Option<&dyn VisibilityProvider>,
) -> Option<CheckDescriptor> {
    requirement_from(scene, Some(origin), target, provider)
}

/// Like [`requirement_for`], for when the acting creature may be unknown.
///
/// Without an origin the provider is asked with no origin token and the
/// tables see no origin conditions.
pub fn requirement_from(
    scene: &Scene,
    origin: Option<&Actor>,
    target: &Token,
    provider: Option<&dyn VisibilityProvider>,
) -> Option<CheckDescriptor> {
    if let Some(p) = provider.filter(|p| ProviderStatus::probe(Some(*p)).is_usable()) {
        let origin_token = origin.and_then(|a| scene.token_of(a.id));
        let label = p.visibility_label(target, origin_token, Affects::Target);
        let dc = p.flat_check_dc(origin_token, target);
        if dc == 0 {
            return None;
        }
        let descriptor = CheckDescriptor::new(capitalize(&label), dc);
        return Some(match p.description(origin_token, target) {
            Some(note) => descriptor.with_description(note),
            None => descriptor,
        });
    }

    let origin_conditions = origin.map(|a| a.conditions.as_slice()).unwrap_or_default();
    let target_conditions = scene
        .actor_of(target)
        .map(|a| a.conditions.as_slice())
        .unwrap_or_default();
    table_requirement(origin_conditions, target_conditions)
}
