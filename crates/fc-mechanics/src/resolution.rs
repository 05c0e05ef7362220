//! Outcome of a flat check: the d20 total meets the DC or it does not.

use serde::{Deserialize, Serialize};

/// The outcome of resolving a flat check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlatOutcome {
    /// The total met or exceeded the DC.
    Success,
    /// The total was below the DC.
    Failure,
}

impl FlatOutcome {
    /// Resolve a total against a DC.
    pub fn resolve(total: u32, dc: u32) -> Self {
        if total >= dc {
            Self::Success
        } else {
            Self::Failure
        }
    }

    /// Returns true for [`FlatOutcome::Success`].
    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl std::fmt::Display for FlatOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::Failure => write!(f, "failure"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meeting_the_dc_succeeds() {
        assert_eq!(FlatOutcome::resolve(5, 5), FlatOutcome::Success);
        assert_eq!(FlatOutcome::resolve(20, 11), FlatOutcome::Success);
    }

    #[test]
    fn below_the_dc_fails() {
        assert_eq!(FlatOutcome::resolve(4, 5), FlatOutcome::Failure);
        assert!(!FlatOutcome::resolve(10, 11).is_success());
    }

    #[test]
    fn display() {
        assert_eq!(FlatOutcome::Success.to_string(), "success");
        assert_eq!(FlatOutcome::Failure.to_string(), "failure");
    }
}
