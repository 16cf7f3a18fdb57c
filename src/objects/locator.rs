use serde::{Deserialize, Serialize};

///
/// A canonical address for every object the ceremony produces.
///
/// The mapping from locator to object name is pure and injective, so any
/// party can derive "the artifact produced by contribution i" without a
/// side-channel lookup.
///
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Locator {
    /// The imported phase1 parameters, shared by every circuit.
    Phase1,
    /// The coordinator-initialized phase2 base artifact.
    Phase2Base,
    /// The artifact produced by the contributor at the given 0-based index.
    Phase2Contribution(u64),
    /// The auxiliary circuit evaluation data emitted by phase2 initialization.
    Evaluations,
    /// The final proving key.
    ProvingKey,
    /// The final verifying key.
    VerifyingKey,
    /// The persisted ceremony transcript.
    Transcript,
}

impl Locator {
    /// Returns the canonical object name for this locator.
    #[inline]
    pub fn object_name(&self) -> String {
        match self {
            Locator::Phase1 => "phase1".to_string(),
            Locator::Phase2Base => "phase2".to_string(),
            Locator::Phase2Contribution(index) => format!("phase2-{}", index),
            Locator::Evaluations => "evals".to_string(),
            Locator::ProvingKey => "pk".to_string(),
            Locator::VerifyingKey => "vk".to_string(),
            Locator::Transcript => "transcript".to_string(),
        }
    }

    /// Returns the locator a contribution at this locator must consume,
    /// if this locator is a phase2 contribution. Otherwise returns `None`.
    #[inline]
    pub fn predecessor(&self) -> Option<Locator> {
        match self {
            Locator::Phase2Contribution(0) => Some(Locator::Phase2Base),
            Locator::Phase2Contribution(index) => Some(Locator::Phase2Contribution(index - 1)),
            _ => None,
        }
    }
}

impl std::fmt::Display for Locator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.object_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    #[test]
    fn test_object_names_are_distinct() {
        let mut names = HashSet::new();
        let mut locators = vec![
            Locator::Phase1,
            Locator::Phase2Base,
            Locator::Evaluations,
            Locator::ProvingKey,
            Locator::VerifyingKey,
            Locator::Transcript,
        ];
        for index in 0..32 {
            locators.push(Locator::Phase2Contribution(index));
        }
        for locator in &locators {
            assert!(names.insert(locator.object_name()), "duplicate name {}", locator);
        }
    }

    #[test]
    fn test_contribution_names_match_convention() {
        assert_eq!("phase2", Locator::Phase2Base.object_name());
        assert_eq!("phase2-0", Locator::Phase2Contribution(0).object_name());
        assert_eq!("phase2-12", Locator::Phase2Contribution(12).object_name());
    }

    #[test]
    fn test_predecessor_chain() {
        assert_eq!(
            Some(Locator::Phase2Base),
            Locator::Phase2Contribution(0).predecessor()
        );
        assert_eq!(
            Some(Locator::Phase2Contribution(4)),
            Locator::Phase2Contribution(5).predecessor()
        );
        assert_eq!(None, Locator::Phase2Base.predecessor());
        assert_eq!(None, Locator::Phase1.predecessor());
    }
}
