use crate::{objects::Locator, CoordinatorError};

use serde::{Deserialize, Serialize};
use tracing::trace;

/// The outcome of one contribution, as recorded by the sequencer.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContributionRecord {
    index: u64,
    locator: Locator,
    contribution_hash: String,
    ordinal: u64,
}

impl ContributionRecord {
    /// Creates the record for the contribution at the given 0-based index.
    #[inline]
    pub fn new(index: u64, contribution_hash: String) -> Self {
        Self {
            index,
            locator: Locator::Phase2Contribution(index),
            contribution_hash,
            ordinal: index + 1,
        }
    }

    /// Returns the 0-based contribution index.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns the locator of the produced artifact.
    #[inline]
    pub fn locator(&self) -> Locator {
        self.locator
    }

    /// Returns the hex-encoded content hash reported by the engine.
    #[inline]
    pub fn contribution_hash(&self) -> &str {
        &self.contribution_hash
    }

    /// Returns the 1-based, human-facing contributor ordinal.
    #[inline]
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }
}

/// The outcome of verifying one link of the contribution chain.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationRecord {
    index: u64,
    verified: bool,
}

impl VerificationRecord {
    /// Returns the 0-based contribution index this record covers.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns `true` if the link verified successfully.
    #[inline]
    pub fn is_verified(&self) -> bool {
        self.verified
    }
}

///
/// The persisted record of ceremony progress: which contributions were
/// recorded with which hashes, and how far the verification chain walk
/// has succeeded.
///
/// The transcript is bookkeeping for audit and ordering enforcement only.
/// Idempotency decisions are always made against artifact existence in
/// storage, never against this structure.
///
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    contributions: Vec<ContributionRecord>,
    verifications: Vec<VerificationRecord>,
}

impl Transcript {
    /// Creates an empty transcript.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the recorded contribution at the given index, if any.
    #[inline]
    pub fn contribution(&self, index: u64) -> Option<&ContributionRecord> {
        self.contributions.iter().find(|record| record.index() == index)
    }

    /// Returns all recorded contributions.
    #[inline]
    pub fn contributions(&self) -> &[ContributionRecord] {
        &self.contributions
    }

    ///
    /// Records the outcome of one contribution.
    ///
    /// Recording the same index twice with the same hash is a no-op, so a
    /// resumed run may replay a completed step. A second record for the same
    /// index with a different hash, or the same hash surfacing under two
    /// different indices, is a divergence and is rejected.
    ///
    pub fn record_contribution(&mut self, record: ContributionRecord) -> Result<(), CoordinatorError> {
        if let Some(existing) = self.contribution(record.index()) {
            if existing.contribution_hash() == record.contribution_hash() {
                trace!("contribution {} already recorded", record.index());
                return Ok(());
            }
            return Err(CoordinatorError::ContributionDiverged {
                index: record.index(),
                recorded: existing.contribution_hash().to_string(),
                observed: record.contribution_hash().to_string(),
            });
        }
        if let Some(clash) = self
            .contributions
            .iter()
            .find(|existing| existing.contribution_hash() == record.contribution_hash())
        {
            return Err(CoordinatorError::ContributionHashReused {
                index: record.index(),
                prior_index: clash.index(),
            });
        }
        self.contributions.push(record);
        self.contributions.sort_by_key(|record| record.index());
        Ok(())
    }

    /// Returns the highest index through which the chain has verified
    /// successfully, starting contiguously from index 0. Otherwise returns
    /// `None`.
    pub fn verified_through(&self) -> Option<u64> {
        let mut through = None;
        for (position, record) in self.verifications.iter().enumerate() {
            if record.index() != position as u64 || !record.is_verified() {
                break;
            }
            through = Some(record.index());
        }
        through
    }

    /// Returns `true` if verifying the given index now would respect the
    /// strict ascending order of the chain walk. Re-verifying an already
    /// verified index is always in order, since artifacts are immutable.
    #[inline]
    pub fn is_in_order(&self, index: u64) -> bool {
        let next = self.verified_through().map(|through| through + 1).unwrap_or(0);
        index <= next
    }

    ///
    /// Records the outcome of verifying one chain link.
    ///
    /// The index must be in order per [`Transcript::is_in_order`]; an
    /// out-of-order record is a sequencing violation independent of the
    /// cryptographic outcome.
    ///
    pub fn record_verification(&mut self, index: u64, verified: bool) -> Result<(), CoordinatorError> {
        if !self.is_in_order(index) {
            return Err(CoordinatorError::VerificationOutOfOrder {
                index,
                verified_through: self.verified_through(),
            });
        }
        match self.verifications.iter().position(|record| record.index() == index) {
            Some(position) => self.verifications[position].verified = verified,
            None => self.verifications.push(VerificationRecord { index, verified }),
        }
        self.verifications.sort_by_key(|record| record.index());
        Ok(())
    }
}
