use crate::CoordinatorError;

use blake2::{Blake2b, Digest};
use rand::RngCore;

/// The number of bytes in an artifact content hash.
pub const HASH_LENGTH: usize = 64;

/// Computes the Blake2b hash of the given bytes.
pub fn calculate_hash(data: &[u8]) -> Vec<u8> {
    Blake2b::digest(data).to_vec()
}

///
/// The cryptographic engine capability the coordinator delegates to.
///
/// The coordinator never performs field or curve arithmetic itself; it only
/// sequences these operations and addresses their inputs and outputs. The
/// engine is also the source of truth for content hashes: the coordinator
/// records what the engine reports rather than picking a hash of its own.
///
pub trait Engine: Send + Sync {
    /// Transforms the public parameters into the phase1 artifact, binding
    /// the given beacon round.
    fn import_phase1(&self, parameters: &[u8], beacon_round: u64) -> Result<Vec<u8>, CoordinatorError>;

    /// Produces the phase2 base artifact and the auxiliary evaluation data
    /// for the given circuit.
    fn init_phase2(
        &self,
        phase1: &[u8],
        circuit: &[u8],
        beacon_round: u64,
    ) -> Result<(Vec<u8>, Vec<u8>), CoordinatorError>;

    /// Applies one fresh contribution to the prior artifact, returning the
    /// new artifact and its content hash.
    fn contribute(&self, prior: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CoordinatorError>;

    /// Returns `true` if `current` is a valid transformation of `prior`.
    fn verify_link(&self, prior: &[u8], current: &[u8]) -> Result<bool, CoordinatorError>;

    /// Derives the proving and verifying key pair from the fully verified
    /// final artifact, mixing in the closing beacon round.
    fn extract_keys(
        &self,
        phase1: &[u8],
        final_phase2: &[u8],
        evaluations: &[u8],
        circuit: &[u8],
        beacon_round: u64,
    ) -> Result<(Vec<u8>, Vec<u8>), CoordinatorError>;

    /// Returns the content hash of the given artifact bytes.
    fn content_hash(&self, data: &[u8]) -> Vec<u8> {
        calculate_hash(data)
    }
}

///
/// An engine that models the ceremony transcript as a Blake2b hash chain:
/// every artifact opens with the digest of its predecessor, followed by the
/// contributor's fresh randomness.
///
/// This gives operators a full end-to-end rehearsal of the coordination
/// protocol, tamper detection included, without the production curve
/// arithmetic behind it.
///
#[derive(Debug, Default)]
pub struct HashChainEngine;

impl HashChainEngine {
    pub fn new() -> Self {
        Self
    }
}

impl Engine for HashChainEngine {
    fn import_phase1(&self, parameters: &[u8], beacon_round: u64) -> Result<Vec<u8>, CoordinatorError> {
        let mut artifact = b"ph1".to_vec();
        artifact.extend_from_slice(&beacon_round.to_le_bytes());
        artifact.extend_from_slice(&calculate_hash(parameters));
        Ok(artifact)
    }

    fn init_phase2(
        &self,
        phase1: &[u8],
        circuit: &[u8],
        beacon_round: u64,
    ) -> Result<(Vec<u8>, Vec<u8>), CoordinatorError> {
        let mut preimage = phase1.to_vec();
        preimage.extend_from_slice(circuit);
        preimage.extend_from_slice(&beacon_round.to_le_bytes());

        let mut base = b"ph2".to_vec();
        base.extend_from_slice(&calculate_hash(&preimage));

        let mut evaluations = b"evl".to_vec();
        evaluations.extend_from_slice(&calculate_hash(circuit));

        Ok((base, evaluations))
    }

    fn contribute(&self, prior: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CoordinatorError> {
        // The new artifact commits to the digest of the one it consumed,
        // then appends the contributor's fresh randomness.
        let mut artifact = calculate_hash(prior);
        let mut randomness = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut randomness);
        artifact.extend_from_slice(&randomness);

        let hash = calculate_hash(&artifact);
        Ok((artifact, hash))
    }

    fn verify_link(&self, prior: &[u8], current: &[u8]) -> Result<bool, CoordinatorError> {
        if current.len() < HASH_LENGTH {
            return Ok(false);
        }
        Ok(current[..HASH_LENGTH] == calculate_hash(prior)[..])
    }

    fn extract_keys(
        &self,
        phase1: &[u8],
        final_phase2: &[u8],
        evaluations: &[u8],
        circuit: &[u8],
        beacon_round: u64,
    ) -> Result<(Vec<u8>, Vec<u8>), CoordinatorError> {
        let mut preimage = phase1.to_vec();
        preimage.extend_from_slice(final_phase2);
        preimage.extend_from_slice(evaluations);
        preimage.extend_from_slice(circuit);
        preimage.extend_from_slice(&beacon_round.to_le_bytes());

        let mut proving_key = b"pk".to_vec();
        proving_key.extend_from_slice(&calculate_hash(&preimage));

        preimage.extend_from_slice(b"vk");
        let mut verifying_key = b"vk".to_vec();
        verifying_key.extend_from_slice(&calculate_hash(&preimage));

        Ok((proving_key, verifying_key))
    }
}
