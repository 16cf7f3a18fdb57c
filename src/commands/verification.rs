use crate::{
    engine::Engine,
    objects::{Locator, Transcript},
    storage::ObjectStore,
    CoordinatorError,
};

use tracing::{error, info};

pub(crate) struct Verification;

impl Verification {
    ///
    /// Verifies that the artifact at `index` is a valid transformation of
    /// its predecessor, and that it still matches its recorded content hash.
    ///
    /// Indices must be walked in strict ascending order; an out-of-order
    /// invocation is rejected as a sequencing violation before any artifact
    /// is touched, independent of cryptographic validity. The outcome is
    /// appended to the transcript either way, so a failure is persisted for
    /// audit before it halts the ceremony.
    ///
    pub(crate) fn run(
        storage: &dyn ObjectStore,
        engine: &dyn Engine,
        transcript: &mut Transcript,
        index: u64,
    ) -> Result<(), CoordinatorError> {
        if !transcript.is_in_order(index) {
            return Err(CoordinatorError::VerificationOutOfOrder {
                index,
                verified_through: transcript.verified_through(),
            });
        }

        let current_locator = Locator::Phase2Contribution(index);
        let previous_locator = match index {
            0 => Locator::Phase2Base,
            _ => Locator::Phase2Contribution(index - 1),
        };
        info!("verifying {} against {}", current_locator, previous_locator);

        let previous = storage.get(&previous_locator)?;
        let current = storage.get(&current_locator)?;

        // The artifact must still be the bytes the sequencer recorded.
        let matches_record = match transcript.contribution(index) {
            Some(record) => record.contribution_hash() == hex::encode(engine.content_hash(&current)),
            None => true,
        };

        let valid = matches_record && engine.verify_link(&previous, &current)?;
        transcript.record_verification(index, valid)?;

        if !valid {
            error!("verification of contribution {} failed", index);
            return Err(CoordinatorError::VerificationFailure {
                index,
                current: current_locator.object_name(),
                previous: previous_locator.object_name(),
            });
        }

        info!("contribution {} verified", index);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        commands::{Computation, Grants, Initialization},
        engine::HashChainEngine,
        storage::Disk,
        testing::prelude::*,
    };

    use serial_test::serial;

    fn setup(name: &str, contributions: u64) -> (crate::environment::Environment, Disk, HashChainEngine, Transcript) {
        let environment = test_environment(name, contributions);
        let disk = Disk::load(&environment).unwrap();
        let engine = HashChainEngine::new();
        let source = test_parameter_source(&environment);
        write_test_circuit(&environment);

        Initialization::import_phase1(&environment, &disk, &engine, &source).unwrap();
        Initialization::init_phase2(&environment, &disk, &engine).unwrap();

        let mut transcript = Transcript::new();
        for grant in Grants::issue(&environment, &disk, contributions).unwrap() {
            let record = Computation::run(&disk, &engine, &grant).unwrap();
            transcript.record_contribution(record).unwrap();
        }
        (environment, disk, engine, transcript)
    }

    #[test]
    #[serial]
    fn test_honest_chain_verifies_in_order() {
        let (_environment, disk, engine, mut transcript) = setup("verification-honest-chain", 3);
        for index in 0..3 {
            Verification::run(&disk, &engine, &mut transcript, index).unwrap();
        }
        assert_eq!(Some(2), transcript.verified_through());
    }

    #[test]
    #[serial]
    fn test_out_of_order_verification_is_rejected() {
        let (_environment, disk, engine, mut transcript) = setup("verification-out-of-order", 3);
        // Index 1 before index 0, even though the chain itself is honest.
        let result = Verification::run(&disk, &engine, &mut transcript, 1);
        assert!(matches!(
            result,
            Err(CoordinatorError::VerificationOutOfOrder { index: 1, .. })
        ));
        assert_eq!(None, transcript.verified_through());
    }
}
