use crate::{
    engine::Engine,
    environment::Environment,
    objects::{Locator, Transcript},
    storage::ObjectStore,
    CoordinatorError,
};

use tracing::info;

pub(crate) struct Extraction;

impl Extraction {
    ///
    /// Derives the proving and verifying key pair from the final, fully
    /// verified phase2 artifact, closing the ceremony with the phase2
    /// beacon round.
    ///
    /// Requires both beacon rounds to be positive and the entire chain to
    /// have verified, and writes the key pair exactly once.
    ///
    pub(crate) fn run(
        environment: &Environment,
        storage: &dyn ObjectStore,
        engine: &dyn Engine,
        transcript: &Transcript,
    ) -> Result<(), CoordinatorError> {
        if environment.phase1_beacon_round() == 0 || environment.phase2_beacon_round() == 0 {
            return Err(CoordinatorError::ConfigError(
                "key extraction requires positive phase1 and phase2 beacon rounds".to_string(),
            ));
        }

        if storage.exists(&Locator::ProvingKey) && storage.exists(&Locator::VerifyingKey) {
            info!("key pair already exists, skipping extraction");
            return Ok(());
        }

        let expected = environment.number_of_contributions();
        let final_index = expected - 1;
        if transcript.verified_through() != Some(final_index) {
            return Err(CoordinatorError::ChainIncomplete {
                verified_through: transcript.verified_through(),
                expected,
            });
        }

        let phase1 = storage.get(&Locator::Phase1)?;
        let final_phase2 = storage.get(&Locator::Phase2Contribution(final_index))?;
        let evaluations = storage.get(&Locator::Evaluations)?;
        let circuit = fs_err::read(environment.circuit())?;

        info!("extracting keys from {}", Locator::Phase2Contribution(final_index));
        let (proving_key, verifying_key) = engine.extract_keys(
            &phase1,
            &final_phase2,
            &evaluations,
            &circuit,
            environment.phase2_beacon_round(),
        )?;

        storage.put(&Locator::ProvingKey, &proving_key)?;
        storage.put(&Locator::VerifyingKey, &verifying_key)?;
        info!("key extraction complete");
        Ok(())
    }
}
