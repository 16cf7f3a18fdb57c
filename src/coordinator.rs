use crate::{
    commands::{Computation, Extraction, Grants, Initialization, Verification},
    engine::Engine,
    environment::Environment,
    objects::{AccessGrant, ContributionRecord, Locator, Transcript},
    parameters::ParameterSource,
    storage::ObjectStore,
};

use std::{thread, time::Instant};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Debug, Error)]
pub enum CoordinatorError {
    #[error("ConfigError: {0}")]
    ConfigError(String),
    #[error("AccessError: {0}")]
    AccessError(String),
    #[error("ContributionError at index {index}: {message}")]
    ContributionError { index: u64, message: String },
    #[error("VerificationFailure at index {index}: {current} is not a valid transformation of {previous}")]
    VerificationFailure {
        index: u64,
        current: String,
        previous: String,
    },
    #[error("verification of index {index} is out of order, chain is verified through {verified_through:?}")]
    VerificationOutOfOrder {
        index: u64,
        verified_through: Option<u64>,
    },
    #[error("storage did not become ready within {elapsed:?}")]
    ReadinessTimeout { elapsed: std::time::Duration },
    #[error("object {0} already exists and is immutable")]
    ObjectExists(Locator),
    #[error("object {0} does not exist")]
    ObjectMissing(Locator),
    #[error("contribution {index} diverged from its record: recorded hash {recorded}, observed {observed}")]
    ContributionDiverged {
        index: u64,
        recorded: String,
        observed: String,
    },
    #[error("contribution {index} reused the hash recorded for contribution {prior_index}")]
    ContributionHashReused { index: u64, prior_index: u64 },
    #[error("chain is verified through {verified_through:?} but {expected} contributions must verify before extraction")]
    ChainIncomplete {
        verified_through: Option<u64>,
        expected: u64,
    },
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),
    #[error("JsonError: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// The observable position of a ceremony in its forward-only lifecycle,
/// derived entirely from which artifacts exist in storage.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum CeremonyState {
    NotStarted,
    Phase1Imported,
    Phase2Initialized,
    Contributing(u64),
    Verifying(u64),
    KeysExtracted,
}

///
/// The ceremony coordinator: sequences phase transitions, contributions,
/// chain verification, and key extraction for one ceremony run.
///
/// The coordinator keeps no authoritative in-memory state. Every idempotency
/// decision asks whether the artifact already exists at its canonical
/// locator, so a killed-and-restarted coordinator resumes safely from the
/// first missing artifact, and artifacts already produced survive any
/// failure for a future resumed run.
///
pub struct Coordinator {
    environment: Environment,
    storage: Box<dyn ObjectStore>,
    engine: Box<dyn Engine>,
}

impl Coordinator {
    /// Creates a new instance of the `Coordinator`.
    #[inline]
    pub fn new(environment: Environment, storage: Box<dyn ObjectStore>, engine: Box<dyn Engine>) -> Self {
        Self {
            environment,
            storage,
            engine,
        }
    }

    /// Returns a reference to the environment of this coordinator.
    #[inline]
    pub fn environment(&self) -> &Environment {
        &self.environment
    }

    ///
    /// Blocks until the storage backend reports ready, polling at the
    /// environment's interval, and fails with a `ReadinessTimeout` carrying
    /// the elapsed time once the bounded wait expires.
    ///
    pub fn wait_ready(&self) -> Result<(), CoordinatorError> {
        let started = Instant::now();
        loop {
            if self.storage.is_ready() {
                return Ok(());
            }
            if started.elapsed() >= self.environment.readiness_timeout() {
                return Err(CoordinatorError::ReadinessTimeout {
                    elapsed: started.elapsed(),
                });
            }
            warn!("storage is not ready yet, polling again");
            thread::sleep(self.environment.readiness_poll());
        }
    }

    /// Imports the public parameters into the phase1 artifact. No-op if the
    /// artifact already exists.
    pub fn import_phase1(&self, source: &ParameterSource) -> Result<(), CoordinatorError> {
        Initialization::import_phase1(&self.environment, &*self.storage, &*self.engine, source)
    }

    /// Initializes the phase2 base artifact and evaluation data. No-op if
    /// the base artifact already exists.
    pub fn init_phase2(&self) -> Result<(), CoordinatorError> {
        Initialization::init_phase2(&self.environment, &*self.storage, &*self.engine)
    }

    /// Issues one access grant per expected contribution, indices
    /// `0..count-1`.
    pub fn issue_grants(&self, count: u64) -> Result<Vec<AccessGrant>, CoordinatorError> {
        Grants::issue(&self.environment, &*self.storage, count)
    }

    /// Issues a fresh grant for a single contribution index, e.g. after the
    /// original grant expired mid-contribution.
    pub fn issue_grant(&self, index: u64) -> Result<AccessGrant, CoordinatorError> {
        Grants::issue_one(&self.environment, &*self.storage, index)
    }

    ///
    /// Runs one contribution against the given grant and records the result
    /// in the persisted transcript.
    ///
    pub fn contribute(&self, grant: &AccessGrant) -> Result<ContributionRecord, CoordinatorError> {
        let mut transcript = self.storage.load_transcript()?;
        let record = Computation::run(&*self.storage, &*self.engine, grant)?;
        transcript.record_contribution(record.clone())?;
        self.storage.save_transcript(&transcript)?;
        Ok(record)
    }

    ///
    /// Verifies one link of the contribution chain, in strict ascending
    /// order, persisting the outcome before surfacing any failure.
    ///
    pub fn verify(&self, index: u64) -> Result<(), CoordinatorError> {
        let mut transcript = self.storage.load_transcript()?;
        let result = Verification::run(&*self.storage, &*self.engine, &mut transcript, index);
        self.storage.save_transcript(&transcript)?;
        result
    }

    ///
    /// Walks the entire verification chain from index 0, halting at the
    /// first invalid link. Artifacts are immutable, so the walk is always
    /// safe to recompute in full.
    ///
    pub fn verify_chain(&self) -> Result<(), CoordinatorError> {
        for index in 0..self.environment.number_of_contributions() {
            self.verify(index)?;
        }
        Ok(())
    }

    ///
    /// Extracts the proving and verifying key pair, re-walking the full
    /// verification chain first rather than trusting a possibly stale
    /// transcript watermark.
    ///
    pub fn extract_keys(&self) -> Result<(), CoordinatorError> {
        if self.storage.exists(&Locator::ProvingKey) && self.storage.exists(&Locator::VerifyingKey) {
            info!("key pair already exists, skipping extraction");
            return Ok(());
        }
        if self.environment.phase1_beacon_round() == 0 || self.environment.phase2_beacon_round() == 0 {
            return Err(CoordinatorError::ConfigError(
                "key extraction requires positive phase1 and phase2 beacon rounds".to_string(),
            ));
        }
        self.verify_chain()?;
        let transcript = self.storage.load_transcript()?;
        Extraction::run(&self.environment, &*self.storage, &*self.engine, &transcript)
    }

    ///
    /// Drives the full ceremony end to end: readiness wait, phase1 import,
    /// phase2 initialization, N sequential contributions, full chain
    /// verification, and key extraction. Every step already completed by a
    /// previous run is skipped.
    ///
    pub fn run(&self, source: &ParameterSource) -> Result<(), CoordinatorError> {
        self.wait_ready()?;
        self.import_phase1(source)?;
        self.init_phase2()?;

        let expected = self.environment.number_of_contributions();
        for grant in self.issue_grants(expected)? {
            self.contribute(&grant)?;
        }

        self.verify_chain()?;
        self.extract_keys()?;
        info!("ceremony complete");
        Ok(())
    }

    /// Returns the current ceremony state, derived from artifact existence.
    pub fn current_state(&self) -> Result<CeremonyState, CoordinatorError> {
        if self.storage.exists(&Locator::ProvingKey) && self.storage.exists(&Locator::VerifyingKey) {
            return Ok(CeremonyState::KeysExtracted);
        }
        if !self.storage.exists(&Locator::Phase1) {
            return Ok(CeremonyState::NotStarted);
        }
        if !self.storage.exists(&Locator::Phase2Base) {
            return Ok(CeremonyState::Phase1Imported);
        }

        let expected = self.environment.number_of_contributions();
        for index in 0..expected {
            if !self.storage.exists(&Locator::Phase2Contribution(index)) {
                return Ok(match index {
                    0 => CeremonyState::Phase2Initialized,
                    _ => CeremonyState::Contributing(index),
                });
            }
        }

        let transcript = self.storage.load_transcript()?;
        let next = transcript.verified_through().map(|through| through + 1).unwrap_or(0);
        Ok(CeremonyState::Verifying(next.min(expected - 1)))
    }

    /// Returns the persisted ceremony transcript.
    pub fn transcript(&self) -> Result<Transcript, CoordinatorError> {
        self.storage.load_transcript()
    }
}
