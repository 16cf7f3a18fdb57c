use crate::{
    engine::Engine,
    environment::Environment,
    objects::Locator,
    parameters::ParameterSource,
    storage::ObjectStore,
    CoordinatorError,
};

use tracing::info;

pub(crate) struct Initialization;

impl Initialization {
    ///
    /// Imports the public parameters into the phase1 artifact.
    ///
    /// Idempotent: an existing phase1 artifact is treated as a completed
    /// import and the engine is not invoked again.
    ///
    pub(crate) fn import_phase1(
        environment: &Environment,
        storage: &dyn ObjectStore,
        engine: &dyn Engine,
        source: &ParameterSource,
    ) -> Result<(), CoordinatorError> {
        if storage.exists(&Locator::Phase1) {
            info!("phase1 artifact already exists, skipping import");
            return Ok(());
        }

        let beacon_round = environment.phase1_beacon_round();
        if beacon_round == 0 {
            return Err(CoordinatorError::ConfigError(
                "phase1 import requires a positive, previously drawn beacon round".to_string(),
            ));
        }

        info!("importing phase1 for power {}", environment.power());
        let parameters = source.load(environment.power())?;
        let artifact = engine.import_phase1(&parameters, beacon_round)?;
        storage.put(&Locator::Phase1, &artifact)?;
        info!("phase1 import complete");
        Ok(())
    }

    ///
    /// Initializes the phase2 base artifact and the circuit evaluation data.
    ///
    /// Idempotent: an existing base artifact is treated as a completed
    /// initialization and the engine is not invoked again.
    ///
    pub(crate) fn init_phase2(
        environment: &Environment,
        storage: &dyn ObjectStore,
        engine: &dyn Engine,
    ) -> Result<(), CoordinatorError> {
        if storage.exists(&Locator::Phase2Base) {
            info!("phase2 base artifact already exists, skipping initialization");
            return Ok(());
        }

        let beacon_round = environment.phase1_beacon_round();
        if beacon_round == 0 {
            return Err(CoordinatorError::ConfigError(
                "phase2 initialization requires a positive, previously drawn beacon round".to_string(),
            ));
        }

        info!("reading circuit {}", environment.circuit().display());
        let circuit = fs_err::read(environment.circuit())?;
        let phase1 = storage.get(&Locator::Phase1)?;

        info!("initializing phase2");
        let (base, evaluations) = engine.init_phase2(&phase1, &circuit, beacon_round)?;
        storage.put(&Locator::Phase2Base, &base)?;
        storage.put(&Locator::Evaluations, &evaluations)?;
        info!("phase2 initialization complete");
        Ok(())
    }
}
