use crate::{
    engine::{Engine, HashChainEngine},
    environment::{Deployment, Environment, Parameters},
    parameters::ParameterSource,
    CoordinatorError,
};

use once_cell::sync::Lazy;
use std::{
    path::PathBuf,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

static TRACING: Lazy<()> = Lazy::new(|| {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init()
        .ok();
});

fn test_base_directory(name: &str) -> PathBuf {
    std::env::temp_dir().join("phase2-coordinator-tests").join(name)
}

///
/// Creates a fresh test environment under a dedicated temporary directory,
/// clearing any artifacts a previous test run left behind.
///
/// Resumability tests clone the returned environment instead of calling
/// this again, since a second call wipes the ceremony directory.
///
pub fn test_environment(name: &str, contributions: u64) -> Environment {
    Lazy::force(&TRACING);
    let base_directory = test_base_directory(name);
    std::fs::remove_dir_all(&base_directory).ok();
    std::fs::create_dir_all(&base_directory).expect("unable to create the test base directory");

    let parameters = Parameters {
        circuit: base_directory.join("circuit.r1cs"),
        contributions,
        power: 9,
        phase1_beacon_round: 1000,
        phase2_beacon_round: 2000,
    };
    Environment::new(Deployment::Testing, parameters, "test-ceremony", base_directory)
        .expect("test environment parameters are valid")
}

/// Returns a parameter source whose fetcher synthesizes deterministic bytes
/// for any power, standing in for the published powers-of-tau archive.
pub fn test_parameter_source(environment: &Environment) -> ParameterSource {
    let fetcher = |power: usize| -> Result<Vec<u8>, CoordinatorError> { Ok(format!("ptau-{}", power).into_bytes()) };
    ParameterSource::new(environment, Box::new(fetcher))
}

/// Writes a small circuit description at the environment's circuit path.
pub fn write_test_circuit(environment: &Environment) {
    std::fs::write(environment.circuit(), b"test-circuit-r1cs").expect("unable to write the test circuit");
}

/// Per-operation invocation counters for a [`CountingEngine`].
#[derive(Debug, Default)]
pub struct EngineCalls {
    pub import_phase1: AtomicUsize,
    pub init_phase2: AtomicUsize,
    pub contribute: AtomicUsize,
    pub verify_link: AtomicUsize,
    pub extract_keys: AtomicUsize,
}

impl EngineCalls {
    pub fn total(&self) -> usize {
        self.import_phase1.load(Ordering::SeqCst)
            + self.init_phase2.load(Ordering::SeqCst)
            + self.contribute.load(Ordering::SeqCst)
            + self.verify_link.load(Ordering::SeqCst)
            + self.extract_keys.load(Ordering::SeqCst)
    }
}

///
/// An engine wrapper counting every delegated invocation, used to assert
/// that idempotent steps and rejected configurations never reach the
/// engine.
///
pub struct CountingEngine {
    inner: HashChainEngine,
    pub calls: Arc<EngineCalls>,
}

impl CountingEngine {
    pub fn new() -> (Self, Arc<EngineCalls>) {
        let calls = Arc::new(EngineCalls::default());
        (
            Self {
                inner: HashChainEngine::new(),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl Engine for CountingEngine {
    fn import_phase1(&self, parameters: &[u8], beacon_round: u64) -> Result<Vec<u8>, CoordinatorError> {
        self.calls.import_phase1.fetch_add(1, Ordering::SeqCst);
        self.inner.import_phase1(parameters, beacon_round)
    }

    fn init_phase2(
        &self,
        phase1: &[u8],
        circuit: &[u8],
        beacon_round: u64,
    ) -> Result<(Vec<u8>, Vec<u8>), CoordinatorError> {
        self.calls.init_phase2.fetch_add(1, Ordering::SeqCst);
        self.inner.init_phase2(phase1, circuit, beacon_round)
    }

    fn contribute(&self, prior: &[u8]) -> Result<(Vec<u8>, Vec<u8>), CoordinatorError> {
        self.calls.contribute.fetch_add(1, Ordering::SeqCst);
        self.inner.contribute(prior)
    }

    fn verify_link(&self, prior: &[u8], current: &[u8]) -> Result<bool, CoordinatorError> {
        self.calls.verify_link.fetch_add(1, Ordering::SeqCst);
        self.inner.verify_link(prior, current)
    }

    fn extract_keys(
        &self,
        phase1: &[u8],
        final_phase2: &[u8],
        evaluations: &[u8],
        circuit: &[u8],
        beacon_round: u64,
    ) -> Result<(Vec<u8>, Vec<u8>), CoordinatorError> {
        self.calls.extract_keys.fetch_add(1, Ordering::SeqCst);
        self.inner.extract_keys(phase1, final_phase2, evaluations, circuit, beacon_round)
    }
}
