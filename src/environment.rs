use crate::CoordinatorError;

use std::{path::PathBuf, time::Duration as PollDuration};
use time::Duration;

/// The ceremony-specific knobs, fixed for the lifetime of one ceremony.
#[derive(Debug, Clone)]
pub struct Parameters {
    /// Path to the circuit description consumed by phase2 initialization.
    pub circuit: PathBuf,
    /// The expected number of contributions N.
    pub contributions: u64,
    /// The log2 constraint count selecting the public-parameter file.
    /// Changing it invalidates every downstream artifact.
    pub power: usize,
    /// The drand round binding phase1 finalization. Zero means unset.
    pub phase1_beacon_round: u64,
    /// The drand round binding phase2 finalization. Zero means unset.
    pub phase2_beacon_round: u64,
}

/// The deployment flavor, selecting grant lifetimes and readiness bounds.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum Deployment {
    Testing,
    Development,
    Production,
}

impl std::str::FromStr for Deployment {
    type Err = String;

    fn from_str(src: &str) -> Result<Self, Self::Err> {
        match src.to_lowercase().as_str() {
            "testing" => Ok(Deployment::Testing),
            "development" => Ok(Deployment::Development),
            "production" => Ok(Deployment::Production),
            _ => Err("unsupported deployment. Currently supported: testing, development, production".to_string()),
        }
    }
}

impl Deployment {
    /// Returns the lifetime of issued access capabilities.
    #[inline]
    pub fn grant_ttl(&self) -> Duration {
        match self {
            Deployment::Testing => Duration::hours(1),
            Deployment::Development => Duration::days(1),
            // The original ceremony handed contributors a week per slot.
            Deployment::Production => Duration::days(7),
        }
    }

    /// Returns the bounded wait for the storage backend to become ready.
    #[inline]
    pub fn readiness_timeout(&self) -> PollDuration {
        match self {
            Deployment::Testing => PollDuration::from_secs(5),
            Deployment::Development => PollDuration::from_secs(30),
            Deployment::Production => PollDuration::from_secs(30),
        }
    }

    /// Returns the interval between readiness probes.
    #[inline]
    pub fn readiness_poll(&self) -> PollDuration {
        match self {
            Deployment::Testing => PollDuration::from_millis(50),
            Deployment::Development => PollDuration::from_secs(1),
            Deployment::Production => PollDuration::from_secs(1),
        }
    }
}

///
/// The validated, immutable configuration of one ceremony run, constructed
/// once at startup and passed by reference through the coordinator and its
/// collaborators.
///
#[derive(Debug, Clone)]
pub struct Environment {
    deployment: Deployment,
    parameters: Parameters,
    bucket: String,
    base_directory: PathBuf,
    parameter_directory: PathBuf,
}

impl Environment {
    ///
    /// Creates a new environment, validating the given parameters.
    ///
    /// Fails with a `ConfigError` before any side effect occurs if the
    /// expected contribution count or the power is out of range.
    ///
    pub fn new(
        deployment: Deployment,
        parameters: Parameters,
        bucket: impl Into<String>,
        base_directory: impl Into<PathBuf>,
    ) -> Result<Self, CoordinatorError> {
        if parameters.contributions < 1 {
            return Err(CoordinatorError::ConfigError(
                "expected contribution count must be at least 1".to_string(),
            ));
        }
        if parameters.power < 1 {
            return Err(CoordinatorError::ConfigError(
                "public-parameter power must be at least 1".to_string(),
            ));
        }
        let bucket = bucket.into();
        if bucket.is_empty() {
            return Err(CoordinatorError::ConfigError("bucket identifier is empty".to_string()));
        }
        let base_directory = base_directory.into();
        let parameter_directory = base_directory.join("ptau");
        Ok(Self {
            deployment,
            parameters,
            bucket,
            base_directory,
            parameter_directory,
        })
    }

    /// Returns the deployment flavor.
    #[inline]
    pub fn deployment(&self) -> Deployment {
        self.deployment
    }

    /// Returns the expected number of contributions N.
    #[inline]
    pub fn number_of_contributions(&self) -> u64 {
        self.parameters.contributions
    }

    /// Returns the path to the circuit description.
    #[inline]
    pub fn circuit(&self) -> &PathBuf {
        &self.parameters.circuit
    }

    /// Returns the log2 constraint count.
    #[inline]
    pub fn power(&self) -> usize {
        self.parameters.power
    }

    /// Returns the drand round binding phase1 finalization. Zero means unset.
    #[inline]
    pub fn phase1_beacon_round(&self) -> u64 {
        self.parameters.phase1_beacon_round
    }

    /// Returns the drand round binding phase2 finalization. Zero means unset.
    #[inline]
    pub fn phase2_beacon_round(&self) -> u64 {
        self.parameters.phase2_beacon_round
    }

    /// Returns the storage bucket identifier.
    #[inline]
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Returns the local base directory for this ceremony.
    #[inline]
    pub fn base_directory(&self) -> &PathBuf {
        &self.base_directory
    }

    /// Returns the local cache directory for public-parameter files.
    #[inline]
    pub fn parameter_directory(&self) -> &PathBuf {
        &self.parameter_directory
    }

    /// Returns the lifetime of issued access capabilities.
    #[inline]
    pub fn grant_ttl(&self) -> Duration {
        self.deployment.grant_ttl()
    }

    /// Returns the bounded wait for the storage backend to become ready.
    #[inline]
    pub fn readiness_timeout(&self) -> PollDuration {
        self.deployment.readiness_timeout()
    }

    /// Returns the interval between readiness probes.
    #[inline]
    pub fn readiness_poll(&self) -> PollDuration {
        self.deployment.readiness_poll()
    }
}
