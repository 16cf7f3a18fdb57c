use crate::{environment::Environment, CoordinatorError};

use std::path::PathBuf;
use tracing::{debug, info};

/// Returns the canonical file name of the size-indexed public-parameter
/// file for the given log2 constraint count. Same power, same bytes.
#[inline]
pub fn parameter_file_name(power: usize) -> String {
    format!("powersOfTau28_hez_final_{:02}.ptau", power)
}

/// A producer of public-parameter bytes for a given power, typically an
/// HTTP download from the published powers-of-tau archive.
pub trait ParameterFetcher: Send + Sync {
    fn fetch(&self, power: usize) -> Result<Vec<u8>, CoordinatorError>;
}

impl<F> ParameterFetcher for F
where
    F: Fn(usize) -> Result<Vec<u8>, CoordinatorError> + Send + Sync,
{
    fn fetch(&self, power: usize) -> Result<Vec<u8>, CoordinatorError> {
        self(power)
    }
}

/// A fetcher for air-gapped setups where the parameter file must already
/// have been placed in the local cache by the operator.
pub struct LocalOnlyFetcher;

impl ParameterFetcher for LocalOnlyFetcher {
    fn fetch(&self, power: usize) -> Result<Vec<u8>, CoordinatorError> {
        Err(CoordinatorError::ConfigError(format!(
            "parameter file {} is not cached locally and no downloader is configured",
            parameter_file_name(power)
        )))
    }
}

///
/// The read-only source of public-parameter files, backed by a local cache
/// directory. Loading is idempotent: a file already in the cache is reused
/// byte-for-byte and the fetcher is not consulted again.
///
pub struct ParameterSource {
    directory: PathBuf,
    fetcher: Box<dyn ParameterFetcher>,
}

impl ParameterSource {
    /// Creates a parameter source over the environment's cache directory.
    pub fn new(environment: &Environment, fetcher: Box<dyn ParameterFetcher>) -> Self {
        Self {
            directory: environment.parameter_directory().clone(),
            fetcher,
        }
    }

    /// Returns the path the parameter file for the given power is cached at.
    pub fn cache_path(&self, power: usize) -> PathBuf {
        self.directory.join(parameter_file_name(power))
    }

    ///
    /// Returns the public-parameter bytes for the given power, fetching and
    /// caching them if they are not present yet.
    ///
    pub fn load(&self, power: usize) -> Result<Vec<u8>, CoordinatorError> {
        let path = self.cache_path(power);
        if path.exists() {
            debug!("parameter file {} already cached", path.display());
            return Ok(fs_err::read(&path)?);
        }

        info!("fetching public parameters for power {}", power);
        let data = self.fetcher.fetch(power)?;
        fs_err::create_dir_all(&self.directory)?;
        fs_err::write(&path, &data)?;
        Ok(data)
    }
}
