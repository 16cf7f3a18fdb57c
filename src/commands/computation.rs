use crate::{
    engine::Engine,
    objects::{AccessGrant, ContributionRecord, Locator},
    storage::ObjectStore,
    CoordinatorError,
};

use tracing::info;

pub(crate) struct Computation;

impl Computation {
    ///
    /// Runs one contribution against the given access grant: consumes the
    /// predecessor artifact through the grant's read capability, applies the
    /// engine's transformation, and publishes the result through the write
    /// capability.
    ///
    /// Idempotent: if the target artifact already exists, the engine is not
    /// invoked and the record is rebuilt from the stored bytes.
    ///
    pub(crate) fn run(
        storage: &dyn ObjectStore,
        engine: &dyn Engine,
        grant: &AccessGrant,
    ) -> Result<ContributionRecord, CoordinatorError> {
        let index = grant.index();
        let target = Locator::Phase2Contribution(index);

        if storage.exists(&target) {
            info!("contribution {} already exists, skipping", index);
            let existing = storage.get(&target)?;
            return Ok(ContributionRecord::new(index, hex::encode(engine.content_hash(&existing))));
        }

        let source = grant.read().locator();
        if !storage.exists(&source) {
            return Err(CoordinatorError::ContributionError {
                index,
                message: format!("predecessor artifact {} does not exist yet", source),
            });
        }

        info!("downloading predecessor artifact {}", source);
        let prior = storage.read_via(grant.read())?;

        info!("generating contribution {}", index);
        let (artifact, hash) = engine
            .contribute(&prior)
            .map_err(|error| CoordinatorError::ContributionError {
                index,
                message: format!("engine transformation failed: {}", error),
            })?;

        info!("uploading contribution artifact {}", target);
        storage.write_via(grant.write(), &artifact)?;

        let record = ContributionRecord::new(index, hex::encode(hash));
        info!(
            "contribution #{} complete, hash {}",
            record.ordinal(),
            record.contribution_hash()
        );
        Ok(record)
    }
}
