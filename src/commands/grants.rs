use crate::{
    environment::Environment,
    objects::{Access, AccessGrant, Locator},
    storage::ObjectStore,
    CoordinatorError,
};

use tracing::info;

pub(crate) struct Grants;

impl Grants {
    ///
    /// Issues one access grant per expected contribution, indices
    /// `0..count-1`, in order.
    ///
    /// Re-issuing is safe: capabilities already consumed stay consumed, and
    /// a fresh grant for a completed index resolves to a no-op contribution.
    /// Issuing more grants than the ceremony expects is rejected, since the
    /// extra indices could not be verified.
    ///
    pub(crate) fn issue(
        environment: &Environment,
        storage: &dyn ObjectStore,
        count: u64,
    ) -> Result<Vec<AccessGrant>, CoordinatorError> {
        if count < 1 {
            return Err(CoordinatorError::ConfigError(
                "grant issuance requires a positive count".to_string(),
            ));
        }
        if count > environment.number_of_contributions() {
            return Err(CoordinatorError::ConfigError(format!(
                "cannot issue {} grants for a ceremony expecting {} contributions",
                count,
                environment.number_of_contributions()
            )));
        }

        let mut grants = Vec::with_capacity(count as usize);
        for index in 0..count {
            grants.push(Self::issue_one(environment, storage, index)?);
        }

        info!("issued {} access grants for bucket {}", count, environment.bucket());
        Ok(grants)
    }

    ///
    /// Issues a fresh grant for a single contribution index, e.g. after the
    /// original grant expired mid-contribution.
    ///
    pub(crate) fn issue_one(
        environment: &Environment,
        storage: &dyn ObjectStore,
        index: u64,
    ) -> Result<AccessGrant, CoordinatorError> {
        if index >= environment.number_of_contributions() {
            return Err(CoordinatorError::ConfigError(format!(
                "contribution index {} is out of range for a ceremony expecting {} contributions",
                index,
                environment.number_of_contributions()
            )));
        }
        let target = Locator::Phase2Contribution(index);
        let source = match target.predecessor() {
            Some(source) => source,
            None => unreachable!("a phase2 contribution locator always has a predecessor"),
        };
        let ttl = environment.grant_ttl();
        let read = storage.issue_capability(source, Access::Read, ttl)?;
        let write = storage.issue_capability(target, Access::Write, ttl)?;
        AccessGrant::new(index, read, write)
    }
}
