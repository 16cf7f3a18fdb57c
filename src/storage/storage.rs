use crate::{
    objects::{Access, Capability, Locator, Transcript},
    CoordinatorError,
};

use time::Duration;

///
/// A standard model for the object storage collaborator.
///
/// Objects are immutable once created: `put` is create-only, and a second
/// write to an existing locator is an error, never an overwrite. Partial
/// writes must never become visible to readers.
///
pub trait ObjectStore: Send + Sync {
    /// Returns `true` if an object exists at the given locator.
    fn exists(&self, locator: &Locator) -> bool;

    /// Returns the contents of the object at the given locator.
    fn get(&self, locator: &Locator) -> Result<Vec<u8>, CoordinatorError>;

    /// Creates the object at the given locator. Fails with `ObjectExists`
    /// if an object is already present there.
    fn put(&self, locator: &Locator, data: &[u8]) -> Result<(), CoordinatorError>;

    /// Issues a time-limited capability for the given locator and access
    /// mode. Fails with an `AccessError` if the backend refuses.
    fn issue_capability(
        &self,
        locator: Locator,
        access: Access,
        ttl: Duration,
    ) -> Result<Capability, CoordinatorError>;

    /// Reads the object the given capability is scoped to, enforcing the
    /// capability's scope and expiry.
    fn read_via(&self, capability: &Capability) -> Result<Vec<u8>, CoordinatorError> {
        let locator = capability.locator();
        if !capability.permits(&locator, Access::Read) {
            return Err(CoordinatorError::AccessError(format!(
                "capability {} does not permit reading {}",
                capability.token(),
                locator
            )));
        }
        self.get(&locator)
    }

    /// Writes the object the given capability is scoped to, enforcing the
    /// capability's scope and expiry.
    fn write_via(&self, capability: &Capability, data: &[u8]) -> Result<(), CoordinatorError> {
        let locator = capability.locator();
        if !capability.permits(&locator, Access::Write) {
            return Err(CoordinatorError::AccessError(format!(
                "capability {} does not permit writing {}",
                capability.token(),
                locator
            )));
        }
        self.put(&locator, data)
    }

    /// Loads the persisted ceremony transcript, or an empty transcript if
    /// none has been saved yet.
    fn load_transcript(&self) -> Result<Transcript, CoordinatorError>;

    /// Persists the ceremony transcript, replacing any previous revision.
    fn save_transcript(&self, transcript: &Transcript) -> Result<(), CoordinatorError>;

    /// Returns `true` if the backend is ready to serve requests. The
    /// coordinator polls this with a bounded wait before proceeding.
    fn is_ready(&self) -> bool;
}
