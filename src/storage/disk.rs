use crate::{
    environment::Environment,
    objects::{Access, Capability, Locator, Transcript},
    storage::ObjectStore,
    CoordinatorError,
};

use std::path::PathBuf;
use time::Duration;
use tracing::trace;

///
/// A local-filesystem object store, mapping the bucket to a directory and
/// each object name to a file within it.
///
/// Writes land in a temporary file and are renamed into place, so a partial
/// write is never visible at an object's canonical location.
///
#[derive(Debug)]
pub struct Disk {
    bucket_directory: PathBuf,
}

impl Disk {
    /// Loads a new instance of `Disk`, creating the bucket directory if it
    /// does not exist yet.
    pub fn load(environment: &Environment) -> Result<Self, CoordinatorError> {
        let bucket_directory = environment.base_directory().join(environment.bucket());
        fs_err::create_dir_all(&bucket_directory)?;
        Ok(Self { bucket_directory })
    }

    fn object_path(&self, locator: &Locator) -> PathBuf {
        self.bucket_directory.join(locator.object_name())
    }

    fn write_atomically(&self, path: &PathBuf, data: &[u8]) -> Result<(), CoordinatorError> {
        let mut staging = path.clone();
        staging.set_extension("partial");
        fs_err::write(&staging, data)?;
        fs_err::rename(&staging, path)?;
        Ok(())
    }
}

impl ObjectStore for Disk {
    fn exists(&self, locator: &Locator) -> bool {
        self.object_path(locator).exists()
    }

    fn get(&self, locator: &Locator) -> Result<Vec<u8>, CoordinatorError> {
        let path = self.object_path(locator);
        if !path.exists() {
            return Err(CoordinatorError::ObjectMissing(*locator));
        }
        Ok(fs_err::read(&path)?)
    }

    fn put(&self, locator: &Locator, data: &[u8]) -> Result<(), CoordinatorError> {
        let path = self.object_path(locator);
        if path.exists() {
            return Err(CoordinatorError::ObjectExists(*locator));
        }
        trace!("writing {} ({} bytes)", locator, data.len());
        self.write_atomically(&path, data)
    }

    fn issue_capability(
        &self,
        locator: Locator,
        access: Access,
        ttl: Duration,
    ) -> Result<Capability, CoordinatorError> {
        Ok(Capability::new(locator, access, ttl))
    }

    fn load_transcript(&self) -> Result<Transcript, CoordinatorError> {
        let path = self.object_path(&Locator::Transcript);
        if !path.exists() {
            return Ok(Transcript::new());
        }
        Ok(serde_json::from_slice(&fs_err::read(&path)?)?)
    }

    fn save_transcript(&self, transcript: &Transcript) -> Result<(), CoordinatorError> {
        let path = self.object_path(&Locator::Transcript);
        self.write_atomically(&path, &serde_json::to_vec_pretty(transcript)?)
    }

    fn is_ready(&self) -> bool {
        self.bucket_directory.exists()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::prelude::*;

    use serial_test::serial;

    #[test]
    #[serial]
    fn test_put_is_create_only() {
        let environment = test_environment("disk-put-create-only", 3);
        let disk = Disk::load(&environment).unwrap();

        disk.put(&Locator::Phase2Base, b"base").unwrap();
        assert!(disk.exists(&Locator::Phase2Base));
        assert_eq!(b"base".to_vec(), disk.get(&Locator::Phase2Base).unwrap());

        // The chain is append-only; a second write is rejected, not applied.
        let result = disk.put(&Locator::Phase2Base, b"tampered");
        assert!(matches!(result, Err(CoordinatorError::ObjectExists(_))));
        assert_eq!(b"base".to_vec(), disk.get(&Locator::Phase2Base).unwrap());
    }

    #[test]
    #[serial]
    fn test_missing_object() {
        let environment = test_environment("disk-missing-object", 3);
        let disk = Disk::load(&environment).unwrap();
        let result = disk.get(&Locator::Phase2Contribution(0));
        assert!(matches!(result, Err(CoordinatorError::ObjectMissing(_))));
    }

    #[test]
    #[serial]
    fn test_capability_scope_and_expiry_are_enforced() {
        let environment = test_environment("disk-capability-scope", 3);
        let disk = Disk::load(&environment).unwrap();
        disk.put(&Locator::Phase2Base, b"base").unwrap();

        let read = disk
            .issue_capability(Locator::Phase2Base, Access::Read, Duration::hours(1))
            .unwrap();
        assert_eq!(b"base".to_vec(), disk.read_via(&read).unwrap());

        // A read capability cannot write.
        let result = disk.write_via(&read, b"data");
        assert!(matches!(result, Err(CoordinatorError::AccessError(_))));

        // An expired capability permits nothing.
        let expired = disk
            .issue_capability(Locator::Phase2Base, Access::Read, Duration::seconds(-1))
            .unwrap();
        let result = disk.read_via(&expired);
        assert!(matches!(result, Err(CoordinatorError::AccessError(_))));
    }

    #[test]
    #[serial]
    fn test_transcript_round_trips() {
        let environment = test_environment("disk-transcript", 3);
        let disk = Disk::load(&environment).unwrap();

        assert_eq!(Transcript::new(), disk.load_transcript().unwrap());

        let mut transcript = Transcript::new();
        transcript
            .record_contribution(crate::objects::ContributionRecord::new(0, "ab".to_string()))
            .unwrap();
        transcript.record_verification(0, true).unwrap();
        disk.save_transcript(&transcript).unwrap();

        assert_eq!(transcript, disk.load_transcript().unwrap());
    }
}
