use crate::objects::Locator;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

/// The access mode a capability authorizes.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Access {
    Read,
    Write,
}

///
/// A self-contained, time-limited capability authorizing one access mode
/// on one object, analogous to a presigned URL.
///
/// The storage backend checks the scope and expiry at the moment of use;
/// holding a capability grants nothing once it has expired.
///
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capability {
    locator: Locator,
    access: Access,
    #[serde(with = "time::serde::rfc3339")]
    expires_at: OffsetDateTime,
    token: String,
}

impl Capability {
    /// Issues a new capability for the given locator and access mode,
    /// expiring `ttl` from now.
    pub fn new(locator: Locator, access: Access, ttl: Duration) -> Self {
        let mut token = [0u8; 16];
        rand::thread_rng().fill_bytes(&mut token);
        Self {
            locator,
            access,
            expires_at: OffsetDateTime::now_utc() + ttl,
            token: hex::encode(token),
        }
    }

    /// Returns the locator this capability is scoped to.
    #[inline]
    pub fn locator(&self) -> Locator {
        self.locator
    }

    /// Returns the access mode this capability authorizes.
    #[inline]
    pub fn access(&self) -> Access {
        self.access
    }

    /// Returns the instant this capability expires.
    #[inline]
    pub fn expires_at(&self) -> OffsetDateTime {
        self.expires_at
    }

    /// Returns `true` if this capability has expired. Otherwise returns `false`.
    #[inline]
    pub fn is_expired(&self) -> bool {
        OffsetDateTime::now_utc() >= self.expires_at
    }

    /// Returns `true` if this capability authorizes the given access mode
    /// on the given locator and has not expired. Otherwise returns `false`.
    #[inline]
    pub fn permits(&self, locator: &Locator, access: Access) -> bool {
        self.locator == *locator && self.access == access && !self.is_expired()
    }

    /// Returns the opaque token identifying this capability.
    #[inline]
    pub fn token(&self) -> &str {
        &self.token
    }
}

///
/// The pair of capabilities handed to the contributor assigned to one
/// contribution index: read access to the artifact they must consume,
/// and write access to the artifact they are expected to produce.
///
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrant {
    index: u64,
    read: Capability,
    write: Capability,
}

impl AccessGrant {
    ///
    /// Assembles the grant for the contributor at the given 0-based index
    /// from two storage-issued capabilities.
    ///
    /// The write capability must be scoped to the artifact this contributor
    /// is expected to produce, and the read capability to the artifact they
    /// must consume; a mis-scoped pair is rejected.
    ///
    pub fn new(index: u64, read: Capability, write: Capability) -> Result<Self, crate::CoordinatorError> {
        let target = Locator::Phase2Contribution(index);
        let source = match target.predecessor() {
            Some(source) => source,
            None => unreachable!("a phase2 contribution locator always has a predecessor"),
        };
        if write.locator() != target || write.access() != Access::Write {
            return Err(crate::CoordinatorError::AccessError(format!(
                "write capability for grant {} is scoped to {} rather than {}",
                index,
                write.locator(),
                target
            )));
        }
        if read.locator() != source || read.access() != Access::Read {
            return Err(crate::CoordinatorError::AccessError(format!(
                "read capability for grant {} is scoped to {} rather than {}",
                index,
                read.locator(),
                source
            )));
        }
        Ok(Self { index, read, write })
    }

    /// Returns the 0-based contribution index this grant is assigned to.
    #[inline]
    pub fn index(&self) -> u64 {
        self.index
    }

    /// Returns the 1-based, human-facing contributor ordinal.
    #[inline]
    pub fn ordinal(&self) -> u64 {
        self.index + 1
    }

    /// Returns the read capability for the predecessor artifact.
    #[inline]
    pub fn read(&self) -> &Capability {
        &self.read
    }

    /// Returns the write capability for the produced artifact.
    #[inline]
    pub fn write(&self) -> &Capability {
        &self.write
    }

    /// Renders the human-readable instruction message handed to the
    /// contributor assigned to this grant.
    pub fn instructions(&self, bucket: &str) -> String {
        format!(
            "Hey, you have been chosen to perform contribution #{ordinal} to the trusted setup!\n\
             \n\
             Download `{source}` from bucket `{bucket}`, apply your contribution, and upload\n\
             the result as `{target}` using the write token below before it expires ({expiry}).\n\
             \n\
               read token:  {read_token}\n\
               write token: {write_token}\n\
             \n\
             Don't hesitate if you have any questions.\n",
            ordinal = self.ordinal(),
            source = self.read.locator(),
            target = self.write.locator(),
            bucket = bucket,
            expiry = self.write.expires_at(),
            read_token = self.read.token(),
            write_token = self.write.token(),
        )
    }
}
