mod grant;
pub use grant::{Access, AccessGrant, Capability};

mod locator;
pub use locator::Locator;

mod transcript;
pub use transcript::{ContributionRecord, Transcript, VerificationRecord};
