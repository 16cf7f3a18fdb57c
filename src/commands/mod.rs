mod computation;
pub(crate) use computation::Computation;

mod extraction;
pub(crate) use extraction::Extraction;

mod grants;
pub(crate) use grants::Grants;

mod initialization;
pub(crate) use initialization::Initialization;

mod verification;
pub(crate) use verification::Verification;
