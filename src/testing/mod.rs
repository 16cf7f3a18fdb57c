pub mod prelude;
pub use prelude::*;
