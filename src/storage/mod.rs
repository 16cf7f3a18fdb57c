mod disk;
pub use disk::Disk;

mod storage;
pub use storage::ObjectStore;
