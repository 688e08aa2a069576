pub mod config_io;
pub mod persist;
pub mod storage;

pub use persist::{PersistError, Persistence};
pub use storage::{FileStore, KeyValueStore, MemoryStore, StorageError};
