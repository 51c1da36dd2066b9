pub mod memory;
pub mod videos;

pub use memory::{CreatorMemory, MemoryError};
pub use videos::{InMemoryVideoStore, StoreError, VideoStore};
