pub mod memory;

pub use memory::{InMemoryCollectionStore, InMemoryImageStore};
