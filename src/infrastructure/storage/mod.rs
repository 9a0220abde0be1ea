//! History persistence backends

pub mod json_file_store;
pub mod memory_store;

pub use json_file_store::JsonFileStore;
pub use memory_store::MemoryStore;
