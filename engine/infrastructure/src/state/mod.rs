pub mod health;
pub mod memory;

pub use health::InMemoryHealthTracker;
pub use memory::InMemorySnapshotStore;
