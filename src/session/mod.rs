//! Temporary unlocks: the in-memory map and its store-backed wrapper.

pub mod state;
pub mod store;

pub use state::SessionState;
pub use store::SessionStore;
