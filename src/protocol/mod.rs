//! Cross-context messages.

pub mod messages;

pub use messages::{RuntimeMessage, TabId};
