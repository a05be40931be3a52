//! In-memory hub state.

pub mod connections;
pub mod groups;
pub mod hub;

pub use connections::ConnectionRegistry;
pub use groups::GroupRegistry;
pub use hub::InMemoryHubRepository;
