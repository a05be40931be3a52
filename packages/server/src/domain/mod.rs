//! Domain layer for the messaging hub.
//!
//! This module contains the connection lifecycle, value objects and the
//! repository abstraction over hub state. It is independent of the wire
//! format and of the HTTP/WebSocket layer.

pub mod entity;
pub mod error;
pub mod factory;
pub mod repository;
pub mod value_object;

pub use entity::{
    Connection, ConnectionState, ConnectionSummary, GroupSummary, HubSnapshot, OutboundReceiver,
};
pub use error::{RepositoryError, ValueObjectError};
pub use factory::ConnectionIdFactory;
#[cfg(test)]
pub use repository::MockHubRepository;
pub use repository::HubRepository;
pub use value_object::{ConnectionId, GroupName, OutboundFrame, Timestamp};
