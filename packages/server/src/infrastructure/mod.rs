//! Infrastructure layer: wire format and in-memory hub state.

pub mod codec;
pub mod dto;
pub mod repository;
