//! Core domain types
//!
//! These types describe what the client knows about server-side work. They
//! carry no I/O; the client and poller crates move them over the wire and
//! drive their state.

pub mod diagnosis;
pub mod job;
