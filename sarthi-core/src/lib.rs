//! Sarthi Core
//!
//! Core types for the Sarthi job polling client.
//!
//! This crate contains:
//! - Domain types: jobs as the client observes them, and the diagnosis
//!   entities the disease-scan backend reports
//! - DTOs: wire shapes exchanged with the backend

pub mod domain;
pub mod dto;
