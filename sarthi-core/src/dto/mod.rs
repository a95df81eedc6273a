//! Data Transfer Objects for client/backend communication
//!
//! DTOs mirror the JSON the backend sends and receives. They are converted
//! into domain types at the edge so the rest of the workspace never deals
//! with raw status strings.

pub mod diagnosis;
pub mod job;
