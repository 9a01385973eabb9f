//! Corridor SDK - mission relay client
//!
//! Uploads missions to a corridor server, triggers route computation and
//! fetches the published artifacts.

pub mod client;

pub use client::{ComputeSummary, MissionClient, MissionUpdate, ProcessedRoute};
pub use corridor_core::{FinalRoute, MissionDescriptor, OffsetRouteResult};
