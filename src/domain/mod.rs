// Domain layer module exports
// Entities, snapshots and derived figures; no timers or I/O live here

pub mod agent;
pub mod events;
pub mod repositories;
pub mod roster;
pub mod seed;
pub mod stats;
pub mod task;
