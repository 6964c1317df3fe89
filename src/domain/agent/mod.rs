// Agent domain module
// Contains the agent entity and its value objects

#![allow(clippy::module_inception)]

pub mod agent;
pub mod value_objects;

// Re-export main types for convenience
pub use agent::Agent;
pub use value_objects::{level_for, AgentId, TASKS_PER_LEVEL};
