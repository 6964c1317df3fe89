// Task lifecycle
//
// The engine owns the roster, applies the start/complete/reset transitions
// and schedules the timers that drive them.

pub mod engine;
pub mod errors;
pub mod scheduler;
pub mod selection;

// Re-export main types
pub use engine::{EngineConfig, GuardPolicy, LifecycleEngine};
pub use errors::{LifecycleError, LifecycleResult};
pub use scheduler::{TransitionHandle, TransitionKind};
