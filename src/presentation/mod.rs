// Presentation layer (adapter)
// Reads engine snapshots and turns them into dashboard views

pub mod dashboard;

pub use dashboard::{DashboardView, TaskAction};
